use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

/// Sample names uploaded during this process lifetime
///
/// Entries are never invalidated.
#[derive(Debug, Default)]
pub struct SampleCache {
    names: Mutex<HashSet<String>>,
}

impl SampleCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` was uploaded already
    pub fn contains(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Record a completed upload. Returns false if `name` was already cached.
    pub fn insert(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string())
    }

    /// Number of cached names
    pub fn len(&self) -> usize {
        self.names.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was uploaded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
