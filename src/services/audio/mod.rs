/// Audio error types
pub mod error;
/// Feedback sample pipeline and cache
pub mod feedback;
/// Audio Control Port abstraction
pub mod port;
/// Call-mode routing
pub mod routing;
/// Audio service
pub mod service;
/// Device State Manager
pub mod state;
/// Volume conversion and stepping
pub mod volume;

#[cfg(test)]
mod tests;

pub use error::AudioError;
pub use feedback::{FeedbackOutcome, FeedbackRequest, SampleCache};
pub use port::{AudioControlPort, PortError, PortEvent};
pub use service::AudioService;
pub use state::{AudioStatus, DeviceState, DeviceStateManager};
