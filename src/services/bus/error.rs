use crate::services::audio::AudioError;

/// Typed D-Bus errors, named `org.audiod.Audio1.Error.<Kind>`
#[derive(Debug, zbus::DBusError)]
#[zbus(prefix = "org.audiod.Audio1.Error")]
pub enum BusError {
    /// Transport-level failure
    #[zbus(error)]
    ZBus(zbus::Error),
    /// The audio server connection is not established yet
    NotReady(String),
    /// Malformed or out-of-range request
    InvalidArgument(String),
    /// The requested value equals the current one
    NoOpRequested(String),
    /// No suitable device was found
    DeviceNotFound(String),
    /// The audio server reported failure or went away
    UpstreamFailure(String),
    /// Feedback sample missing or unreadable
    ResourceError(String),
}

impl From<AudioError> for BusError {
    fn from(error: AudioError) -> Self {
        let message = error.to_string();
        match error {
            AudioError::NotReady => BusError::NotReady(message),
            AudioError::Validation { .. } => BusError::InvalidArgument(message),
            AudioError::NoOpRequested(_) => BusError::NoOpRequested(message),
            AudioError::DeviceNotFound(_) => BusError::DeviceNotFound(message),
            AudioError::UpstreamFailure(_) => BusError::UpstreamFailure(message),
            AudioError::Resource { .. } => BusError::ResourceError(message),
        }
    }
}
