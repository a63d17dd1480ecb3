/// Audio control service
pub mod audio;
/// D-Bus surface
pub mod bus;
/// PulseAudio port
pub mod pulse;

pub use audio::{AudioError, AudioService, AudioStatus, PortError};
pub use bus::BusError;
pub use pulse::PulsePort;
