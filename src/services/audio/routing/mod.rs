/// Call-mode cascade over the Audio Control Port
pub mod cascade;
/// Routing decisions over device descriptors
pub mod policy;

pub use cascade::{CallModeCascade, CascadeReport, CascadeStage, push_mic_mute};
pub use policy::{Decision, InputChange, RoutingIntent};
