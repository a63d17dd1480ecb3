/// Names already uploaded to the server
pub mod cache;
/// Per-request upload and play state machine
pub mod pipeline;
/// File-backed sample reader
pub mod upload;

pub use cache::SampleCache;
pub use pipeline::{
    FeedbackOutcome, FeedbackPipeline, FeedbackRequest, FeedbackStage, validate_sample_name,
};
pub use upload::SampleUpload;
