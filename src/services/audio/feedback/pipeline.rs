use std::{path::PathBuf, sync::Arc};

use tracing::{debug, info, instrument};

use super::{cache::SampleCache, upload::SampleUpload};
use crate::services::audio::{
    error::AudioError,
    port::{AudioControlPort, FEEDBACK_SAMPLE_FORMAT, MediaRole, SampleSource},
    volume::NORM,
};

/// File extension of raw feedback samples
pub const SAMPLE_EXTENSION: &str = "pcm";

/// One play-feedback intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    /// Sample name, also the file stem inside the sample directory
    pub sample_name: String,
    /// Sink to play on instead of the default sink
    pub sink_override: Option<String>,
    /// False for a warm-up that only uploads
    pub should_play: bool,
}

impl FeedbackRequest {
    /// Upload if needed, then play on the default sink
    pub fn play(sample_name: impl Into<String>) -> Self {
        Self {
            sample_name: sample_name.into(),
            sink_override: None,
            should_play: true,
        }
    }

    /// Upload if needed, never play
    pub fn warm_up(sample_name: impl Into<String>) -> Self {
        Self {
            should_play: false,
            ..Self::play(sample_name)
        }
    }

    /// Play on `sink` instead of the default sink
    pub fn on_sink(mut self, sink: impl Into<String>) -> Self {
        self.sink_override = Some(sink.into());
        self
    }
}

/// Pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStage {
    /// Looking the name up in the cache
    CacheCheck,
    /// Streaming the sample file to the server
    Uploading,
    /// Asking the server to play
    Playing,
    /// Terminal
    Done,
}

/// What a successful request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOutcome {
    /// The sample had to be uploaded first
    pub uploaded: bool,
    /// Sink playback was accepted on; `None` for warm-ups
    pub played_on: Option<String>,
}

/// Validate a sample name before it becomes part of a file path.
///
/// # Errors
/// Returns [`AudioError::Validation`] for empty names, names with path
/// separators, and hidden names
pub fn validate_sample_name(name: &str) -> Result<(), AudioError> {
    if name.is_empty() {
        return Err(AudioError::validation("name", "sample name is empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AudioError::validation(
            "name",
            format!("'{name}' contains a path separator"),
        ));
    }
    if name.starts_with('.') {
        return Err(AudioError::validation(
            "name",
            format!("'{name}' starts with '.'"),
        ));
    }
    Ok(())
}

/// Upload-once, play-many feedback sounds
#[derive(Debug, Clone)]
pub struct FeedbackPipeline {
    cache: Arc<SampleCache>,
    sample_dir: PathBuf,
}

impl FeedbackPipeline {
    /// Create a pipeline reading samples from `sample_dir`
    pub fn new(sample_dir: impl Into<PathBuf>, cache: Arc<SampleCache>) -> Self {
        Self {
            cache,
            sample_dir: sample_dir.into(),
        }
    }

    /// Cache shared by every request
    pub fn cache(&self) -> &Arc<SampleCache> {
        &self.cache
    }

    /// Path of the sample file for `name`
    pub fn sample_path(&self, name: &str) -> PathBuf {
        self.sample_dir.join(format!("{name}.{SAMPLE_EXTENSION}"))
    }

    /// Drive one request to [`FeedbackStage::Done`].
    ///
    /// `default_sink` is the last default sink the server reported; the port
    /// is asked when it is unknown.
    ///
    /// # Errors
    /// - [`AudioError::Validation`] for a bad sample name
    /// - [`AudioError::Resource`] when the sample file is missing or empty
    /// - [`AudioError::DeviceNotFound`] when no sink can be resolved
    /// - [`AudioError::UpstreamFailure`] when the server rejects upload or playback
    #[instrument(skip(self, port, default_sink), fields(name = %request.sample_name))]
    pub async fn run(
        &self,
        port: &dyn AudioControlPort,
        request: FeedbackRequest,
        default_sink: Option<String>,
    ) -> Result<FeedbackOutcome, AudioError> {
        validate_sample_name(&request.sample_name)?;

        debug!(stage = ?FeedbackStage::CacheCheck);
        let uploaded = if self.cache.contains(&request.sample_name) {
            false
        } else {
            self.upload(port, &request.sample_name).await?;
            true
        };

        debug!(stage = ?FeedbackStage::Playing, should_play = request.should_play);
        if !request.should_play {
            debug!(stage = ?FeedbackStage::Done, "Warm-up finished");
            return Ok(FeedbackOutcome {
                uploaded,
                played_on: None,
            });
        }

        let sink = match request.sink_override {
            Some(sink) => sink,
            None => match default_sink {
                Some(sink) => sink,
                None => port
                    .default_sink_name()
                    .await?
                    .ok_or_else(|| AudioError::DeviceNotFound(String::from("default sink")))?,
            },
        };

        port.play_sample(&request.sample_name, &sink, NORM, MediaRole::Event)
            .await?;

        debug!(stage = ?FeedbackStage::Done, sink = %sink, "Playback accepted");
        Ok(FeedbackOutcome {
            uploaded,
            played_on: Some(sink),
        })
    }

    async fn upload(&self, port: &dyn AudioControlPort, name: &str) -> Result<(), AudioError> {
        let path = self.sample_path(name);
        debug!(stage = ?FeedbackStage::Uploading, path = %path.display());

        let source = SampleUpload::open(&path)?;
        let declared_len = source.declared_len();

        port.upload_sample(name, FEEDBACK_SAMPLE_FORMAT, Box::new(source))
            .await?;

        self.cache.insert(name);
        info!(name, bytes = declared_len, "Uploaded feedback sample");
        Ok(())
    }
}
