use async_trait::async_trait;

use crate::domain::AudioClip;

/// Speech-to-text collaborator. Implementations take a complete clip and
/// return the transcript in one shot; a failure is terminal for that call,
/// retries are the caller's business.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
}
