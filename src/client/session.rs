use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::client::waveform::{WaveformView, DEFAULT_WIDTH};
use crate::domain::AudioClip;

/// Shown for transport-level failures where no server message exists.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

// Synthetic progress stages; none of them measure real server progress.
const PROGRESS_SENT: u8 = 20;
const PROGRESS_RESPONDED: u8 = 65;
const PROGRESS_DONE: u8 = 100;

const PROGRESS_RESET_DELAY: Duration = Duration::from_secs(1);

/// What one completed submission produced: a transcript (possibly empty)
/// or a failure message, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscribeOutcome {
    Transcript(String),
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct RelayReply {
    text: Option<String>,
    error: Option<String>,
}

/// One user session of the upload/record pipeline.
///
/// Holds the single active clip (replacing it releases the old one and its
/// waveform together), the latest outcome, and the synthetic progress
/// value. An outcome is only ever valid for the most recently submitted
/// clip; replacing or resubmitting clears it first.
pub struct TranscribeSession {
    http: reqwest::Client,
    endpoint: String,
    clip: Option<AudioClip>,
    waveform: Option<WaveformView>,
    outcome: Option<TranscribeOutcome>,
    loading: bool,
    progress: Arc<AtomicU8>,
    progress_reset_delay: Duration,
}

impl TranscribeSession {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/transcribe", base_url.trim_end_matches('/')),
            clip: None,
            waveform: None,
            outcome: None,
            loading: false,
            progress: Arc::new(AtomicU8::new(0)),
            progress_reset_delay: PROGRESS_RESET_DELAY,
        }
    }

    pub fn with_progress_reset_delay(mut self, delay: Duration) -> Self {
        self.progress_reset_delay = delay;
        self
    }

    pub fn clip(&self) -> Option<&AudioClip> {
        self.clip.as_ref()
    }

    pub fn waveform(&self) -> Option<&WaveformView> {
        self.waveform.as_ref()
    }

    pub fn waveform_mut(&mut self) -> Option<&mut WaveformView> {
        self.waveform.as_mut()
    }

    pub fn outcome(&self) -> Option<&TranscribeOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }

    /// Make `clip` the active one. Any prior clip, its waveform, and any
    /// outcome tied to it are released first.
    pub fn set_clip(&mut self, clip: AudioClip) {
        self.waveform = None;
        self.waveform = match WaveformView::render(&clip, DEFAULT_WIDTH) {
            Ok(view) => Some(view),
            Err(e) => {
                tracing::warn!(error = %e, file_name = %clip.file_name, "Waveform rendering skipped");
                None
            }
        };
        self.outcome = None;
        self.clip = Some(clip);
    }

    /// Clear the active clip and its waveform. Idempotent; clearing an
    /// empty session does nothing.
    pub fn delete_clip(&mut self) {
        self.clip = None;
        self.waveform = None;
    }

    /// Submit the active clip. A no-op when no clip is present or a
    /// request is already in flight. The loading flag is cleared on every
    /// exit path and the progress value drifts back to 0 shortly after.
    pub async fn transcribe(&mut self) {
        if self.loading {
            return;
        }
        let Some(clip) = self.clip.clone() else {
            return;
        };

        self.loading = true;
        self.outcome = None;
        self.progress.store(PROGRESS_SENT, Ordering::Release);

        let outcome = self.submit(&clip).await;

        self.outcome = Some(outcome);
        self.loading = false;
        self.schedule_progress_reset();
    }

    async fn submit(&self, clip: &AudioClip) -> TranscribeOutcome {
        let part = match reqwest::multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.file_name.clone())
            .mime_str(&clip.media_type)
        {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, media_type = %clip.media_type, "Clip media type rejected");
                return TranscribeOutcome::Failed(GENERIC_FAILURE_MESSAGE.to_string());
            }
        };
        let form = reqwest::multipart::Form::new().part("audio", part);

        let response = match self.http.post(&self.endpoint).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Transcription request failed");
                return TranscribeOutcome::Failed(GENERIC_FAILURE_MESSAGE.to_string());
            }
        };
        self.progress.store(PROGRESS_RESPONDED, Ordering::Release);

        let reply: RelayReply = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Transcription response was not valid JSON");
                return TranscribeOutcome::Failed(GENERIC_FAILURE_MESSAGE.to_string());
            }
        };
        self.progress.store(PROGRESS_DONE, Ordering::Release);

        match reply.error {
            Some(message) => TranscribeOutcome::Failed(message),
            None => TranscribeOutcome::Transcript(reply.text.unwrap_or_default()),
        }
    }

    fn schedule_progress_reset(&self) {
        let progress = Arc::clone(&self.progress);
        let delay = self.progress_reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            progress.store(0, Ordering::Release);
        });
    }
}
