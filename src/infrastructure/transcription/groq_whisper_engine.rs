use async_trait::async_trait;
use reqwest::multipart;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::AudioClip;

/// Hosted Whisper adapter speaking the OpenAI-compatible
/// `audio/transcriptions` protocol, as served by Groq.
///
/// The source language is pinned per process rather than auto-detected.
/// One attempt per call; timeouts are the HTTP client defaults.
pub struct GroqWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
}

impl GroqWhisperEngine {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            model: model.unwrap_or_else(|| "whisper-large-v3".to_string()),
            language: language.unwrap_or_else(|| "en".to_string()),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for GroqWhisperEngine {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscriptionError> {
        let url = format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'));

        let file_part = multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.file_name.clone())
            .mime_str(&clip.media_type)
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text")
            .part("file", file_part);

        tracing::debug!(
            model = %self.model,
            language = %self.language,
            bytes = clip.len(),
            "Sending audio to transcription API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let transcript = response
            .text()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;

        tracing::info!(chars = transcript.len(), "Transcription completed");

        Ok(transcript.trim().to_string())
    }
}
