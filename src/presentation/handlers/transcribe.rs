use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::ports::TranscriptionEngine;
use crate::domain::AudioClip;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Accepts a multipart upload with an `audio` field, forwards the clip to
/// the transcription engine, and answers with `{ text }` or `{ error }`.
/// Responses are always well-formed JSON; downstream failures never
/// escape as unhandled faults.
#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler<E>(
    State(state): State<AppState<E>>,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    E: TranscriptionEngine + 'static,
{
    let mut clip: Option<AudioClip> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read multipart: {}", e),
                    }),
                )
                    .into_response();
            }
        };

        if field.name() != Some("audio") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("audio").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read audio field bytes");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read file: {}", e),
                    }),
                )
                    .into_response();
            }
        };

        clip = Some(AudioClip::new(data.to_vec(), media_type, file_name));
        break;
    }

    let Some(clip) = clip else {
        tracing::warn!("Transcribe request without an audio field");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No file uploaded".to_string(),
            }),
        )
            .into_response();
    };

    tracing::debug!(
        file_name = %clip.file_name,
        media_type = %clip.media_type,
        bytes = clip.len(),
        "Audio upload received"
    );

    match state.engine.transcribe(&clip).await {
        Ok(text) => {
            tracing::info!(chars = text.len(), file_name = %clip.file_name, "Transcription succeeded");
            (StatusCode::OK, Json(TranscribeResponse { text })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, file_name = %clip.file_name, "Transcription failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
