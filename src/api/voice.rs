//! Speech upload endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;

use super::ApiState;
use crate::Language;

/// Returned when the client posts no audio
pub const SPEECH_PLACEHOLDER_TEXT: &str =
    "Speech recognition endpoint - implement with proper audio handling";

/// Build speech router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/speech", post(speech))
        .with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub text: String,
    pub language: Language,
}

/// Transcribe an uploaded WAV recording
///
/// Recognition faults come back as placeholder text with status 200, the
/// same as spoken input on the local microphone.
async fn speech(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<SpeechResponse>, VoiceError> {
    if body.is_empty() {
        return Ok(Json(SpeechResponse {
            text: SPEECH_PLACEHOLDER_TEXT.to_string(),
            language: Language::En,
        }));
    }

    if !body.starts_with(b"RIFF") {
        return Err(VoiceError::BadRequest("expected WAV audio"));
    }

    let chain = state
        .speech
        .as_ref()
        .ok_or(VoiceError::NotConfigured("speech recognition not configured"))?;

    let (text, language) = chain.transcribe(&body).await.into_parts();
    Ok(Json(SpeechResponse { text, language }))
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody {
                    code,
                    message: message.to_string(),
                },
            }),
        )
            .into_response()
    }
}
