//! Chat, history and status endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

use super::ApiState;
use crate::Language;
use crate::conversation::Exchange;
use crate::dialogue::{Reply, Status};

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/history", get(history))
        .route("/api/status", get(status))
        .with_state(state)
}

/// Chat request
///
/// Both fields are optional on the wire; a missing message is handled as
/// empty text and a missing or unknown language as English.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Run one dialogue turn
async fn chat(State(state): State<Arc<ApiState>>, Json(request): Json<ChatRequest>) -> Json<Reply> {
    let language = request
        .language
        .as_deref()
        .map_or(Language::En, Language::from_tag);

    Json(state.coordinator.handle(&request.message, language).await)
}

/// Full conversation log, oldest first
async fn history(State(state): State<Arc<ApiState>>) -> Json<Vec<Exchange>> {
    Json(state.coordinator.state().log().all())
}

/// Listening flag and exchange count
async fn status(State(state): State<Arc<ApiState>>) -> Json<Status> {
    Json(state.coordinator.status())
}
