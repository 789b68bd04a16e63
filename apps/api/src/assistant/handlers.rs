//! Axum route handlers for the assistant API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assistant::models::ParsedResponse;
use crate::assistant::parser::parse_response;
use crate::errors::AppError;
use crate::llm_client::FailureKind;
use crate::session::SessionRecord;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub utterance: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub reply: ParsedResponse,
    pub turn_count: usize,
    /// Present when the reply is the fallback apology.
    pub failure: Option<FailureKind>,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assistant/sessions
pub async fn handle_create_session() -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = Uuid::new_v4();
    info!("Created assistant session {session_id}");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/v1/assistant/sessions/:id
///
/// Unknown sessions read as empty so a remounting UI can start fresh.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionRecord>, AppError> {
    let record = state.sessions.load(session_id).await?.unwrap_or_default();
    Ok(Json(record))
}

/// DELETE /api/v1/assistant/sessions/:id
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.delete(session_id).await?;
    info!("Reset assistant session {session_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assistant/sessions/:id/messages
///
/// Runs one Rodrigo turn and persists the new state. Turns within a session
/// must be sent one at a time by the caller.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let Json(request) = payload?;
    if request.utterance.trim().is_empty() {
        return Err(AppError::Validation("utterance cannot be empty".to_string()));
    }

    let record = state.sessions.load(session_id).await?.unwrap_or_default();
    let outcome = state
        .assistant
        .generate(&request.utterance, &record.state)
        .await?;

    let next = record.apply_turn(&request.utterance, &outcome);
    state.sessions.save(session_id, &next).await?;

    Ok(Json(SendMessageResponse {
        turn_count: outcome.state.turn_count(),
        reply: outcome.response,
        failure: outcome.failure,
    }))
}

/// POST /api/v1/assistant/parse
///
/// Runs the response parser alone on a raw completion.
pub async fn handle_parse(
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParsedResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(parse_response(&request.text)))
}
