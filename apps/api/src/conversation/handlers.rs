//! Axum route handlers for the Chat API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::draft::DraftReport;
use crate::errors::AppError;
use crate::models::conversation::{ChatMessage, NextStep, SessionPhase};
use crate::state::AppState;

const MAX_SESSION_ID_LEN: usize = 128;
/// Session used by `POST /chat` when the request names none.
pub const LEGACY_SESSION_KEY: &str = "default";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub user_input: String,
    /// Omit to start a new session, or on `/chat` to use `LEGACY_SESSION_KEY`.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    pub session_id: String,
    pub response: String,
    pub next_step: NextStep,
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_report: Option<DraftReport>,
}

#[derive(Debug, Serialize)]
pub struct SessionHistoryResponse {
    pub session_id: String,
    pub phase: SessionPhase,
    pub messages: Vec<ChatMessage>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chat
///
/// Runs one turn. The reply is a follow-up question while collecting, or the
/// CV draft on the turn the user writes "proceed".
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    let session_id = resolve_session_id(request.session_id)?;
    run_turn(&state, session_id, &request.user_input).await
}

/// POST /chat
///
/// Single-conversation endpoint: clients that send only `user_input` all share
/// `LEGACY_SESSION_KEY`, so history accumulates across calls.
pub async fn handle_legacy_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    let session_id = match request.session_id {
        Some(id) if !id.trim().is_empty() => resolve_session_id(Some(id))?,
        _ => LEGACY_SESSION_KEY.to_string(),
    };
    run_turn(&state, session_id, &request.user_input).await
}

async fn run_turn(
    state: &AppState,
    session_id: String,
    user_input: &str,
) -> Result<Json<ChatTurnResponse>, AppError> {
    if user_input.trim().is_empty() {
        return Err(AppError::Validation("user_input cannot be empty".to_string()));
    }

    let outcome = state.engine.advance(&session_id, user_input).await?;

    Ok(Json(ChatTurnResponse {
        session_id,
        response: outcome.reply,
        next_step: outcome.next_step,
        phase: outcome.phase,
        draft_report: outcome.draft_report,
    }))
}

/// GET /api/v1/chat/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, AppError> {
    let conversation = state
        .engine
        .history(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    Ok(Json(SessionHistoryResponse {
        session_id,
        phase: conversation.phase,
        messages: conversation.messages,
    }))
}

/// DELETE /api/v1/chat/:session_id
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.engine.reset(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {session_id} not found")))
    }
}

fn resolve_session_id(requested: Option<String>) -> Result<String, AppError> {
    match requested.map(|s| s.trim().to_string()) {
        None => Ok(Uuid::new_v4().to_string()),
        Some(id) if id.is_empty() => Ok(Uuid::new_v4().to_string()),
        Some(id) if id.len() > MAX_SESSION_ID_LEN => Err(AppError::Validation(format!(
            "session_id must be at most {MAX_SESSION_ID_LEN} characters"
        ))),
        Some(id) => Ok(id),
    }
}
