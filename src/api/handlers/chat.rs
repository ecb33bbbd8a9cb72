/// Chat handler
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::ChatRequest;
use crate::rag::ChatOutcome;

/// One conversational turn (POST /api/chat)
///
/// Always answers 200: backend failures surface in `response` text.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ApiResponse<ChatOutcome>> {
    info!(
        "POST /api/chat (session: {})",
        req.session_id.as_deref().unwrap_or("new")
    );

    let outcome = state
        .service
        .chat(&req.message, req.session_id, req.model.as_deref())
        .await;

    Json(ApiResponse::success(outcome))
}
