// Back-office endpoints: chat review, fraud flags and the admin log.
//
// Every route here is mounted behind `require_admin`.

use crate::core::audit::AdminLogEntry;
use crate::core::fraud::{FraudFlag, Severity};
use crate::core::moderation::{ChatMessage, ConversationTranscript, FlaggedMessageReview};
use crate::http::auth::AdminUser;
use crate::http::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::http::AppState;
use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FlagMessageRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RaiseFlagRequest {
    pub user_id: Uuid,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Page size, capped server-side
    pub limit: Option<usize>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/chats/flagged", get(flagged_chats))
        .route("/api/admin/chats/:investment_id", get(chat_transcript))
        .route("/api/admin/chats/messages/:id/flag", post(flag_message))
        .route(
            "/api/admin/fraud-flags",
            get(unresolved_flags).post(raise_flag),
        )
        .route("/api/admin/fraud-flags/:id/resolve", post(resolve_flag))
        .route("/api/admin/logs", get(admin_logs))
}

// =============================================================================
// CHAT REVIEW
// =============================================================================

/// GET /api/admin/chats/flagged
async fn flagged_chats(
    State(state): State<AppState>,
) -> Result<Json<Vec<FlaggedMessageReview>>, ApiError> {
    let flagged = state
        .chat
        .flagged_for_review()
        .await
        .map_err(|e| ApiError::chat(e, "Failed to fetch flagged conversations"))?;
    Ok(Json(flagged))
}

/// GET /api/admin/chats/:investment_id
async fn chat_transcript(
    State(state): State<AppState>,
    ApiPath(investment_id): ApiPath<Uuid>,
) -> Result<Json<ConversationTranscript>, ApiError> {
    let transcript = state
        .chat
        .transcript(investment_id)
        .await
        .map_err(|e| ApiError::chat(e, "Failed to fetch conversation"))?;
    Ok(Json(transcript))
}

/// POST /api/admin/chats/messages/:id/flag
async fn flag_message(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiPath(message_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<FlagMessageRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = state
        .chat
        .flag_message(admin.id, message_id, &body.reason)
        .await
        .map_err(|e| ApiError::chat(e, "Failed to flag message"))?;
    Ok(Json(message))
}

// =============================================================================
// FRAUD FLAGS
// =============================================================================

/// GET /api/admin/fraud-flags
async fn unresolved_flags(
    State(state): State<AppState>,
) -> Result<Json<Vec<FraudFlag>>, ApiError> {
    let flags = state
        .fraud
        .unresolved_flags()
        .await
        .map_err(|e| ApiError::fraud(e, "Failed to fetch fraud flags"))?;
    Ok(Json(flags))
}

/// POST /api/admin/fraud-flags
async fn raise_flag(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiJson(body): ApiJson<RaiseFlagRequest>,
) -> Result<Json<FraudFlag>, ApiError> {
    let flag = state
        .fraud
        .raise_manual_flag(admin.id, body.user_id, body.severity, &body.description)
        .await
        .map_err(|e| ApiError::fraud(e, "Failed to create fraud flag"))?;
    Ok(Json(flag))
}

/// POST /api/admin/fraud-flags/:id/resolve
async fn resolve_flag(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiPath(flag_id): ApiPath<Uuid>,
) -> Result<Json<FraudFlag>, ApiError> {
    let flag = state
        .fraud
        .resolve_flag(admin.id, flag_id)
        .await
        .map_err(|e| ApiError::fraud(e, "Failed to resolve fraud flag"))?;
    Ok(Json(flag))
}

// =============================================================================
// ADMIN LOG
// =============================================================================

/// GET /api/admin/logs?limit=
async fn admin_logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LogsQuery>,
) -> Result<Json<Vec<AdminLogEntry>>, ApiError> {
    let entries = state
        .audit
        .recent(query.limit)
        .await
        .map_err(|e| ApiError::audit(e, "Failed to fetch admin logs"))?;
    Ok(Json(entries))
}
