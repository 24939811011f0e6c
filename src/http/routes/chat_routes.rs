// Investment chat endpoints for the two participants of an investment.

use crate::core::moderation::{ChatMessage, SentMessage};
use crate::http::auth::CurrentUser;
use crate::http::error::{ApiError, ApiJson, ApiPath};
use crate::http::AppState;
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message_text: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/investments/:id/messages",
        get(get_conversation).post(send_message),
    )
}

/// POST /api/investments/:id/messages
async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(investment_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SendMessageRequest>,
) -> Result<Json<SentMessage>, ApiError> {
    let sent = state
        .chat
        .send_message(investment_id, user_id, &body.message_text)
        .await
        .map_err(|e| ApiError::chat(e, "Failed to send message"))?;
    Ok(Json(sent))
}

/// GET /api/investments/:id/messages
async fn get_conversation(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(investment_id): ApiPath<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = state
        .chat
        .conversation(investment_id, user_id)
        .await
        .map_err(|e| ApiError::chat(e, "Failed to fetch conversation"))?;
    Ok(Json(messages))
}
