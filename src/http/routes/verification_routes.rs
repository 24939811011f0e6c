// Document review and account standing. Mounted behind `require_admin`.

use crate::core::access::Profile;
use crate::core::verification::Document;
use crate::http::auth::AdminUser;
use crate::http::error::{ApiError, ApiJson, ApiPath};
use crate::http::AppState;
use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/documents", get(pending_documents))
        .route("/api/admin/documents/:id/approve", post(approve_document))
        .route("/api/admin/documents/:id/reject", post(reject_document))
        .route("/api/admin/users/:id/ban", post(ban_user))
        .route("/api/admin/users/:id/verify", post(verify_user))
}

/// GET /api/admin/documents
async fn pending_documents(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = state
        .verification
        .pending_documents()
        .await
        .map_err(|e| ApiError::verification(e, "Failed to fetch documents"))?;
    Ok(Json(documents))
}

/// POST /api/admin/documents/:id/approve
async fn approve_document(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiPath(document_id): ApiPath<Uuid>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .verification
        .approve_document(admin.id, document_id)
        .await
        .map_err(|e| ApiError::verification(e, "Failed to approve document"))?;
    Ok(Json(document))
}

/// POST /api/admin/documents/:id/reject
async fn reject_document(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiPath(document_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ReasonRequest>,
) -> Result<Json<Document>, ApiError> {
    let document = state
        .verification
        .reject_document(admin.id, document_id, &body.reason)
        .await
        .map_err(|e| ApiError::verification(e, "Failed to reject document"))?;
    Ok(Json(document))
}

/// POST /api/admin/users/:id/ban
async fn ban_user(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ReasonRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .verification
        .ban_user(admin.id, user_id, &body.reason)
        .await
        .map_err(|e| ApiError::verification(e, "Failed to ban user"))?;
    Ok(Json(profile))
}

/// POST /api/admin/users/:id/verify
async fn verify_user(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .verification
        .verify_user(admin.id, user_id)
        .await
        .map_err(|e| ApiError::verification(e, "Failed to verify user"))?;
    Ok(Json(profile))
}
