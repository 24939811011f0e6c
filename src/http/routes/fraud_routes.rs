// Fraud detection endpoint.

use crate::core::fraud::FraudReport;
use crate::http::auth::AdminUser;
use crate::http::error::{ApiError, ApiJson};
use crate::http::AppState;
use axum::{
    extract::{Extension, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub user_id: Uuid,
}

/// Admin-only; mounted behind `require_admin`.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/fraud/detect", post(detect))
}

/// POST /api/fraud/detect
async fn detect(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    ApiJson(body): ApiJson<DetectRequest>,
) -> Result<Json<FraudReport>, ApiError> {
    let report = state
        .fraud
        .run_detection(admin.id, body.user_id)
        .await
        .map_err(|e| ApiError::fraud(e, "Failed to run fraud detection"))?;
    Ok(Json(report))
}
