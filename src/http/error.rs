// HTTP error type. Every handler returns `Result<_, ApiError>`; the body is
// always `{ "error": "<message>" }`, including extractor rejections.

use crate::core::access::AccessError;
use crate::core::audit::AuditError;
use crate::core::fraud::FraudError;
use crate::core::moderation::ChatError;
use crate::core::verification::VerificationError;
use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    /// Storage failure. Carries only the generic message shown to clients.
    Internal(&'static str),
}

impl ApiError {
    /// Map a chat error; storage details are logged and replaced by `context`.
    pub fn chat(err: ChatError, context: &'static str) -> Self {
        match err {
            ChatError::EmptyMessage | ChatError::EmptyReason => Self::BadRequest(err.to_string()),
            ChatError::NotParticipant => Self::Unauthorized,
            ChatError::Banned => Self::Forbidden(err.to_string()),
            ChatError::InvestmentNotFound | ChatError::MessageNotFound => {
                Self::NotFound(err.to_string())
            }
            ChatError::StorageError(details) => Self::internal(context, &details),
        }
    }

    pub fn fraud(err: FraudError, context: &'static str) -> Self {
        match err {
            FraudError::UserNotFound | FraudError::FlagNotFound => Self::NotFound(err.to_string()),
            FraudError::InvalidInput(message) => Self::BadRequest(message),
            FraudError::StorageError(details) => Self::internal(context, &details),
        }
    }

    pub fn verification(err: VerificationError, context: &'static str) -> Self {
        match err {
            VerificationError::EmptyReason => Self::BadRequest(err.to_string()),
            VerificationError::DocumentNotFound | VerificationError::UserNotFound => {
                Self::NotFound(err.to_string())
            }
            VerificationError::StorageError(details) => Self::internal(context, &details),
        }
    }

    pub fn audit(err: AuditError, context: &'static str) -> Self {
        match err {
            AuditError::StorageError(details) => Self::internal(context, &details),
        }
    }

    fn internal(context: &'static str, details: &str) -> Self {
        tracing::error!("{}: {}", context, details);
        Self::Internal(context)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthorized => Self::Unauthorized,
            AccessError::StorageError(details) => {
                Self::internal("Failed to verify admin access", &details)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `Json` extractor whose rejection is an `ApiError` (400) instead of axum's
/// plain-text response.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Path` extractor with the same rejection shape as `ApiJson`.
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` extractor with the same rejection shape as `ApiJson`.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::chat(ChatError::EmptyMessage, "Failed to send message"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::chat(ChatError::NotParticipant, "Failed to send message"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::fraud(FraudError::UserNotFound, "Failed to run fraud detection"),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::fraud(
                    FraudError::StorageError("disk I/O error".to_string()),
                    "Failed to run fraud detection",
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::from(AccessError::Unauthorized), StatusCode::UNAUTHORIZED),
            (
                ApiError::chat(ChatError::Banned, "Failed to send message"),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::verification(VerificationError::DocumentNotFound, "Failed to review"),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let error = ApiError::chat(
            ChatError::StorageError("UNIQUE constraint failed".to_string()),
            "Failed to send message",
        );

        assert!(matches!(error, ApiError::Internal("Failed to send message")));
    }
}
