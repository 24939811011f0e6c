// Caller identity and the admin gate.
//
// The caller is identified by the `x-user-id` header. Admin routes are wrapped
// in `require_admin`, which stores the admin's profile as a request extension.

use super::error::ApiError;
use super::AppState;
use crate::core::access::Profile;
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller of a non-admin route.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Profile of the admin making the request. Only present behind `require_admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Profile);

fn caller_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_id(&parts.headers)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = caller_id(request.headers()).ok_or(ApiError::Unauthorized)?;
    let admin = state.access.require_admin(user_id).await?;

    request.extensions_mut().insert(AdminUser(admin));
    Ok(next.run(request).await)
}
