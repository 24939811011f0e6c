// Access module - decides who may use the back office.
//
// Every admin entry point goes through `AccessGate::require_admin` instead of
// checking `is_admin` on its own.

use crate::core::fraud::UserRole;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_admin: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    /// Set once an admin has verified the account.
    pub verified: bool,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AccessError>;
}

pub struct AccessGate<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> AccessGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the caller's profile and admit it only if it belongs to an admin.
    pub async fn require_admin(&self, user_id: Uuid) -> Result<Profile, AccessError> {
        match self.store.get_profile(user_id).await? {
            Some(profile) if profile.is_admin && !profile.is_banned => Ok(profile),
            Some(_) => {
                tracing::warn!(%user_id, "Non-admin attempted an admin action");
                Err(AccessError::Unauthorized)
            }
            None => Err(AccessError::Unauthorized),
        }
    }
}
