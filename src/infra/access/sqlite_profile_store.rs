use crate::core::access::{AccessError, Profile, ProfileStore};
use crate::core::fraud::UserRole;
use crate::infra::database::decode_uuid;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

pub(crate) const PROFILE_COLUMNS: &str = "id, first_name, last_name, email, user_type, \
                                          is_admin, is_banned, ban_reason, verification_status";

#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: Pool<Sqlite>,
}

impl SqliteProfileStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

/// Map a row selected with `PROFILE_COLUMNS`.
pub(crate) fn row_to_profile(row: &SqliteRow) -> Result<Profile, String> {
    let id: String = row.get("id");
    Ok(Profile {
        id: decode_uuid(&id)?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        role: row
            .get::<Option<String>, _>("user_type")
            .as_deref()
            .and_then(UserRole::parse),
        is_admin: row.get("is_admin"),
        is_banned: row.get("is_banned"),
        ban_reason: row.get("ban_reason"),
        verified: row.get::<String, _>("verification_status") == "verified",
    })
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AccessError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM profiles WHERE id = ?",
            PROFILE_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccessError::StorageError(e.to_string()))?;

        row.as_ref()
            .map(row_to_profile)
            .transpose()
            .map_err(AccessError::StorageError)
    }
}
