// SQLite-backed verification store.
//
// Updates review columns on `documents` and standing columns on `profiles`.

use crate::core::access::Profile;
use crate::core::fraud::DocumentStatus;
use crate::core::verification::{Document, VerificationError, VerificationStore};
use crate::infra::access::{row_to_profile, PROFILE_COLUMNS};
use crate::infra::database::{decode_optional_uuid, decode_ts, decode_uuid, encode_ts};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str =
    "id, user_id, document_type, verification_status, verified_by, admin_notes, created_at";

#[derive(Clone)]
pub struct SqliteVerificationStore {
    pool: Pool<Sqlite>,
}

impl SqliteVerificationStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn fetch_document(&self, document_id: Uuid) -> Result<Option<Document>, VerificationError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(document_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VerificationError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, VerificationError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM profiles WHERE id = ?",
            PROFILE_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VerificationError::StorageError(e.to_string()))?;

        row.as_ref()
            .map(row_to_profile)
            .transpose()
            .map_err(VerificationError::StorageError)
    }
}

#[async_trait]
impl VerificationStore for SqliteVerificationStore {
    async fn pending_documents(&self) -> Result<Vec<Document>, VerificationError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE verification_status = ? \
             ORDER BY created_at ASC, rowid ASC",
            DOCUMENT_COLUMNS
        ))
        .bind(DocumentStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VerificationError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_document).collect()
    }

    async fn review_document(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        reviewer_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Option<Document>, VerificationError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET verification_status = ?, verified_by = ?, admin_notes = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(reviewer_id.to_string())
        .bind(notes)
        .bind(document_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| VerificationError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_document(document_id).await
    }

    async fn ban_profile(
        &self,
        user_id: Uuid,
        reason: &str,
        banned_at: DateTime<Utc>,
    ) -> Result<Option<Profile>, VerificationError> {
        let result = sqlx::query(
            "UPDATE profiles SET is_banned = 1, ban_reason = ?, ban_date = ? WHERE id = ?",
        )
        .bind(reason)
        .bind(encode_ts(banned_at))
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| VerificationError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_profile(user_id).await
    }

    async fn verify_profile(&self, user_id: Uuid) -> Result<Option<Profile>, VerificationError> {
        let result =
            sqlx::query("UPDATE profiles SET verification_status = 'verified' WHERE id = ?")
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| VerificationError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_profile(user_id).await
    }
}

fn row_to_document(row: &SqliteRow) -> Result<Document, VerificationError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let status: String = row.get("verification_status");
    let created_at: String = row.get("created_at");

    Ok(Document {
        id: decode_uuid(&id).map_err(VerificationError::StorageError)?,
        user_id: decode_uuid(&user_id).map_err(VerificationError::StorageError)?,
        document_type: row.get("document_type"),
        status: status
            .parse::<DocumentStatus>()
            .map_err(VerificationError::StorageError)?,
        verified_by: decode_optional_uuid(row.get("verified_by"))
            .map_err(VerificationError::StorageError)?,
        admin_notes: row.get("admin_notes"),
        created_at: decode_ts(&created_at).map_err(VerificationError::StorageError)?,
    })
}
