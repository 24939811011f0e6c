// SQLite-backed fraud store.
//
// Signals are counted straight from `documents`, `investments` and
// `profiles`; flags live in `fraud_flags`.

use crate::core::fraud::{
    DocumentStatus, FlagCategory, FraudError, FraudFlag, FraudFlagStore, FraudSignalSource,
    NewFraudFlag, Severity, UserRole,
};
use crate::infra::database::{decode_ts, decode_uuid, encode_ts};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

const FLAG_COLUMNS: &str =
    "id, user_id, flag_type, severity, description, automated, resolved, resolved_at, created_at";

#[derive(Clone)]
pub struct SqliteFraudStore {
    pool: Pool<Sqlite>,
}

impl SqliteFraudStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FraudSignalSource for SqliteFraudStore {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool, FraudError> {
        let row = sqlx::query("SELECT 1 FROM profiles WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| FraudError::StorageError(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn count_documents(
        &self,
        user_id: Uuid,
        status: DocumentStatus,
    ) -> Result<u64, FraudError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM documents WHERE user_id = ? AND verification_status = ?",
        )
        .bind(user_id.to_string())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| FraudError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn count_investments_since(
        &self,
        investor_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, FraudError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM investments WHERE investor_id = ? AND created_at >= ?",
        )
        .bind(investor_id.to_string())
        .bind(encode_ts(since))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| FraudError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn user_role(&self, user_id: Uuid) -> Result<Option<UserRole>, FraudError> {
        let row = sqlx::query("SELECT user_type FROM profiles WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| FraudError::StorageError(e.to_string()))?;

        Ok(row
            .and_then(|r| r.get::<Option<String>, _>("user_type"))
            .as_deref()
            .and_then(UserRole::parse))
    }
}

#[async_trait]
impl FraudFlagStore for SqliteFraudStore {
    async fn insert_flag(&self, flag: NewFraudFlag) -> Result<FraudFlag, FraudError> {
        let stored = FraudFlag {
            id: Uuid::new_v4(),
            user_id: flag.user_id,
            category: flag.category,
            severity: flag.severity,
            description: flag.description,
            automated: flag.automated,
            resolved: false,
            resolved_at: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO fraud_flags (
                id, user_id, flag_type, severity, description, automated, resolved, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(stored.id.to_string())
        .bind(stored.user_id.to_string())
        .bind(stored.category.as_str())
        .bind(stored.severity.as_str())
        .bind(&stored.description)
        .bind(stored.automated)
        .bind(encode_ts(stored.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| FraudError::StorageError(e.to_string()))?;

        Ok(stored)
    }

    async fn unresolved_flags(&self) -> Result<Vec<FraudFlag>, FraudError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM fraud_flags WHERE resolved = 0 ORDER BY created_at DESC, rowid DESC",
            FLAG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FraudError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_flag).collect()
    }

    async fn get_flag(&self, flag_id: Uuid) -> Result<Option<FraudFlag>, FraudError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM fraud_flags WHERE id = ?",
            FLAG_COLUMNS
        ))
        .bind(flag_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| FraudError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_flag).transpose()
    }

    async fn resolve_flag(
        &self,
        flag_id: Uuid,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<FraudFlag>, FraudError> {
        let result =
            sqlx::query("UPDATE fraud_flags SET resolved = 1, resolved_at = ? WHERE id = ?")
                .bind(encode_ts(resolved_at))
                .bind(flag_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| FraudError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_flag(flag_id).await
    }
}

fn row_to_flag(row: &SqliteRow) -> Result<FraudFlag, FraudError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let category: String = row.get("flag_type");
    let severity: String = row.get("severity");
    let resolved_at: Option<String> = row.get("resolved_at");
    let created_at: String = row.get("created_at");

    Ok(FraudFlag {
        id: decode_uuid(&id).map_err(FraudError::StorageError)?,
        user_id: decode_uuid(&user_id).map_err(FraudError::StorageError)?,
        category: category
            .parse::<FlagCategory>()
            .map_err(FraudError::StorageError)?,
        severity: severity
            .parse::<Severity>()
            .map_err(FraudError::StorageError)?,
        description: row.get("description"),
        automated: row.get("automated"),
        resolved: row.get("resolved"),
        resolved_at: resolved_at
            .as_deref()
            .map(decode_ts)
            .transpose()
            .map_err(FraudError::StorageError)?,
        created_at: decode_ts(&created_at).map_err(FraudError::StorageError)?,
    })
}
