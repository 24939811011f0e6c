use crate::core::audit::{AdminAction, AdminLogEntry, AdminLogStore, AuditError, NewAdminLogEntry};
use crate::infra::database::{decode_optional_uuid, decode_ts, decode_uuid, encode_ts};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteAuditStore {
    pool: Pool<Sqlite>,
}

impl SqliteAuditStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminLogStore for SqliteAuditStore {
    async fn append(&self, entry: NewAdminLogEntry) -> Result<AdminLogEntry, AuditError> {
        let stored = AdminLogEntry {
            id: Uuid::new_v4(),
            admin_id: entry.admin_id,
            action: entry.action,
            target_user_id: entry.target_user_id,
            details: entry.details,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO admin_logs (id, admin_id, action_type, target_user_id, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(stored.id.to_string())
        .bind(stored.admin_id.map(|id| id.to_string()))
        .bind(stored.action.as_str())
        .bind(stored.target_user_id.map(|id| id.to_string()))
        .bind(&stored.details)
        .bind(encode_ts(stored.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::StorageError(e.to_string()))?;

        Ok(stored)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AdminLogEntry>, AuditError> {
        let rows = sqlx::query(
            r#"
            SELECT id, admin_id, action_type, target_user_id, details, created_at
            FROM admin_logs
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuditError::StorageError(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let action: String = row.get("action_type");
            let created_at: String = row.get("created_at");

            // Other parts of the marketplace write to this table too.
            let action = match action.parse::<AdminAction>() {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!(entry_id = %id, "Skipping admin log row: {}", e);
                    continue;
                }
            };

            entries.push(AdminLogEntry {
                id: decode_uuid(&id).map_err(AuditError::StorageError)?,
                admin_id: decode_optional_uuid(row.get("admin_id"))
                    .map_err(AuditError::StorageError)?,
                action,
                target_user_id: decode_optional_uuid(row.get("target_user_id"))
                    .map_err(AuditError::StorageError)?,
                details: row.get("details"),
                created_at: decode_ts(&created_at).map_err(AuditError::StorageError)?,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::seed;

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let pool = seed::memory_pool().await;
        let store = SqliteAuditStore::new(pool);
        let admin = Uuid::new_v4();

        for (action, details) in [
            (AdminAction::FraudAlert, "first"),
            (AdminAction::ChatFlagged, "second"),
            (AdminAction::FraudFlagResolved, "third"),
        ] {
            store
                .append(NewAdminLogEntry {
                    admin_id: Some(admin),
                    action,
                    target_user_id: None,
                    details: details.to_string(),
                })
                .await
                .unwrap();
        }

        let entries = store.recent(2).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].details, "third");
        assert_eq!(entries[0].action, AdminAction::FraudFlagResolved);
        assert_eq!(entries[1].details, "second");
        assert_eq!(entries[0].admin_id, Some(admin));
        assert_eq!(entries[0].target_user_id, None);
    }

    async fn insert_raw(pool: &Pool<Sqlite>, action_type: &str, admin_id: Option<Uuid>) {
        sqlx::query(
            r#"
            INSERT INTO admin_logs (id, admin_id, action_type, target_user_id, details, created_at)
            VALUES (?, ?, ?, NULL, 'written elsewhere', ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(admin_id.map(|id| id.to_string()))
        .bind(action_type)
        .bind(encode_ts(Utc::now()))
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_rows_from_other_writers_are_listed() {
        let pool = seed::memory_pool().await;
        insert_raw(&pool, "property_verified", None).await;
        insert_raw(&pool, "document_approved", Some(Uuid::new_v4())).await;
        let store = SqliteAuditStore::new(pool);

        let entries = store.recent(10).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AdminAction::DocumentApproved);
        assert_eq!(entries[1].action, AdminAction::PropertyVerified);
        assert_eq!(entries[1].admin_id, None);
    }

    #[tokio::test]
    async fn test_unknown_action_rows_are_skipped() {
        let pool = seed::memory_pool().await;
        insert_raw(&pool, "listing_deleted", None).await;
        let store = SqliteAuditStore::new(pool);
        store
            .append(NewAdminLogEntry {
                admin_id: None,
                action: AdminAction::FraudAlert,
                target_user_id: None,
                details: "kept".to_string(),
            })
            .await
            .unwrap();

        let entries = store.recent(10).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].details, "kept");
    }
}
