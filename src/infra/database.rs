// SQLite connection and schema.
//
// Tables:
// - profiles: Marketplace users, their admin/ban state and verification
// - documents: Uploaded verification documents
// - investments: Investment proposals between investors and sellers
// - investor_conversations: Monitored investment chat
// - fraud_flags: Detected or admin-raised risks
// - admin_logs: Append-only audit trail
//
// Ids are stored as hyphenated UUID text. Timestamps are fixed-width RFC 3339
// UTC strings so that text comparison matches time order.

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Open a pool for `database_url`, creating the database file if needed.
pub async fn connect(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    let in_memory = database_url.contains(":memory:");

    if !in_memory {
        let path_str = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        let path_str = path_str.split('?').next().unwrap_or(path_str);
        if let Some(parent) = Path::new(path_str).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
    }

    let conn_str = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    let options = SqliteConnectOptions::from_str(&conn_str)
        .with_context(|| format!("Invalid DATABASE_URL {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every in-memory connection is its own database, so keep exactly one.
    let max_connections = if in_memory { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to {}", database_url))?;

    Ok(pool)
}

/// Create all tables and indexes. Safe to run on every startup.
pub async fn migrate(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            email TEXT,
            user_type TEXT,
            is_admin BOOLEAN NOT NULL DEFAULT 0,
            is_banned BOOLEAN NOT NULL DEFAULT 0,
            ban_reason TEXT,
            ban_date TEXT,
            verification_status TEXT NOT NULL DEFAULT 'unverified',
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES profiles(id),
            document_type TEXT NOT NULL,
            verification_status TEXT NOT NULL DEFAULT 'pending',
            verified_by TEXT REFERENCES profiles(id),
            admin_notes TEXT,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_documents_user_status
            ON documents(user_id, verification_status);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS investments (
            id TEXT PRIMARY KEY,
            property_id TEXT NOT NULL,
            investor_id TEXT NOT NULL REFERENCES profiles(id),
            seller_id TEXT NOT NULL REFERENCES profiles(id),
            status TEXT NOT NULL DEFAULT 'proposed',
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_investments_investor_created
            ON investments(investor_id, created_at);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS investor_conversations (
            id TEXT PRIMARY KEY,
            investment_id TEXT NOT NULL REFERENCES investments(id),
            property_id TEXT NOT NULL,
            sender_id TEXT NOT NULL REFERENCES profiles(id),
            message_text TEXT NOT NULL,
            flagged_by_admin BOOLEAN NOT NULL DEFAULT 0,
            admin_flag_reason TEXT,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_conversations_investment
            ON investor_conversations(investment_id, created_at);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS fraud_flags (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES profiles(id),
            flag_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            description TEXT NOT NULL,
            automated BOOLEAN NOT NULL DEFAULT 0,
            resolved BOOLEAN NOT NULL DEFAULT 0,
            resolved_at TEXT,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS admin_logs (
            id TEXT PRIMARY KEY,
            admin_id TEXT,
            action_type TEXT NOT NULL,
            target_user_id TEXT,
            details TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to run migration")?;
    }

    tracing::info!("Database schema is up to date");
    Ok(())
}

pub fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_ts(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

pub fn decode_uuid(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|e| format!("invalid id '{}': {}", raw, e))
}

pub fn decode_optional_uuid(raw: Option<String>) -> Result<Option<Uuid>, String> {
    raw.as_deref().map(decode_uuid).transpose()
}

/// Row builders for tests. Production rows come from the rest of the marketplace.
#[cfg(test)]
pub(crate) mod seed {
    use super::*;
    use chrono::Duration;

    pub(crate) async fn memory_pool() -> Pool<Sqlite> {
        let pool = connect("sqlite::memory:").await.unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    pub(crate) async fn profile(pool: &Pool<Sqlite>, user_type: &str, is_admin: bool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO profiles (id, first_name, last_name, email, user_type, is_admin, created_at)
            VALUES (?, 'Test', 'User', ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(format!("{}@example.com", id))
        .bind(user_type)
        .bind(is_admin)
        .bind(encode_ts(Utc::now()))
        .execute(pool)
        .await
        .unwrap();
        id
    }

    pub(crate) async fn document(pool: &Pool<Sqlite>, user_id: Uuid, status: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO documents (id, user_id, document_type, verification_status, created_at)
            VALUES (?, ?, 'national_id', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(status)
        .bind(encode_ts(Utc::now()))
        .execute(pool)
        .await
        .unwrap();
        id
    }

    /// Insert an investment created `age` ago.
    pub(crate) async fn investment(
        pool: &Pool<Sqlite>,
        investor_id: Uuid,
        seller_id: Uuid,
        age: Duration,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO investments (id, property_id, investor_id, seller_id, status, created_at)
            VALUES (?, ?, ?, ?, 'proposed', ?)
            "#,
        )
        .bind(id.to_string())
        .bind(Uuid::new_v4().to_string())
        .bind(investor_id.to_string())
        .bind(seller_id.to_string())
        .bind(encode_ts(Utc::now() - age))
        .execute(pool)
        .await
        .unwrap();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_is_created_and_migrated_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("marketplace.db");
        let url = format!("sqlite://{}", path.display());

        let pool = connect(&url).await.unwrap();
        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = decode_ts("2026-01-01T10:00:00Z").unwrap();
        let later = earlier + chrono::Duration::milliseconds(500);

        assert!(encode_ts(earlier) < encode_ts(later));
        assert_eq!(decode_ts(&encode_ts(later)).unwrap(), later);
    }

    #[test]
    fn test_bad_ids_are_reported() {
        assert!(decode_uuid("not-a-uuid").is_err());
        assert_eq!(decode_optional_uuid(None), Ok(None));
    }
}
