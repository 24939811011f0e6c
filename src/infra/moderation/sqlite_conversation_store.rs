// SQLite-backed conversation store for monitored investment chat.
//
// Reads `investments` and `profiles` for sender checks; owns
// `investor_conversations`.

use crate::core::moderation::{ChatError, ChatMessage, ConversationStore, Investment, NewChatMessage};
use crate::infra::database::{decode_ts, decode_uuid, encode_ts};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = "id, investment_id, property_id, sender_id, message_text, \
                               flagged_by_admin, admin_flag_reason, created_at";

#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: Pool<Sqlite>,
}

impl SqliteConversationStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn fetch_message(&self, message_id: Uuid) -> Result<Option<ChatMessage>, ChatError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM investor_conversations WHERE id = ?",
            MESSAGE_COLUMNS
        ))
        .bind(message_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::StorageError(e.to_string()))?;

        row.as_ref().map(row_to_message).transpose()
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn get_investment(&self, investment_id: Uuid) -> Result<Option<Investment>, ChatError> {
        let row = sqlx::query(
            r#"
            SELECT id, property_id, investor_id, seller_id, status, created_at
            FROM investments
            WHERE id = ?
            "#,
        )
        .bind(investment_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::StorageError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Investment {
            id: uuid_column(&row, "id")?,
            property_id: uuid_column(&row, "property_id")?,
            investor_id: uuid_column(&row, "investor_id")?,
            seller_id: uuid_column(&row, "seller_id")?,
            status: row.get("status"),
            created_at: decode_ts(&row.get::<String, _>("created_at"))
                .map_err(ChatError::StorageError)?,
        }))
    }

    async fn is_banned(&self, user_id: Uuid) -> Result<bool, ChatError> {
        let row = sqlx::query("SELECT is_banned FROM profiles WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChatError::StorageError(e.to_string()))?;

        Ok(row.map(|r| r.get::<bool, _>("is_banned")).unwrap_or(false))
    }

    async fn insert_message(&self, message: NewChatMessage) -> Result<ChatMessage, ChatError> {
        let stored = ChatMessage {
            id: Uuid::new_v4(),
            investment_id: message.investment_id,
            property_id: message.property_id,
            sender_id: message.sender_id,
            message_text: message.message_text,
            flagged: message.flagged,
            flag_reason: message.flag_reason,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO investor_conversations (
                id, investment_id, property_id, sender_id, message_text,
                flagged_by_admin, admin_flag_reason, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(stored.id.to_string())
        .bind(stored.investment_id.to_string())
        .bind(stored.property_id.to_string())
        .bind(stored.sender_id.to_string())
        .bind(&stored.message_text)
        .bind(stored.flagged)
        .bind(&stored.flag_reason)
        .bind(encode_ts(stored.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::StorageError(e.to_string()))?;

        Ok(stored)
    }

    async fn messages_for_investment(
        &self,
        investment_id: Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM investor_conversations WHERE investment_id = ? \
             ORDER BY created_at ASC, rowid ASC",
            MESSAGE_COLUMNS
        ))
        .bind(investment_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn flagged_messages(&self) -> Result<Vec<ChatMessage>, ChatError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM investor_conversations WHERE flagged_by_admin = 1 \
             ORDER BY created_at DESC, rowid DESC",
            MESSAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::StorageError(e.to_string()))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn flag_message(
        &self,
        message_id: Uuid,
        reason: &str,
    ) -> Result<Option<ChatMessage>, ChatError> {
        let result = sqlx::query(
            r#"
            UPDATE investor_conversations
            SET flagged_by_admin = 1, admin_flag_reason = ?
            WHERE id = ?
            "#,
        )
        .bind(reason)
        .bind(message_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_message(message_id).await
    }
}

fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid, ChatError> {
    decode_uuid(&row.get::<String, _>(column)).map_err(ChatError::StorageError)
}

fn row_to_message(row: &SqliteRow) -> Result<ChatMessage, ChatError> {
    Ok(ChatMessage {
        id: uuid_column(row, "id")?,
        investment_id: uuid_column(row, "investment_id")?,
        property_id: uuid_column(row, "property_id")?,
        sender_id: uuid_column(row, "sender_id")?,
        message_text: row.get("message_text"),
        flagged: row.get("flagged_by_admin"),
        flag_reason: row.get("admin_flag_reason"),
        created_at: decode_ts(&row.get::<String, _>("created_at"))
            .map_err(ChatError::StorageError)?,
    })
}
