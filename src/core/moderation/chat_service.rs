// Investment chat service - monitored conversations between investors and sellers.
//
// This service handles:
// - Sending a message (keyword scan, flagging, fraud flag for the sender)
// - Reading a conversation as a participant or as an admin
// - Admin review and manual flagging of messages

use super::chat_models::{
    ChatMessage, ConversationTranscript, FlaggedMessageReview, Investment, NewChatMessage,
    SentMessage,
};
use super::keyword_flagger::{find_suspicious_keywords, flag_reason};
use crate::core::audit::{AdminAction, AdminLogStore, AuditService, NewAdminLogEntry};
use crate::core::fraud::{FlagCategory, FraudFlagStore, NewFraudFlag, Severity};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Flag reason is required")]
    EmptyReason,

    #[error("Not a participant of this investment")]
    NotParticipant,

    #[error("Account is banned")]
    Banned,

    #[error("Investment not found")]
    InvestmentNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_investment(&self, investment_id: Uuid) -> Result<Option<Investment>, ChatError>;

    /// Whether the user's account is banned. Unknown users are not banned.
    async fn is_banned(&self, user_id: Uuid) -> Result<bool, ChatError>;

    async fn insert_message(&self, message: NewChatMessage) -> Result<ChatMessage, ChatError>;

    /// All messages of an investment, oldest first.
    async fn messages_for_investment(
        &self,
        investment_id: Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Every flagged message, newest first.
    async fn flagged_messages(&self) -> Result<Vec<ChatMessage>, ChatError>;

    /// Mark a message flagged. Returns `None` if the message does not exist.
    async fn flag_message(
        &self,
        message_id: Uuid,
        reason: &str,
    ) -> Result<Option<ChatMessage>, ChatError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ChatService<C: ConversationStore, F: FraudFlagStore, A: AdminLogStore> {
    conversations: C,
    flags: F,
    audit: Arc<AuditService<A>>,
}

impl<C: ConversationStore, F: FraudFlagStore, A: AdminLogStore> ChatService<C, F, A> {
    pub fn new(conversations: C, flags: F, audit: Arc<AuditService<A>>) -> Self {
        Self {
            conversations,
            flags,
            audit,
        }
    }

    async fn participant_investment(
        &self,
        investment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Investment, ChatError> {
        match self.conversations.get_investment(investment_id).await? {
            Some(investment) if investment.is_participant(user_id) => Ok(investment),
            _ => Err(ChatError::NotParticipant),
        }
    }

    /// Send a message in an investment conversation.
    ///
    /// Banned senders are refused. Messages containing suspicious keywords
    /// are stored flagged, and a medium-severity fraud flag is raised against
    /// the sender. Any storage failure aborts the whole send.
    pub async fn send_message(
        &self,
        investment_id: Uuid,
        sender_id: Uuid,
        message_text: &str,
    ) -> Result<SentMessage, ChatError> {
        if message_text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let investment = self.participant_investment(investment_id, sender_id).await?;
        if self.conversations.is_banned(sender_id).await? {
            return Err(ChatError::Banned);
        }

        let matches = find_suspicious_keywords(message_text);
        let flagged = !matches.is_empty();

        let message = self
            .conversations
            .insert_message(NewChatMessage {
                investment_id,
                property_id: investment.property_id,
                sender_id,
                message_text: message_text.to_string(),
                flagged,
                flag_reason: flagged.then(|| flag_reason(&matches)),
            })
            .await?;

        if flagged {
            self.flags
                .insert_flag(NewFraudFlag {
                    user_id: sender_id,
                    category: FlagCategory::ChatSuspiciousWords,
                    severity: Severity::Medium,
                    description: format!(
                        "Suspicious keywords in investment chat: {}",
                        matches.join(", ")
                    ),
                    automated: true,
                })
                .await
                .map_err(|e| ChatError::StorageError(e.to_string()))?;

            tracing::warn!(
                %investment_id,
                %sender_id,
                keywords = %matches.join(", "),
                "Flagged investment chat message"
            );
        }

        Ok(SentMessage {
            message,
            matched_keywords: matches.into_iter().map(String::from).collect(),
        })
    }

    /// Read a conversation as one of its participants.
    pub async fn conversation(
        &self,
        investment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.participant_investment(investment_id, user_id).await?;
        self.conversations
            .messages_for_investment(investment_id)
            .await
    }

    /// Read any conversation as an admin.
    pub async fn transcript(&self, investment_id: Uuid) -> Result<ConversationTranscript, ChatError> {
        let investment = self
            .conversations
            .get_investment(investment_id)
            .await?
            .ok_or(ChatError::InvestmentNotFound)?;
        let messages = self
            .conversations
            .messages_for_investment(investment_id)
            .await?;

        Ok(ConversationTranscript {
            investment,
            messages,
        })
    }

    /// Flagged messages for admin review, each rescanned for keywords.
    pub async fn flagged_for_review(&self) -> Result<Vec<FlaggedMessageReview>, ChatError> {
        let messages = self.conversations.flagged_messages().await?;

        Ok(messages
            .into_iter()
            .map(|message| {
                let matched_keywords = find_suspicious_keywords(&message.message_text)
                    .into_iter()
                    .map(String::from)
                    .collect();
                FlaggedMessageReview {
                    message,
                    matched_keywords,
                }
            })
            .collect())
    }

    /// Flag a message by hand (admin action).
    pub async fn flag_message(
        &self,
        admin_id: Uuid,
        message_id: Uuid,
        reason: &str,
    ) -> Result<ChatMessage, ChatError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ChatError::EmptyReason);
        }

        let message = self
            .conversations
            .flag_message(message_id, reason)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::ChatFlagged,
                target_user_id: Some(message.sender_id),
                details: format!("Message flagged: {}", reason),
            })
            .await;

        Ok(message)
    }
}

// ============================================================================
// TESTS
// ============================================================================
