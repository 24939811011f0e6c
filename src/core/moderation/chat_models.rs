// Investment chat models - the proposals being discussed and their messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An investment proposal between an investor and a property's seller.
#[derive(Debug, Clone, Serialize)]
pub struct Investment {
    pub id: Uuid,
    pub property_id: Uuid,
    pub investor_id: Uuid,
    pub seller_id: Uuid,
    /// `proposed`, `accepted`, `active`, `completed` or `rejected`
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Investment {
    /// Only the two parties of a proposal may read or write its chat.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.investor_id == user_id || self.seller_id == user_id
    }
}

/// A message in an investment conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub investment_id: Uuid,
    pub property_id: Uuid,
    pub sender_id: Uuid,
    pub message_text: String,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub investment_id: Uuid,
    pub property_id: Uuid,
    pub sender_id: Uuid,
    pub message_text: String,
    pub flagged: bool,
    pub flag_reason: Option<String>,
}

/// Result of sending a message: the stored row and what the scan found.
#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub matched_keywords: Vec<String>,
}

/// A flagged message as shown to a reviewing admin.
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedMessageReview {
    #[serde(flatten)]
    pub message: ChatMessage,
    /// Keywords found in the current body. Empty for messages an admin flagged by hand.
    pub matched_keywords: Vec<String>,
}

/// Full conversation of one investment, for admin review.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTranscript {
    pub investment: Investment,
    pub messages: Vec<ChatMessage>,
}
