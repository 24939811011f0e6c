// Audit module - an append-only record of what admins did.
//
// Writing an entry never fails the action being audited: if the store is
// down the failure is logged and the caller carries on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Hard cap on how many entries one listing returns.
pub const MAX_LOG_PAGE: usize = 500;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ChatFlagged,
    FraudAlert,
    FraudFlagResolved,
    DocumentApproved,
    DocumentRejected,
    AccountBanned,
    AccountVerified,
    /// Written by the document upload flow, not by this service.
    PropertyVerified,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::ChatFlagged => "chat_flagged",
            AdminAction::FraudAlert => "fraud_alert",
            AdminAction::FraudFlagResolved => "fraud_flag_resolved",
            AdminAction::DocumentApproved => "document_approved",
            AdminAction::DocumentRejected => "document_rejected",
            AdminAction::AccountBanned => "account_banned",
            AdminAction::AccountVerified => "account_verified",
            AdminAction::PropertyVerified => "property_verified",
        }
    }
}

impl FromStr for AdminAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat_flagged" => Ok(AdminAction::ChatFlagged),
            "fraud_alert" => Ok(AdminAction::FraudAlert),
            "fraud_flag_resolved" => Ok(AdminAction::FraudFlagResolved),
            "document_approved" => Ok(AdminAction::DocumentApproved),
            "document_rejected" => Ok(AdminAction::DocumentRejected),
            "account_banned" => Ok(AdminAction::AccountBanned),
            "account_verified" => Ok(AdminAction::AccountVerified),
            "property_verified" => Ok(AdminAction::PropertyVerified),
            other => Err(format!("unknown admin action '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLogEntry {
    pub id: Uuid,
    /// `None` for rows written without an acting admin, e.g. by the document upload flow.
    pub admin_id: Option<Uuid>,
    pub action: AdminAction,
    pub target_user_id: Option<Uuid>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminLogEntry {
    pub admin_id: Option<Uuid>,
    pub action: AdminAction,
    pub target_user_id: Option<Uuid>,
    pub details: String,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait AdminLogStore: Send + Sync {
    async fn append(&self, entry: NewAdminLogEntry) -> Result<AdminLogEntry, AuditError>;

    /// Most recent entries first.
    async fn recent(&self, limit: usize) -> Result<Vec<AdminLogEntry>, AuditError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AuditService<S: AdminLogStore> {
    store: S,
    default_limit: usize,
}

impl<S: AdminLogStore> AuditService<S> {
    pub fn new(store: S, default_limit: usize) -> Self {
        Self {
            store,
            default_limit: default_limit.clamp(1, MAX_LOG_PAGE),
        }
    }

    /// Append an entry, logging instead of failing when the store errors.
    pub async fn record(&self, entry: NewAdminLogEntry) {
        let action = entry.action;
        if let Err(e) = self.store.append(entry).await {
            tracing::warn!(action = action.as_str(), "Failed to write admin log: {}", e);
        }
    }

    /// List the latest entries. `limit` falls back to the configured default.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<AdminLogEntry>, AuditError> {
        let limit = limit.unwrap_or(self.default_limit).clamp(1, MAX_LOG_PAGE);
        self.store.recent(limit).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-memory admin log for service tests across the crate.
    #[derive(Clone, Default)]
    pub(crate) struct MockAdminLogStore {
        pub entries: Arc<DashMap<Uuid, AdminLogEntry>>,
        pub fail: Arc<AtomicBool>,
    }

    impl MockAdminLogStore {
        pub(crate) fn actions(&self) -> Vec<AdminAction> {
            let mut entries: Vec<AdminLogEntry> =
                self.entries.iter().map(|e| e.value().clone()).collect();
            entries.sort_by_key(|e| e.created_at);
            entries.into_iter().map(|e| e.action).collect()
        }
    }

    #[async_trait]
    impl AdminLogStore for MockAdminLogStore {
        async fn append(&self, entry: NewAdminLogEntry) -> Result<AdminLogEntry, AuditError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuditError::StorageError("disk full".to_string()));
            }
            let stored = AdminLogEntry {
                id: Uuid::new_v4(),
                admin_id: entry.admin_id,
                action: entry.action,
                target_user_id: entry.target_user_id,
                details: entry.details,
                // Spread timestamps so ordering is deterministic.
                created_at: Utc::now()
                    + chrono::Duration::milliseconds(self.entries.len() as i64),
            };
            self.entries.insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn recent(&self, limit: usize) -> Result<Vec<AdminLogEntry>, AuditError> {
            let mut entries: Vec<AdminLogEntry> =
                self.entries.iter().map(|e| e.value().clone()).collect();
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            entries.truncate(limit);
            Ok(entries)
        }
    }

    fn entry(details: &str) -> NewAdminLogEntry {
        NewAdminLogEntry {
            admin_id: Some(Uuid::new_v4()),
            action: AdminAction::ChatFlagged,
            target_user_id: None,
            details: details.to_string(),
        }
    }

    #[test]
    fn test_action_labels_parse_back() {
        for action in [
            AdminAction::ChatFlagged,
            AdminAction::FraudAlert,
            AdminAction::FraudFlagResolved,
            AdminAction::DocumentApproved,
            AdminAction::DocumentRejected,
            AdminAction::AccountBanned,
            AdminAction::AccountVerified,
            AdminAction::PropertyVerified,
        ] {
            assert_eq!(action.as_str().parse::<AdminAction>(), Ok(action));
        }
        assert!("listing_deleted".parse::<AdminAction>().is_err());
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let store = MockAdminLogStore::default();
        let service = AuditService::new(store.clone(), 100);

        service.record(entry("first")).await;
        service.record(entry("second")).await;

        let entries = service.recent(None).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        let store = MockAdminLogStore::default();
        store.fail.store(true, Ordering::SeqCst);
        let service = AuditService::new(store.clone(), 100);

        service.record(entry("lost")).await;

        assert!(store.entries.is_empty());
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let store = MockAdminLogStore::default();
        let service = AuditService::new(store.clone(), 1);
        for i in 0..3 {
            service.record(entry(&format!("entry {}", i))).await;
        }

        assert_eq!(service.recent(None).await.unwrap().len(), 1);
        assert_eq!(service.recent(Some(0)).await.unwrap().len(), 1);
        assert_eq!(service.recent(Some(10_000)).await.unwrap().len(), 3);
    }
}
