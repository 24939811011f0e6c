// Verification module - document review and account standing.
//
// Admins approve or reject uploaded documents and ban or verify accounts.
// The document states written here are the ones the fraud patterns count.

use crate::core::access::Profile;
use crate::core::audit::{AdminAction, AdminLogStore, AuditService, NewAdminLogEntry};
use crate::core::fraud::DocumentStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: String,
    pub status: DocumentStatus,
    /// Admin who last reviewed the document
    pub verified_by: Option<Uuid>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Document not found")]
    DocumentNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Reason is required")]
    EmptyReason,

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Documents awaiting review, oldest first.
    async fn pending_documents(&self) -> Result<Vec<Document>, VerificationError>;

    /// Set a document's status. Returns `None` if the document does not exist.
    async fn review_document(
        &self,
        document_id: Uuid,
        status: DocumentStatus,
        reviewer_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Option<Document>, VerificationError>;

    async fn ban_profile(
        &self,
        user_id: Uuid,
        reason: &str,
        banned_at: DateTime<Utc>,
    ) -> Result<Option<Profile>, VerificationError>;

    async fn verify_profile(&self, user_id: Uuid) -> Result<Option<Profile>, VerificationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct VerificationService<S: VerificationStore, A: AdminLogStore> {
    store: S,
    audit: Arc<AuditService<A>>,
}

impl<S: VerificationStore, A: AdminLogStore> VerificationService<S, A> {
    pub fn new(store: S, audit: Arc<AuditService<A>>) -> Self {
        Self { store, audit }
    }

    pub async fn pending_documents(&self) -> Result<Vec<Document>, VerificationError> {
        self.store.pending_documents().await
    }

    pub async fn approve_document(
        &self,
        admin_id: Uuid,
        document_id: Uuid,
    ) -> Result<Document, VerificationError> {
        let document = self
            .store
            .review_document(document_id, DocumentStatus::Approved, admin_id, None)
            .await?
            .ok_or(VerificationError::DocumentNotFound)?;

        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::DocumentApproved,
                target_user_id: Some(document.user_id),
                details: format!("Document approved: {}", document.document_type),
            })
            .await;

        Ok(document)
    }

    /// Reject a document. The reason is kept as the document's admin notes.
    pub async fn reject_document(
        &self,
        admin_id: Uuid,
        document_id: Uuid,
        reason: &str,
    ) -> Result<Document, VerificationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(VerificationError::EmptyReason);
        }

        let document = self
            .store
            .review_document(document_id, DocumentStatus::Rejected, admin_id, Some(reason))
            .await?
            .ok_or(VerificationError::DocumentNotFound)?;

        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::DocumentRejected,
                target_user_id: Some(document.user_id),
                details: format!("Document rejected: {}", reason),
            })
            .await;

        Ok(document)
    }

    /// Ban an account. Banned users can no longer send chat messages or pass
    /// the admin gate.
    pub async fn ban_user(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        reason: &str,
    ) -> Result<Profile, VerificationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(VerificationError::EmptyReason);
        }

        let profile = self
            .store
            .ban_profile(user_id, reason, Utc::now())
            .await?
            .ok_or(VerificationError::UserNotFound)?;

        tracing::warn!(%user_id, %admin_id, "Account banned");
        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::AccountBanned,
                target_user_id: Some(user_id),
                details: format!("Account banned: {}", reason),
            })
            .await;

        Ok(profile)
    }

    pub async fn verify_user(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
    ) -> Result<Profile, VerificationError> {
        let profile = self
            .store
            .verify_profile(user_id)
            .await?
            .ok_or(VerificationError::UserNotFound)?;

        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::AccountVerified,
                target_user_id: Some(user_id),
                details: "Account verified".to_string(),
            })
            .await;

        Ok(profile)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::tests::MockAdminLogStore;
    use dashmap::DashMap;

    #[derive(Default)]
    struct MockVerificationStore {
        documents: DashMap<Uuid, Document>,
        profiles: DashMap<Uuid, Profile>,
    }

    impl MockVerificationStore {
        fn add_document(&self, user_id: Uuid) -> Uuid {
            let id = Uuid::new_v4();
            self.documents.insert(
                id,
                Document {
                    id,
                    user_id,
                    document_type: "passport".to_string(),
                    status: DocumentStatus::Pending,
                    verified_by: None,
                    admin_notes: None,
                    created_at: Utc::now(),
                },
            );
            id
        }

        fn add_profile(&self) -> Uuid {
            let id = Uuid::new_v4();
            self.profiles.insert(
                id,
                Profile {
                    id,
                    first_name: None,
                    last_name: None,
                    email: None,
                    role: None,
                    is_admin: false,
                    is_banned: false,
                    ban_reason: None,
                    verified: false,
                },
            );
            id
        }
    }

    #[async_trait]
    impl VerificationStore for MockVerificationStore {
        async fn pending_documents(&self) -> Result<Vec<Document>, VerificationError> {
            Ok(self
                .documents
                .iter()
                .filter(|d| d.status == DocumentStatus::Pending)
                .map(|d| d.clone())
                .collect())
        }

        async fn review_document(
            &self,
            document_id: Uuid,
            status: DocumentStatus,
            reviewer_id: Uuid,
            notes: Option<&str>,
        ) -> Result<Option<Document>, VerificationError> {
            Ok(self.documents.get_mut(&document_id).map(|mut d| {
                d.status = status;
                d.verified_by = Some(reviewer_id);
                d.admin_notes = notes.map(String::from);
                d.clone()
            }))
        }

        async fn ban_profile(
            &self,
            user_id: Uuid,
            reason: &str,
            _banned_at: DateTime<Utc>,
        ) -> Result<Option<Profile>, VerificationError> {
            Ok(self.profiles.get_mut(&user_id).map(|mut p| {
                p.is_banned = true;
                p.ban_reason = Some(reason.to_string());
                p.clone()
            }))
        }

        async fn verify_profile(
            &self,
            user_id: Uuid,
        ) -> Result<Option<Profile>, VerificationError> {
            Ok(self.profiles.get_mut(&user_id).map(|mut p| {
                p.verified = true;
                p.clone()
            }))
        }
    }

    fn service(
        store: MockVerificationStore,
    ) -> (
        VerificationService<MockVerificationStore, MockAdminLogStore>,
        MockAdminLogStore,
    ) {
        let log = MockAdminLogStore::default();
        let audit = Arc::new(AuditService::new(log.clone(), 100));
        (VerificationService::new(store, audit), log)
    }

    #[tokio::test]
    async fn test_document_review() {
        let store = MockVerificationStore::default();
        let user = Uuid::new_v4();
        let passport = store.add_document(user);
        let deed = store.add_document(user);
        let (service, log) = service(store);
        let admin = Uuid::new_v4();

        let approved = service.approve_document(admin, passport).await.unwrap();
        assert_eq!(approved.status, DocumentStatus::Approved);
        assert_eq!(approved.verified_by, Some(admin));

        let rejected = service
            .reject_document(admin, deed, "  Blurry scan ")
            .await
            .unwrap();
        assert_eq!(rejected.status, DocumentStatus::Rejected);
        assert_eq!(rejected.admin_notes.as_deref(), Some("Blurry scan"));

        assert!(service.pending_documents().await.unwrap().is_empty());
        assert_eq!(
            log.actions(),
            vec![AdminAction::DocumentApproved, AdminAction::DocumentRejected]
        );
    }

    #[tokio::test]
    async fn test_document_review_errors() {
        let store = MockVerificationStore::default();
        let document = store.add_document(Uuid::new_v4());
        let (service, log) = service(store);

        assert!(matches!(
            service.reject_document(Uuid::new_v4(), document, "   ").await,
            Err(VerificationError::EmptyReason)
        ));
        assert!(matches!(
            service.approve_document(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(VerificationError::DocumentNotFound)
        ));
        assert!(log.entries.is_empty());
    }

    #[tokio::test]
    async fn test_account_standing() {
        let store = MockVerificationStore::default();
        let user = store.add_profile();
        let (service, log) = service(store);
        let admin = Uuid::new_v4();

        let verified = service.verify_user(admin, user).await.unwrap();
        assert!(verified.verified);

        let banned = service
            .ban_user(admin, user, "Asked for upfront payment")
            .await
            .unwrap();
        assert!(banned.is_banned);
        assert_eq!(banned.ban_reason.as_deref(), Some("Asked for upfront payment"));

        assert!(matches!(
            service.ban_user(admin, user, "").await,
            Err(VerificationError::EmptyReason)
        ));
        assert!(matches!(
            service.verify_user(admin, Uuid::new_v4()).await,
            Err(VerificationError::UserNotFound)
        ));
        assert_eq!(
            log.actions(),
            vec![AdminAction::AccountVerified, AdminAction::AccountBanned]
        );
    }
}
