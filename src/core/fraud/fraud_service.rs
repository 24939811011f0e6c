// Fraud service - runs the automated patterns against one user and manages
// the resulting flags.
//
// Each pattern fetches its own counts. A pattern whose fetch fails is logged
// and skipped; the remaining patterns still run and still raise flags.

use super::fraud_models::{
    DocumentStatus, FlagCategory, FraudFlag, FraudPattern, FraudReport, FraudThresholds,
    NewFraudFlag, Severity, UserRole,
};
use crate::core::audit::{AdminAction, AdminLogStore, AuditService, NewAdminLogEntry};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum FraudError {
    #[error("User not found")]
    UserNotFound,

    #[error("Fraud flag not found")]
    FlagNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAITS (PORTS)
// ============================================================================

/// Aggregate facts about a user that the patterns are evaluated against.
#[async_trait]
pub trait FraudSignalSource: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> Result<bool, FraudError>;

    /// Number of the user's documents in the given verification state.
    async fn count_documents(
        &self,
        user_id: Uuid,
        status: DocumentStatus,
    ) -> Result<u64, FraudError>;

    /// Number of investments the user proposed at or after `since`.
    async fn count_investments_since(
        &self,
        investor_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, FraudError>;

    /// Declared role, `None` when missing or unrecognised.
    async fn user_role(&self, user_id: Uuid) -> Result<Option<UserRole>, FraudError>;
}

/// Persistence for fraud flags. Flags are resolved, never deleted.
#[async_trait]
pub trait FraudFlagStore: Send + Sync {
    async fn insert_flag(&self, flag: NewFraudFlag) -> Result<FraudFlag, FraudError>;

    /// Unresolved flags, newest first.
    async fn unresolved_flags(&self) -> Result<Vec<FraudFlag>, FraudError>;

    async fn get_flag(&self, flag_id: Uuid) -> Result<Option<FraudFlag>, FraudError>;

    /// Mark a flag resolved. Returns `None` if no such flag exists.
    async fn resolve_flag(
        &self,
        flag_id: Uuid,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<FraudFlag>, FraudError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct FraudService<S: FraudSignalSource, F: FraudFlagStore, A: AdminLogStore> {
    signals: S,
    flags: F,
    audit: Arc<AuditService<A>>,
    thresholds: FraudThresholds,
}

impl<S: FraudSignalSource, F: FraudFlagStore, A: AdminLogStore> FraudService<S, F, A> {
    pub fn new(signals: S, flags: F, audit: Arc<AuditService<A>>) -> Self {
        Self {
            signals,
            flags,
            audit,
            thresholds: FraudThresholds::default(),
        }
    }

    /// Run every pattern against `user_id` and raise a flag for each one that triggers.
    ///
    /// # Arguments
    /// * `admin_id` - The admin who asked for the run
    /// * `user_id` - The user being checked
    ///
    /// # Returns
    /// The names of the triggered patterns, in evaluation order.
    pub async fn run_detection(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
    ) -> Result<FraudReport, FraudError> {
        if !self.signals.user_exists(user_id).await? {
            return Err(FraudError::UserNotFound);
        }

        let now = Utc::now();
        let mut triggered = Vec::new();

        for pattern in FraudPattern::ALL {
            match self.evaluate(pattern, user_id, now).await {
                Ok(true) => {
                    triggered.push(pattern.name().to_string());

                    if let Err(e) = self.flags.insert_flag(pattern.to_flag(user_id)).await {
                        tracing::error!(
                            pattern = pattern.name(),
                            %user_id,
                            "Failed to store fraud flag: {}",
                            e
                        );
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        pattern = pattern.name(),
                        %user_id,
                        "Error checking pattern: {}",
                        e
                    );
                }
            }
        }

        if !triggered.is_empty() {
            self.audit
                .record(NewAdminLogEntry {
                    admin_id: Some(admin_id),
                    action: AdminAction::FraudAlert,
                    target_user_id: Some(user_id),
                    details: format!("Automated detection flagged: {}", triggered.join(", ")),
                })
                .await;
        }

        tracing::info!(%user_id, count = triggered.len(), "Fraud detection completed");

        Ok(FraudReport {
            count: triggered.len(),
            flags: triggered,
        })
    }

    /// Fetch the counts one pattern needs and compare them to the thresholds.
    async fn evaluate(
        &self,
        pattern: FraudPattern,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, FraudError> {
        match pattern {
            FraudPattern::MultipleRejectedDocs => {
                let rejected = self
                    .signals
                    .count_documents(user_id, DocumentStatus::Rejected)
                    .await?;
                Ok(self.thresholds.multiple_rejected_docs(rejected))
            }
            FraudPattern::RapidEscalation => {
                let since = now - Duration::days(self.thresholds.escalation_window_days);
                let recent = self
                    .signals
                    .count_investments_since(user_id, since)
                    .await?;
                Ok(self.thresholds.rapid_escalation(recent))
            }
            FraudPattern::UnverifiedClaims => {
                let role = self.signals.user_role(user_id).await?;
                if role != Some(UserRole::Investor) {
                    return Ok(false);
                }
                let approved = self
                    .signals
                    .count_documents(user_id, DocumentStatus::Approved)
                    .await?;
                Ok(self.thresholds.unverified_claims(role, approved))
            }
        }
    }

    /// Raise a flag by hand.
    pub async fn raise_manual_flag(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        severity: Severity,
        description: &str,
    ) -> Result<FraudFlag, FraudError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(FraudError::InvalidInput(
                "Description is required".to_string(),
            ));
        }

        if !self.signals.user_exists(user_id).await? {
            return Err(FraudError::UserNotFound);
        }

        let flag = self
            .flags
            .insert_flag(NewFraudFlag {
                user_id,
                category: FlagCategory::ManualReview,
                severity,
                description: description.to_string(),
                automated: false,
            })
            .await?;

        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::FraudAlert,
                target_user_id: Some(user_id),
                details: format!("Manual {} flag: {}", severity, description),
            })
            .await;

        Ok(flag)
    }

    /// Resolve a flag. Resolving twice returns the flag unchanged.
    pub async fn resolve_flag(&self, admin_id: Uuid, flag_id: Uuid) -> Result<FraudFlag, FraudError> {
        let existing = self
            .flags
            .get_flag(flag_id)
            .await?
            .ok_or(FraudError::FlagNotFound)?;

        if existing.resolved {
            return Ok(existing);
        }

        let resolved = self
            .flags
            .resolve_flag(flag_id, Utc::now())
            .await?
            .ok_or(FraudError::FlagNotFound)?;

        self.audit
            .record(NewAdminLogEntry {
                admin_id: Some(admin_id),
                action: AdminAction::FraudFlagResolved,
                target_user_id: Some(resolved.user_id),
                details: format!("Resolved {} flag", resolved.category),
            })
            .await;

        Ok(resolved)
    }

    pub async fn unresolved_flags(&self) -> Result<Vec<FraudFlag>, FraudError> {
        self.flags.unresolved_flags().await
    }
}

// ============================================================================
// TESTS
// ============================================================================
