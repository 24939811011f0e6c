// Fraud domain models - flags, the automated patterns, and their thresholds.
//
// Labels are stored as lowercase/snake_case strings so the database rows stay
// readable. Parsing an unknown label fails instead of guessing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// How urgent a fraud flag is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of risk a flag records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    MultipleRejectedDocs,
    RapidEscalation,
    UnverifiedClaims,
    ChatSuspiciousWords,
    ManualReview,
}

impl FlagCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagCategory::MultipleRejectedDocs => "multiple_rejected_docs",
            FlagCategory::RapidEscalation => "rapid_escalation",
            FlagCategory::UnverifiedClaims => "unverified_claims",
            FlagCategory::ChatSuspiciousWords => "chat_suspicious_words",
            FlagCategory::ManualReview => "manual_review",
        }
    }
}

impl FromStr for FlagCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_rejected_docs" => Ok(FlagCategory::MultipleRejectedDocs),
            "rapid_escalation" => Ok(FlagCategory::RapidEscalation),
            "unverified_claims" => Ok(FlagCategory::UnverifiedClaims),
            "chat_suspicious_words" => Ok(FlagCategory::ChatSuspiciousWords),
            "manual_review" => Ok(FlagCategory::ManualReview),
            other => Err(format!("unknown flag category '{}'", other)),
        }
    }
}

impl std::fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored fraud flag.
#[derive(Debug, Clone, Serialize)]
pub struct FraudFlag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: FlagCategory,
    pub severity: Severity,
    pub description: String,
    /// `true` when raised by a detector, `false` when raised by an admin.
    pub automated: bool,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a fraud flag. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFraudFlag {
    pub user_id: Uuid,
    pub category: FlagCategory,
    pub severity: Severity,
    pub description: String,
    pub automated: bool,
}

/// Role a user declared at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
    Investor,
    Both,
}

impl UserRole {
    /// Parse a stored role. Unknown roles yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(UserRole::Buyer),
            "seller" => Some(UserRole::Seller),
            "investor" => Some(UserRole::Investor),
            "both" => Some(UserRole::Both),
            _ => None,
        }
    }
}

/// Verification state of an uploaded identity or ownership document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(format!("unknown document status '{}'", other)),
        }
    }
}

/// Limits the automated patterns compare against.
#[derive(Debug, Clone)]
pub struct FraudThresholds {
    /// Rejected documents that trigger `multiple_rejected_docs`
    pub rejected_documents: u64,
    /// Investments inside the window that trigger `rapid_escalation`
    pub investments_in_window: u64,
    /// Length of the `rapid_escalation` window in days
    pub escalation_window_days: i64,
}

impl Default for FraudThresholds {
    fn default() -> Self {
        Self {
            rejected_documents: 2,     // 2 rejected documents...
            investments_in_window: 3,  // ...or 3 investments...
            escalation_window_days: 7, // ...within 7 days
        }
    }
}

impl FraudThresholds {
    pub fn multiple_rejected_docs(&self, rejected: u64) -> bool {
        rejected >= self.rejected_documents
    }

    pub fn rapid_escalation(&self, recent_investments: u64) -> bool {
        recent_investments >= self.investments_in_window
    }

    pub fn unverified_claims(&self, role: Option<UserRole>, approved: u64) -> bool {
        role == Some(UserRole::Investor) && approved == 0
    }
}

/// The automated checks, in the order they are evaluated and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudPattern {
    MultipleRejectedDocs,
    RapidEscalation,
    UnverifiedClaims,
}

impl FraudPattern {
    pub const ALL: [FraudPattern; 3] = [
        FraudPattern::MultipleRejectedDocs,
        FraudPattern::RapidEscalation,
        FraudPattern::UnverifiedClaims,
    ];

    pub fn name(&self) -> &'static str {
        self.category().as_str()
    }

    pub fn category(&self) -> FlagCategory {
        match self {
            FraudPattern::MultipleRejectedDocs => FlagCategory::MultipleRejectedDocs,
            FraudPattern::RapidEscalation => FlagCategory::RapidEscalation,
            FraudPattern::UnverifiedClaims => FlagCategory::UnverifiedClaims,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FraudPattern::MultipleRejectedDocs => Severity::High,
            FraudPattern::RapidEscalation | FraudPattern::UnverifiedClaims => Severity::Medium,
        }
    }

    /// Flag to insert when this pattern triggers for `user_id`.
    pub fn to_flag(&self, user_id: Uuid) -> NewFraudFlag {
        NewFraudFlag {
            user_id,
            category: self.category(),
            severity: self.severity(),
            description: format!("Automated detection: {}", self.name().replace('_', " ")),
            automated: true,
        }
    }
}

/// Outcome of one fraud detection run.
#[derive(Debug, Clone, Serialize)]
pub struct FraudReport {
    /// Names of the patterns that triggered
    pub flags: Vec<String>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_docs_threshold() {
        let t = FraudThresholds::default();
        assert!(!t.multiple_rejected_docs(0));
        assert!(!t.multiple_rejected_docs(1));
        assert!(t.multiple_rejected_docs(2));
        assert!(t.multiple_rejected_docs(7));
    }

    #[test]
    fn test_rapid_escalation_threshold() {
        let t = FraudThresholds::default();
        assert!(!t.rapid_escalation(2));
        assert!(t.rapid_escalation(3));
    }

    #[test]
    fn test_unverified_claims_only_for_investors() {
        let t = FraudThresholds::default();
        assert!(t.unverified_claims(Some(UserRole::Investor), 0));
        assert!(!t.unverified_claims(Some(UserRole::Investor), 1));
        for role in [UserRole::Buyer, UserRole::Seller, UserRole::Both] {
            assert!(!t.unverified_claims(Some(role), 0));
            assert!(!t.unverified_claims(Some(role), 3));
        }
        assert!(!t.unverified_claims(None, 0));
    }

    #[test]
    fn test_pattern_flags() {
        let user = Uuid::new_v4();
        let flag = FraudPattern::MultipleRejectedDocs.to_flag(user);
        assert_eq!(flag.severity, Severity::High);
        assert_eq!(flag.description, "Automated detection: multiple rejected docs");
        assert!(flag.automated);

        assert_eq!(FraudPattern::RapidEscalation.severity(), Severity::Medium);
        assert_eq!(FraudPattern::UnverifiedClaims.severity(), Severity::Medium);
        assert_eq!(FraudPattern::UnverifiedClaims.name(), "unverified_claims");
    }

    #[test]
    fn test_labels_parse_back() {
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::Critical));
        assert!("urgent".parse::<Severity>().is_err());
        assert_eq!(
            "chat_suspicious_words".parse::<FlagCategory>(),
            Ok(FlagCategory::ChatSuspiciousWords)
        );
        assert_eq!(UserRole::parse("agent"), None);
        assert_eq!(
            "rejected".parse::<DocumentStatus>(),
            Ok(DocumentStatus::Rejected)
        );
        assert!("expired".parse::<DocumentStatus>().is_err());
    }
}
