// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule; they all share the
// pool opened by `database::connect`.

pub mod database;

#[path = "access/sqlite_profile_store.rs"]
pub mod access;

#[path = "audit/sqlite_audit_store.rs"]
pub mod audit;

#[path = "fraud/sqlite_fraud_store.rs"]
pub mod fraud;

#[path = "moderation/sqlite_conversation_store.rs"]
pub mod moderation;

#[path = "verification/sqlite_verification_store.rs"]
pub mod verification;
