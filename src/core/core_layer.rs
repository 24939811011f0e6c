// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "access/access_gate.rs"]
pub mod access;

#[path = "audit/audit_service.rs"]
pub mod audit;

#[path = "fraud/mod.rs"]
pub mod fraud;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "verification/verification_service.rs"]
pub mod verification;
