// HTTP layer - axum routes and the state they share.
//
// Handlers stay thin: extract, call one core service method, map the error.

#[path = "auth.rs"]
pub mod auth;

#[path = "error.rs"]
pub mod error;

#[path = "routes/admin_routes.rs"]
pub mod admin_routes;

#[path = "routes/chat_routes.rs"]
pub mod chat_routes;

#[path = "routes/fraud_routes.rs"]
pub mod fraud_routes;

#[path = "routes/verification_routes.rs"]
pub mod verification_routes;

use crate::core::access::AccessGate;
use crate::core::audit::AuditService;
use crate::core::fraud::FraudService;
use crate::core::moderation::ChatService;
use crate::core::verification::VerificationService;
use crate::infra::access::SqliteProfileStore;
use crate::infra::audit::SqliteAuditStore;
use crate::infra::fraud::SqliteFraudStore;
use crate::infra::moderation::SqliteConversationStore;
use crate::infra::verification::SqliteVerificationStore;
use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

pub type Chat = ChatService<SqliteConversationStore, SqliteFraudStore, SqliteAuditStore>;
pub type Fraud = FraudService<SqliteFraudStore, SqliteFraudStore, SqliteAuditStore>;
pub type Verification = VerificationService<SqliteVerificationStore, SqliteAuditStore>;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<Chat>,
    pub fraud: Arc<Fraud>,
    pub verification: Arc<Verification>,
    pub audit: Arc<AuditService<SqliteAuditStore>>,
    pub access: Arc<AccessGate<SqliteProfileStore>>,
}

impl AppState {
    /// Wire every service onto one pool.
    pub fn new(pool: Pool<Sqlite>, audit_log_limit: usize) -> Self {
        let audit = Arc::new(AuditService::new(
            SqliteAuditStore::new(pool.clone()),
            audit_log_limit,
        ));
        let fraud_store = SqliteFraudStore::new(pool.clone());

        let chat = Arc::new(ChatService::new(
            SqliteConversationStore::new(pool.clone()),
            fraud_store.clone(),
            Arc::clone(&audit),
        ));
        let fraud = Arc::new(FraudService::new(
            fraud_store.clone(),
            fraud_store,
            Arc::clone(&audit),
        ));
        let verification = Arc::new(VerificationService::new(
            SqliteVerificationStore::new(pool.clone()),
            Arc::clone(&audit),
        ));
        let access = Arc::new(AccessGate::new(SqliteProfileStore::new(pool)));

        Self {
            chat,
            fraud,
            verification,
            audit,
            access,
        }
    }
}

/// Build the full router. Admin, fraud and verification routes sit behind
/// `require_admin`.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(admin_routes::router())
        .merge(fraud_routes::router())
        .merge(verification_routes::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/api/health", get(health))
        .merge(chat_routes::router())
        .merge(admin)
        .with_state(state)
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
