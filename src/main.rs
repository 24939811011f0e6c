// This is the entry point of the marketplace trust & safety service.
//
// **Architecture Overview:**
// - `core/` = Business logic (chat moderation, fraud detection, audit, access)
// - `infra/` = Implementations of core traits (SQLite stores)
// - `http/` = axum adapters (routes, extractors, error mapping)
//
// This file's job is to:
// 1. Load configuration
// 2. Open and migrate the database
// 3. Initialize services (dependency injection)
// 4. Serve HTTP until Ctrl+C

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "http/http_layer.rs"]
mod http;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::AppConfig;
use crate::http::{build_router, AppState};
use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    let pool = infra::database::connect(&config.database_url).await?;
    infra::database::migrate(&pool).await?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Every service gets its stores from the same pool.
    let state = AppState::new(pool, config.audit_log_limit);

    let app = build_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Marketplace guard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
