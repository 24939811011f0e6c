// Runtime configuration, read once at startup.

use anyhow::Context;
use std::net::SocketAddr;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/marketplace.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_AUDIT_LOG_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Default page size of the admin log listing.
    pub audit_log_limit: usize,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    ///
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 127.0.0.1:3000")?;

        let audit_log_limit = match lookup("AUDIT_LOG_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .context("AUDIT_LOG_LIMIT must be a positive integer")?,
            None => DEFAULT_AUDIT_LOG_LIMIT,
        };
        if audit_log_limit == 0 {
            anyhow::bail!("AUDIT_LOG_LIMIT must be a positive integer");
        }

        Ok(Self {
            database_url,
            bind_addr,
            audit_log_limit,
        })
    }
}
