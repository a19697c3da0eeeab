//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use gateway_sim::SANDBOX_REDIRECT_BASE;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub request_timeout: Duration,
    pub gateway_redirect_base: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT").unwrap_or_else(|| "8082".to_string()).parse()?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = var("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let ttl_minutes: i64 = var("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|| "60".to_string())
            .parse()?;
        if ttl_minutes <= 0 {
            anyhow::bail!("TOKEN_TTL_MINUTES must be positive");
        }

        let timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()?;

        let gateway_redirect_base =
            var("GATEWAY_REDIRECT_BASE").unwrap_or_else(|| SANDBOX_REDIRECT_BASE.to_string());

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            token_ttl: chrono::Duration::minutes(ttl_minutes),
            request_timeout: Duration::from_secs(timeout_secs),
            gateway_redirect_base,
        })
    }
}
