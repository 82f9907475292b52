//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling
//! `dotenvy::dotenv()`.

use crate::auth::token::TokenConfig;

/// Default listen address for the HTTP server
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Token signing secret and lifetime
    pub token: TokenConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            token: TokenConfig::from_env(),
        }
    }

    /// Whether a signing secret was configured
    pub fn has_secret_key(&self) -> bool {
        self.token.secret.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
