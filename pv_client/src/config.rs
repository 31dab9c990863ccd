//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::path::PathBuf;

/// Server endpoint used when neither the CLI nor the environment names one.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:1112/connect";

/// Page shown right after connecting.
pub const DEFAULT_START_PAGE: &str = "login";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the poker server
    pub server_url: String,
    /// Name offered when logging in without one
    pub username: String,
    /// File backing the session store, in memory when unset
    pub store_path: Option<PathBuf>,
    /// Navigation target of the first page
    pub start_page: String,
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub store_path: Option<PathBuf>,
    pub start_page: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let server_url = overrides
            .server_url
            .or_else(|| std::env::var("POKER_SERVER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let username = overrides
            .username
            .or_else(|| std::env::var("POKER_USERNAME").ok())
            .unwrap_or_else(whoami::username);

        let store_path = overrides
            .store_path
            .or_else(|| std::env::var("POKER_STORE_PATH").ok().map(PathBuf::from));

        let start_page = overrides
            .start_page
            .unwrap_or_else(|| parse_env_or("POKER_START_PAGE", DEFAULT_START_PAGE.to_string()));

        let config = ClientConfig {
            server_url,
            username,
            store_path,
            start_page,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid {
                var: "POKER_SERVER_URL".to_string(),
                reason: format!("Must start with ws:// or wss:// (got '{}')", self.server_url),
            });
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "POKER_USERNAME".to_string(),
                hint: "Pass --username NAME or set POKER_USERNAME".to_string(),
            });
        }

        if self.start_page.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "POKER_START_PAGE".to_string(),
                reason: "Must name a page".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
