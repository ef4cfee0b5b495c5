use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::proxy::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub request_timeout: Duration,
    pub history_dir: PathBuf,
    pub persist_auth_tokens: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: env::var("APP_ENV")
                .ok()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "development".to_string()),
            request_timeout: Duration::from_millis(
                env::var("REQUEST_TIMEOUT_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            ),
            history_dir: env::var("HISTORY_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or_else(default_history_dir),
            persist_auth_tokens: env::var("HISTORY_PERSIST_TOKENS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Internal diagnostics are only exposed to callers in development.
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: "development".to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            history_dir: default_history_dir(),
            persist_auth_tokens: false,
        }
    }
}

fn default_history_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("api-composer")
}
