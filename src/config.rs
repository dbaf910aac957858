//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Bind address for the HTTP listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base path every route is mounted under (e.g. "/api").
    #[serde(default = "default_context_path")]
    pub context_path: String,

    /// Port for the Prometheus exporter; disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Largest request body the transport will read.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    // === Error Messages ===
    /// Category label for 404 envelopes.
    #[serde(default)]
    pub error_message_404: Option<String>,

    /// Category label for 405 envelopes.
    #[serde(default)]
    pub error_message_405: Option<String>,

    /// Category label for 500 envelopes.
    #[serde(default)]
    pub error_message_500: Option<String>,

    /// Label for any other status code.
    #[serde(default)]
    pub error_message_default: Option<String>,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_context_path() -> String {
    "/api".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            context_path: default_context_path(),
            metrics_port: None,
            max_body_bytes: default_max_body_bytes(),
            error_message_404: None,
            error_message_405: None,
            error_message_500: None,
            error_message_default: None,
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        if !self.context_path.is_empty() {
            if !self.context_path.starts_with('/') {
                return Err(AppError::InvalidConfig(
                    "CONTEXT_PATH must start with '/'".to_string(),
                ));
            }
            if self.context_path.ends_with('/') {
                return Err(AppError::InvalidConfig(
                    "CONTEXT_PATH must not end with '/'".to_string(),
                ));
            }
        }

        if self.max_body_bytes == 0 {
            return Err(AppError::InvalidConfig(
                "MAX_BODY_BYTES must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Category labels for error envelopes, with overrides applied.
    pub fn error_messages(&self) -> ErrorMessages {
        let defaults = ErrorMessages::default();
        ErrorMessages {
            not_found: self.error_message_404.clone().unwrap_or(defaults.not_found),
            method_not_allowed: self
                .error_message_405
                .clone()
                .unwrap_or(defaults.method_not_allowed),
            internal: self.error_message_500.clone().unwrap_or(defaults.internal),
            fallback: self.error_message_default.clone().unwrap_or(defaults.fallback),
        }
    }
}

/// Category label per HTTP status code used in error envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessages {
    /// Label for 404.
    pub not_found: String,
    /// Label for 405.
    pub method_not_allowed: String,
    /// Label for 500.
    pub internal: String,
    /// Label for anything else.
    pub fallback: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            not_found: "resource not found".to_string(),
            method_not_allowed: "method not allowed".to_string(),
            internal: "internal server error".to_string(),
            fallback: "an error occurred".to_string(),
        }
    }
}

impl ErrorMessages {
    /// Label for the given status code.
    pub fn message_for(&self, status: u16) -> &str {
        match status {
            404 => &self.not_found,
            405 => &self.method_not_allowed,
            500 => &self.internal,
            _ => &self.fallback,
        }
    }
}
