//! Error types for the Atlan client

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, AtlanError>;

/// Atlan client errors
#[derive(Error, Debug)]
pub enum AtlanError {
    #[error("Asset not found: {guid}")]
    NotFound { guid: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Retry limit of {retries} exceeded with {pending} item(s) still pending")]
    RetryOverrun {
        retries: u32,
        pending: usize,
        #[source]
        source: Option<Box<AtlanError>>,
    },

    #[error("Blocking wait was interrupted")]
    Interrupted,

    #[error("Lineage graph unavailable: {0}")]
    GraphPrecondition(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl AtlanError {
    /// Whether this error means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, AtlanError::NotFound { .. })
    }

    /// Fatal errors are never retried by the polling loops
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AtlanError::Interrupted | AtlanError::GraphPrecondition(_)
        )
    }
}
