//! Engine error types.

use crate::condition::ConditionError;
use crate::config::ConfigError;

/// Errors from engine operations.
///
/// Transport and protocol variants carry the endpoint that failed so the
/// gateway's fallback log lines say where the remote call went wrong.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The rule service returned a non-2xx status.
    #[error("rule service {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// No remote engine is configured for an operation that requires one.
    #[error("no remote rule engine configured")]
    NotConfigured,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local evaluation could not start at all.
    #[error("evaluation error: {0}")]
    Evaluation(#[from] ConditionError),

    /// Rule catalog CRUD failure, surfaced unchanged.
    #[error(transparent)]
    Catalog(#[from] sca_catalog::CatalogError),
}
