//! Error taxonomy for probes and configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure captured from a single probe call.
///
/// A reachable target that answers with the wrong response is kept distinct
/// from one that never answered at all; the report preserves the difference.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeError {
    /// Target unreachable (refused, reset, DNS failure).
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// No response within the configured timeout.
    #[error("no response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A response arrived but did not satisfy the success predicate.
    #[error("unexpected response: HTTP {status}")]
    UnexpectedResponse { status: u16 },
}

impl ProbeError {
    /// Short machine-readable kind label, used in log fields and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Connection { .. } => "connection",
            ProbeError::Timeout { .. } => "timeout",
            ProbeError::UnexpectedResponse { .. } => "unexpected_response",
        }
    }
}

/// Errors raised while validating a [`crate::VerifyConfig`].
///
/// This is the only error class that aborts a run; it is produced at
/// construction time, before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("retry count must be at least 1")]
    ZeroAttempts,

    #[error("per-probe timeout must be greater than zero")]
    ZeroTimeout,

    #[error("overall deadline must be greater than zero")]
    ZeroDeadline,

    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Result type for configuration-level operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
