//! Verification run configuration and identity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::probe::Probe;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for one verification run.
///
/// Validated once, before any network activity; a run never starts with an
/// invalid retry budget or timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Base address of the service under verification.
    pub base_url: String,

    /// Path of the readiness probe that gates the endpoint sweep.
    pub readiness_path: String,

    /// Ordered endpoint paths verified after readiness passes.
    pub endpoint_paths: Vec<String>,

    /// Maximum readiness attempts (>= 1).
    pub max_attempts: u32,

    /// Fixed delay between readiness attempts.
    pub retry_delay: Duration,

    /// Per-probe call timeout.
    pub probe_timeout: Duration,

    /// Optional wall-clock budget for the whole run.
    pub deadline: Option<Duration>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            readiness_path: "/health".to_string(),
            endpoint_paths: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            deadline: None,
        }
    }
}

impl VerifyConfig {
    /// Create a configuration for a base address with default budgets.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the endpoint paths verified after readiness.
    pub fn with_endpoints(mut self, paths: Vec<String>) -> Self {
        self.endpoint_paths = paths;
        self
    }

    /// Set the readiness probe path.
    pub fn with_readiness_path(mut self, path: impl Into<String>) -> Self {
        self.readiness_path = path.into();
        self
    }

    /// Check budgets and the base address.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts < 1 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if matches!(self.deadline, Some(d) if d.is_zero()) {
            return Err(ConfigError::ZeroDeadline);
        }

        let parsed =
            reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(())
    }

    /// The readiness probe that gates the run.
    pub fn readiness_probe(&self) -> Probe {
        Probe::from_path(&self.base_url, &self.readiness_path)
    }

    /// The endpoint probes, in declaration order.
    pub fn endpoint_probes(&self) -> Vec<Probe> {
        self.endpoint_paths
            .iter()
            .map(|p| Probe::from_path(&self.base_url, p))
            .collect()
    }

    /// Deterministic digest over the ordered probe list.
    ///
    /// Runs with the same readiness path and endpoint list (in the same
    /// order) share a digest, giving reports a stable identity.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.readiness_path.as_bytes());
        hasher.update(b"\0");
        for path in &self.endpoint_paths {
            hasher.update(path.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }
}
