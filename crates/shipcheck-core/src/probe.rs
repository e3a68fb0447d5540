//! Probe targets and the single-shot probe client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::ProbeError;

/// A single configured check against one network-reachable target.
///
/// Immutable value: the name is the declared path (used in reports and logs),
/// the url is the fully resolved target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    /// Declared path, e.g. `/health`.
    pub name: String,

    /// Fully resolved target URL.
    pub url: String,
}

impl Probe {
    /// Create a probe with an explicit name and target URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Resolve a probe from a base address and a path.
    ///
    /// Normalizes the join so `http://host:8080/` + `hello` and
    /// `http://host:8080` + `/hello` produce the same target.
    pub fn from_path(base_url: &str, path: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let name = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let url = format!("{}{}", base, name);
        Self { name, url }
    }
}

/// One execution of a probe: outcome, timestamp, and latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// When the call was issued (UTC).
    pub started_at: DateTime<Utc>,

    /// Wall-clock latency of the call in milliseconds.
    pub duration_ms: u64,

    /// Captured failure, `None` on success.
    pub error: Option<ProbeError>,
}

impl Attempt {
    /// Issue one probe call and capture its outcome with timing.
    pub async fn capture(client: &dyn ProbeClient, probe: &Probe) -> Self {
        let started_at = Utc::now();
        let start = Instant::now();
        let error = client.check(probe).await.err();
        Self {
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
        }
    }

    /// Whether this attempt succeeded.
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Issues a single readiness/liveness check against a probe target.
///
/// Implementations never retry; bounded retry lives in [`crate::RetryGate`].
#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// Perform one call against the probe target.
    async fn check(&self, probe: &Probe) -> Result<(), ProbeError>;
}

/// Predicate deciding whether a received response counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePredicate {
    /// Any 2xx status.
    AnySuccess,

    /// Exactly one status code.
    Status(u16),
}

impl Default for ResponsePredicate {
    fn default() -> Self {
        ResponsePredicate::AnySuccess
    }
}

impl ResponsePredicate {
    fn accepts(&self, status: reqwest::StatusCode) -> bool {
        match self {
            ResponsePredicate::AnySuccess => status.is_success(),
            ResponsePredicate::Status(code) => status.as_u16() == *code,
        }
    }
}

/// HTTP GET probe client with a fixed per-call timeout.
pub struct HttpProbeClient {
    client: reqwest::Client,
    timeout: Duration,
    predicate: ResponsePredicate,
}

impl HttpProbeClient {
    /// Create a client that treats any 2xx response as success.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shipcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout,
            predicate: ResponsePredicate::default(),
        }
    }

    /// Replace the success predicate.
    pub fn with_predicate(mut self, predicate: ResponsePredicate) -> Self {
        self.predicate = predicate;
        self
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn check(&self, probe: &Probe) -> Result<(), ProbeError> {
        debug!(probe = %probe.name, url = %probe.url, "Issuing probe");

        let response = self
            .client
            .get(&probe.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    ProbeError::Connection {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if self.predicate.accepts(status) {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedResponse {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_from_path_normalizes_join() {
        let a = Probe::from_path("http://localhost:8080", "/hello");
        let b = Probe::from_path("http://localhost:8080/", "hello");
        assert_eq!(a, b);
        assert_eq!(a.name, "/hello");
        assert_eq!(a.url, "http://localhost:8080/hello");
    }

    #[test]
    fn test_predicate_any_success() {
        let p = ResponsePredicate::AnySuccess;
        assert!(p.accepts(reqwest::StatusCode::OK));
        assert!(p.accepts(reqwest::StatusCode::NO_CONTENT));
        assert!(!p.accepts(reqwest::StatusCode::NOT_FOUND));
        assert!(!p.accepts(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_predicate_exact_status() {
        let p = ResponsePredicate::Status(204);
        assert!(p.accepts(reqwest::StatusCode::NO_CONTENT));
        assert!(!p.accepts(reqwest::StatusCode::OK));
    }

    #[tokio::test]
    async fn test_attempt_capture_records_failure() {
        use crate::fakes::ScriptedProbeClient;

        let client = ScriptedProbeClient::failing(ProbeError::UnexpectedResponse { status: 500 });
        let probe = Probe::new("/health", "http://localhost:1/health");

        let attempt = Attempt::capture(&client, &probe).await;
        assert!(!attempt.passed());
        assert_eq!(
            attempt.error,
            Some(ProbeError::UnexpectedResponse { status: 500 })
        );
    }

    #[tokio::test]
    async fn test_http_client_reports_connection_error() {
        // Port 1 on localhost is never bound; connection should be refused.
        let client = HttpProbeClient::new(Duration::from_secs(2));
        let probe = Probe::new("/health", "http://127.0.0.1:1/health");

        let err = client.check(&probe).await.unwrap_err();
        assert_eq!(err.kind(), "connection");
    }
}
