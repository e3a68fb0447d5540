//! Run sequencing and report assembly.
//!
//! A run is two phases executed strictly in order: the retried readiness
//! gate, then the endpoint sweep. The sweep never starts if the gate
//! exhausts its budget.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::VerifyConfig;
use crate::error::{ConfigError, ProbeError};
use crate::gate::{RetryGate, RetryResult};
use crate::probe::{HttpProbeClient, ProbeClient};
use crate::suite::{EndpointSuite, SuiteResult};

/// Terminal status of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Readiness passed and every endpoint check passed.
    Success,

    /// Readiness passed but at least one endpoint check failed.
    Unstable,

    /// Readiness exhausted its budget, or the run deadline expired.
    Failure,
}

impl RunStatus {
    /// Uppercase label for console output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Unstable => "UNSTABLE",
            RunStatus::Failure => "FAILURE",
        }
    }
}

/// Final report of a verification run.
///
/// Owned by the invocation that produced it and never mutated afterwards.
/// Serializable for structured log sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id for this run.
    pub run_id: String,

    /// Digest of the configured probe list (see [`VerifyConfig::digest`]).
    pub config_digest: String,

    /// Base address that was verified.
    pub base_url: String,

    /// Overall status.
    pub status: RunStatus,

    /// Readiness gate outcome. `None` only when the run deadline expired
    /// before the gate finished.
    pub readiness: Option<RetryResult>,

    /// Endpoint sweep outcome. `None` when the gate failed or the deadline
    /// expired first.
    pub endpoints: Option<SuiteResult>,

    /// Run-level error, set when the overall deadline expired.
    pub error: Option<ProbeError>,

    /// Total run duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// One line per failure, naming the probe and the error kind.
    ///
    /// Empty for a SUCCESS run.
    pub fn failure_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(err) = &self.error {
            lines.push(format!("run: {}", err));
        }

        if let Some(readiness) = &self.readiness {
            if !readiness.passed() {
                let detail = readiness
                    .last_error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no attempts made".to_string());
                lines.push(format!(
                    "readiness {}: {} (after {} attempts)",
                    readiness.probe.name, detail, readiness.attempts
                ));
            }
        }

        if let Some(suite) = &self.endpoints {
            for failed in suite.failures() {
                let detail = failed
                    .attempt
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                lines.push(format!("endpoint {}: {}", failed.probe.name, detail));
            }
        }

        lines
    }
}

/// Sequences the readiness gate and the endpoint sweep for one target.
pub struct Verifier {
    config: VerifyConfig,
    client: Box<dyn ProbeClient>,
}

impl Verifier {
    /// Build a verifier with the default HTTP probe client.
    ///
    /// Fails fast on an invalid configuration, before any network activity.
    pub fn new(config: VerifyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = HttpProbeClient::new(config.probe_timeout);
        Ok(Self {
            config,
            client: Box::new(client),
        })
    }

    /// Build a verifier with a caller-supplied probe client.
    pub fn with_client(
        config: VerifyConfig,
        client: Box<dyn ProbeClient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// The validated configuration this verifier runs against.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Execute one verification run and return its report.
    ///
    /// Probe failures are folded into the report rather than raised; the
    /// only fallible step is configuration validation, done in the
    /// constructor.
    pub async fn execute(&self) -> RunReport {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        info!(
            run_id = %run_id,
            base_url = %self.config.base_url,
            endpoints = self.config.endpoint_paths.len(),
            "Starting verification run"
        );

        let (readiness, endpoints, status, error) = match self.config.deadline {
            Some(budget) => match tokio::time::timeout(budget, self.run_phases()).await {
                Ok((readiness, endpoints, status)) => (Some(readiness), endpoints, status, None),
                Err(_) => {
                    let timeout_ms = budget.as_millis() as u64;
                    warn!(run_id = %run_id, timeout_ms, "Verification run exceeded its deadline");
                    (
                        None,
                        None,
                        RunStatus::Failure,
                        Some(ProbeError::Timeout { timeout_ms }),
                    )
                }
            },
            None => {
                let (readiness, endpoints, status) = self.run_phases().await;
                (Some(readiness), endpoints, status, None)
            }
        };

        let report = RunReport {
            run_id,
            config_digest: self.config.digest(),
            base_url: self.config.base_url.clone(),
            status,
            readiness,
            endpoints,
            error,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            run_id = %report.run_id,
            status = report.status.as_str(),
            duration_ms = report.duration_ms,
            "Verification run finished"
        );

        report
    }

    /// Gate then sweep. Fail-fast: an exhausted gate skips the sweep.
    async fn run_phases(&self) -> (RetryResult, Option<SuiteResult>, RunStatus) {
        let readiness = RetryGate::run(
            self.client.as_ref(),
            &self.config.readiness_probe(),
            self.config.max_attempts,
            self.config.retry_delay,
        )
        .await;

        if !readiness.passed() {
            warn!(
                probe = %readiness.probe.name,
                attempts = readiness.attempts,
                "Readiness gate exhausted, skipping endpoint checks"
            );
            return (readiness, None, RunStatus::Failure);
        }

        let suite = EndpointSuite::run_all(self.client.as_ref(), &self.config.endpoint_probes()).await;

        let status = if suite.all_passed() {
            RunStatus::Success
        } else {
            RunStatus::Unstable
        };

        (readiness, Some(suite), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedProbeClient;
    use std::time::Duration;

    fn config(endpoints: &[&str]) -> VerifyConfig {
        let mut config = VerifyConfig::new("http://localhost:8080")
            .with_endpoints(endpoints.iter().map(|s| s.to_string()).collect());
        config.retry_delay = Duration::ZERO;
        config
    }

    #[tokio::test]
    async fn test_success_when_gate_and_suite_pass() {
        let client = ScriptedProbeClient::passing();
        let verifier =
            Verifier::with_client(config(&["/", "/hello"]), Box::new(client)).unwrap();

        let report = verifier.execute().await;
        assert_eq!(report.status, RunStatus::Success);
        assert!(report.readiness.unwrap().passed());
        assert_eq!(report.endpoints.unwrap().endpoints.len(), 2);
        assert!(report.error.is_none());
        assert!(report.failure_lines().is_empty());
    }

    #[tokio::test]
    async fn test_failure_skips_endpoint_suite() {
        let client =
            ScriptedProbeClient::failing(ProbeError::Connection { message: "refused".to_string() });
        let verifier =
            Verifier::with_client(config(&["/", "/hello"]), Box::new(client)).unwrap();

        let report = verifier.execute().await;
        assert_eq!(report.status, RunStatus::Failure);
        let readiness = report.readiness.as_ref().unwrap();
        assert_eq!(readiness.attempts, 5, "Default budget fully used");
        assert!(
            report.endpoints.is_none(),
            "Suite never runs after gate exhaustion"
        );
        assert!(!report.failure_lines().is_empty());
    }

    #[tokio::test]
    async fn test_unstable_when_one_endpoint_fails() {
        // Gate passes immediately, then /hello (second endpoint) fails.
        let client = ScriptedProbeClient::new(vec![
            Ok(()),
            Ok(()),
            Err(ProbeError::UnexpectedResponse { status: 500 }),
            Ok(()),
        ]);
        let verifier =
            Verifier::with_client(config(&["/", "/hello", "/health"]), Box::new(client)).unwrap();

        let report = verifier.execute().await;
        assert_eq!(report.status, RunStatus::Unstable);

        let suite = report.endpoints.as_ref().unwrap();
        assert_eq!(suite.endpoints.len(), 3);
        assert_eq!(suite.failed_count(), 1);

        let lines = report.failure_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("/hello"), "Report names the failed probe: {:?}", lines);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_any_probe() {
        let mut bad = config(&["/"]);
        bad.max_attempts = 0;
        let client = ScriptedProbeClient::passing();

        let result = Verifier::with_client(bad, Box::new(client));
        assert!(matches!(result, Err(ConfigError::ZeroAttempts)));
    }

    #[tokio::test]
    async fn test_deadline_expiry_reports_failure() {
        let client = ScriptedProbeClient::stalled(Duration::from_secs(30));
        let mut cfg = config(&["/"]);
        cfg.deadline = Some(Duration::from_millis(50));

        let verifier = Verifier::with_client(cfg, Box::new(client)).unwrap();
        let report = verifier.execute().await;

        assert_eq!(report.status, RunStatus::Failure);
        assert!(report.readiness.is_none());
        assert!(report.endpoints.is_none());
        assert!(matches!(report.error, Some(ProbeError::Timeout { .. })));
        assert!(report.failure_lines()[0].starts_with("run:"));
    }

    #[tokio::test]
    async fn test_report_serializes_to_json() {
        let client = ScriptedProbeClient::passing();
        let verifier = Verifier::with_client(config(&["/hello"]), Box::new(client)).unwrap();

        let report = verifier.execute().await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["base_url"], "http://localhost:8080");
        assert!(json["readiness"]["history"].is_array());
    }
}
