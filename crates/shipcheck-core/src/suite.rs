//! Single-pass verification of the configured endpoint list.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::probe::{Attempt, Probe, ProbeClient};

/// Outcome of one endpoint probe within a suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointResult {
    /// The probed endpoint.
    pub probe: Probe,

    /// The single attempt made against it.
    pub attempt: Attempt,
}

impl EndpointResult {
    /// Whether the endpoint check passed.
    pub fn passed(&self) -> bool {
        self.attempt.passed()
    }
}

/// Ordered per-endpoint outcomes; one entry per configured probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteResult {
    /// Results in probe declaration order.
    pub endpoints: Vec<EndpointResult>,
}

impl SuiteResult {
    /// Number of endpoints that passed.
    pub fn passed_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.passed()).count()
    }

    /// Number of endpoints that failed.
    pub fn failed_count(&self) -> usize {
        self.endpoints.iter().filter(|e| !e.passed()).count()
    }

    /// Whether every endpoint passed.
    pub fn all_passed(&self) -> bool {
        self.endpoints.iter().all(|e| e.passed())
    }

    /// The failed endpoints, in declaration order.
    pub fn failures(&self) -> impl Iterator<Item = &EndpointResult> {
        self.endpoints.iter().filter(|e| !e.passed())
    }
}

/// Runs every configured endpoint probe exactly once, in declaration order.
///
/// No short-circuit: an early failure never skips the remaining probes.
/// Each probe gets a single attempt; retry belongs to the readiness gate.
pub struct EndpointSuite;

impl EndpointSuite {
    /// Probe each endpoint once and collect the ordered results.
    pub async fn run_all(client: &dyn ProbeClient, probes: &[Probe]) -> SuiteResult {
        let mut endpoints = Vec::with_capacity(probes.len());

        for probe in probes {
            let attempt = Attempt::capture(client, probe).await;

            if attempt.passed() {
                info!(endpoint = %probe.name, duration_ms = attempt.duration_ms, "Endpoint check passed");
            } else {
                warn!(
                    endpoint = %probe.name,
                    error = %attempt.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
                    "Endpoint check failed"
                );
            }

            endpoints.push(EndpointResult {
                probe: probe.clone(),
                attempt,
            });
        }

        SuiteResult { endpoints }
    }
}
