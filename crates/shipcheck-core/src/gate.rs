//! Bounded retry around the readiness probe.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ProbeError;
use crate::probe::{Attempt, Probe, ProbeClient};

/// Terminal status of a retry gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStatus {
    /// The probe succeeded within the attempt budget.
    Passed,

    /// Every attempt failed.
    Exhausted,
}

/// Outcome of a retry gate run for one probe.
///
/// Immutable once produced. `attempts` never exceeds the configured maximum,
/// and the history holds exactly one entry per attempt made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryResult {
    /// The gated probe.
    pub probe: Probe,

    /// Final status.
    pub status: RetryStatus,

    /// Number of attempts used.
    pub attempts: u32,

    /// Per-attempt record, in execution order.
    pub history: Vec<Attempt>,

    /// Error from the last failed attempt, `None` if the gate passed.
    pub last_error: Option<ProbeError>,
}

impl RetryResult {
    /// Whether the gate passed within its budget.
    pub fn passed(&self) -> bool {
        self.status == RetryStatus::Passed
    }
}

/// Wraps a probe with a bounded fixed-delay retry policy.
///
/// Exhaustion is a reported terminal status, not an error; the caller
/// decides whether to treat it as fatal.
pub struct RetryGate;

impl RetryGate {
    /// Probe until success or until `max_attempts` calls have been made,
    /// sleeping `delay` between failed attempts.
    ///
    /// Stops at the first success; no delay follows the final attempt.
    pub async fn run(
        client: &dyn ProbeClient,
        probe: &Probe,
        max_attempts: u32,
        delay: Duration,
    ) -> RetryResult {
        let mut history = Vec::new();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let record = Attempt::capture(client, probe).await;
            let passed = record.passed();
            last_error = record.error.clone();
            history.push(record);

            if passed {
                info!(
                    probe = %probe.name,
                    attempt,
                    "Readiness probe passed"
                );
                return RetryResult {
                    probe: probe.clone(),
                    status: RetryStatus::Passed,
                    attempts: attempt,
                    history,
                    last_error: None,
                };
            }

            warn!(
                probe = %probe.name,
                attempt,
                max_attempts,
                error = %last_error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
                "Readiness probe failed"
            );

            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        RetryResult {
            probe: probe.clone(),
            status: RetryStatus::Exhausted,
            attempts: max_attempts,
            history,
            last_error,
        }
    }
}
