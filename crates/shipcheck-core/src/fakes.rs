//! Scripted probe client for tests.
//!
//! Satisfies the [`ProbeClient`] contract without any network dependency.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::probe::{Probe, ProbeClient};

/// Probe client that replays a canned outcome sequence.
///
/// Outcomes are consumed in call order; once the script is exhausted the
/// fallback outcome repeats. A call counter supports asserting attempt
/// budgets.
pub struct ScriptedProbeClient {
    script: Mutex<VecDeque<Result<(), ProbeError>>>,
    fallback: Result<(), ProbeError>,
    stall: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedProbeClient {
    /// Replay `outcomes` in order, then succeed on further calls.
    pub fn new(outcomes: Vec<Result<(), ProbeError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback: Ok(()),
            stall: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeed on every call.
    pub fn passing() -> Self {
        Self::new(Vec::new())
    }

    /// Fail every call with the given error.
    pub fn failing(error: ProbeError) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(error),
            stall: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before answering each call (then succeed).
    ///
    /// Used to exercise run-deadline expiry.
    pub fn stalled(delay: Duration) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(()),
            stall: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `check` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeClient for ScriptedProbeClient {
    async fn check(&self, _probe: &Probe) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.stall {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
