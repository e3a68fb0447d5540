//! shipcheck - post-deploy verification
//!
//! Answers one question after a deployment: is the service actually up?
//!
//! - Gates on a retried readiness probe (bounded attempts, fixed delay)
//! - Then sweeps a fixed endpoint list without short-circuiting on failure
//! - Reports SUCCESS / UNSTABLE / FAILURE with per-probe error detail

pub mod config;
pub mod error;
pub mod fakes;
pub mod gate;
pub mod orchestrator;
pub mod probe;
pub mod suite;
pub mod telemetry;

// Re-export key types
pub use config::VerifyConfig;
pub use error::{ConfigError, ProbeError};
pub use gate::{RetryGate, RetryResult, RetryStatus};
pub use orchestrator::{RunReport, RunStatus, Verifier};
pub use probe::{Attempt, HttpProbeClient, Probe, ProbeClient, ResponsePredicate};
pub use suite::{EndpointResult, EndpointSuite, SuiteResult};
pub use telemetry::init_tracing;
