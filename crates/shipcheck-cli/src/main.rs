//! shipcheck - post-deploy verification CLI
//!
//! Probes a freshly deployed service: waits for its readiness endpoint with a
//! bounded retry budget, then verifies a fixed list of endpoints and reports
//! SUCCESS / UNSTABLE / FAILURE through the exit code.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::Level;

use shipcheck_core::{init_tracing, RunReport, RunStatus, Verifier, VerifyConfig};

#[derive(Parser)]
#[command(name = "shipcheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Readiness gating and endpoint verification for deployed services", long_about = None)]
struct Cli {
    /// Base URL of the service to verify
    #[arg(long, env = "SHIPCHECK_BASE_URL")]
    base_url: String,

    /// Readiness probe path, retried until it passes
    #[arg(long, default_value = "/health", env = "SHIPCHECK_READINESS_PATH")]
    readiness_path: String,

    /// Endpoint path to verify after readiness (repeatable, checked in order)
    #[arg(long = "endpoint")]
    endpoints: Vec<String>,

    /// Maximum readiness attempts
    #[arg(long, default_value = "5")]
    retries: u32,

    /// Seconds between readiness attempts
    #[arg(long, default_value = "10")]
    retry_delay_secs: u64,

    /// Per-probe timeout in seconds
    #[arg(long, default_value = "5")]
    timeout_secs: u64,

    /// Overall deadline for the whole run, in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Exit code for an UNSTABLE run (FAILURE always exits 1)
    #[arg(long, default_value = "0", env = "SHIPCHECK_UNSTABLE_EXIT")]
    unstable_exit_code: u8,

    /// Print the run report as JSON instead of the console summary
    #[arg(long)]
    report_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn to_config(&self) -> VerifyConfig {
        VerifyConfig {
            base_url: self.base_url.clone(),
            readiness_path: self.readiness_path.clone(),
            endpoint_paths: self.endpoints.clone(),
            max_attempts: self.retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            probe_timeout: Duration::from_secs(self.timeout_secs),
            deadline: self.deadline_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = cli.to_config();
    let verifier = Verifier::new(config).context("Invalid verification configuration")?;
    let report = verifier.execute().await;

    if cli.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(verifier.config(), &report);
    }

    let code = exit_code_for(report.status, cli.unstable_exit_code);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn exit_code_for(status: RunStatus, unstable_exit_code: u8) -> i32 {
    match status {
        RunStatus::Success => 0,
        RunStatus::Unstable => unstable_exit_code as i32,
        RunStatus::Failure => 1,
    }
}

fn print_report(config: &VerifyConfig, report: &RunReport) {
    println!("Verifying deployment at: {}", report.base_url);
    println!(
        "Readiness probe: {} (max {} attempts, {}s delay)",
        config.readiness_path,
        config.max_attempts,
        config.retry_delay.as_secs()
    );
    println!();

    println!("Run ID: {}", report.run_id);
    let status = match report.status {
        RunStatus::Success => "✓ SUCCESS",
        RunStatus::Unstable => "! UNSTABLE",
        RunStatus::Failure => "✗ FAILURE",
    };
    println!("Status: {}", status);
    println!("Duration: {}ms", report.duration_ms);
    println!();

    if let Some(readiness) = &report.readiness {
        let mark = if readiness.passed() { "✓" } else { "✗" };
        println!(
            "  {} readiness {} ({} attempts)",
            mark, readiness.probe.name, readiness.attempts
        );
    }

    if let Some(suite) = &report.endpoints {
        for endpoint in &suite.endpoints {
            if endpoint.passed() {
                println!(
                    "  ✓ {} ({}ms)",
                    endpoint.probe.name, endpoint.attempt.duration_ms
                );
            } else {
                let detail = endpoint
                    .attempt
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                println!(
                    "  ✗ {} ({}ms, {})",
                    endpoint.probe.name, endpoint.attempt.duration_ms, detail
                );
            }
        }

        println!();
        println!(
            "Summary: {}/{} endpoints passed",
            suite.passed_count(),
            suite.endpoints.len()
        );
    }

    let failures = report.failure_lines();
    if !failures.is_empty() {
        println!("Failures:");
        for line in &failures {
            println!("  - {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code_for(RunStatus::Success, 0), 0);
        assert_eq!(exit_code_for(RunStatus::Failure, 0), 1);
        assert_eq!(exit_code_for(RunStatus::Unstable, 0), 0);
        assert_eq!(exit_code_for(RunStatus::Unstable, 3), 3);
        assert_eq!(
            exit_code_for(RunStatus::Failure, 3),
            1,
            "Unstable code never applies to failures"
        );
    }

    #[test]
    fn test_cli_builds_config_with_defaults() {
        let cli = Cli::try_parse_from([
            "shipcheck",
            "--base-url",
            "http://localhost:8080",
            "--endpoint",
            "/",
            "--endpoint",
            "/hello",
        ])
        .expect("parse");

        let config = cli.to_config();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.readiness_path, "/health");
        assert_eq!(config.endpoint_paths, vec!["/", "/hello"]);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(10));
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert!(config.deadline.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "shipcheck",
            "--base-url",
            "http://staging:9090",
            "--readiness-path",
            "/ready",
            "--retries",
            "10",
            "--retry-delay-secs",
            "2",
            "--timeout-secs",
            "3",
            "--deadline-secs",
            "120",
            "--unstable-exit-code",
            "2",
        ])
        .expect("parse");

        let config = cli.to_config();
        assert_eq!(config.readiness_path, "/ready");
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.deadline, Some(Duration::from_secs(120)));
        assert_eq!(cli.unstable_exit_code, 2);
    }
}
