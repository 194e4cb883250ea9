//! RustStack Provision - create SNS topics and SQS queues from a YAML file.
//!
//! Reads a provisioning config, validates it, then creates every topic,
//! queue, dead-letter queue and subscription it declares, one call at a time.
//!
//! # Usage
//!
//! ```text
//! ruststack-provision --config provision.yaml
//! ruststack-provision --config provision.yaml --endpoint-url http://localhost:4566
//! ```
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PROVISION_CONFIG` | *(required)* | Config file path (same as `--config`) |
//! | `PROVISION_TIMEOUT_SECS` | `600` | Deadline for the whole run |
//! | `AWS_ENDPOINT_URL` | *(unset)* | Custom AWS endpoint, e.g. a local RustStack |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | `0` | Every resource was provisioned |
//! | `1` | Usage error, unreadable config, or a cloud call failed |
//! | `2` | The configuration is invalid; the cloud was not touched |

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ruststack_provision_aws::AwsProvider;
use ruststack_provision_core::{Config, LoadError, ProvisionError, Provisioner};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for any failure other than an invalid configuration.
const EXIT_FAILURE: u8 = 1;

/// Exit code for an invalid configuration.
const EXIT_INVALID_CONFIG: u8 = 2;

/// Provision SNS topics, SQS queues, DLQs and subscriptions.
#[derive(Debug, Parser)]
#[command(name = "ruststack-provision", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "PROVISION_CONFIG")]
    config: PathBuf,

    /// Cancel the run after this many seconds
    #[arg(long, env = "PROVISION_TIMEOUT_SECS", default_value_t = 600)]
    timeout_secs: u64,

    /// Custom AWS endpoint, e.g. http://localhost:4566
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `LOG_LEVEL`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Read the log level from the environment.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Cancel `token` when the deadline passes or an interrupt arrives.
fn spawn_watchdog(token: CancellationToken, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(timeout) => {
                warn!(timeout_secs = timeout.as_secs(), "deadline exceeded, cancelling run");
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("received interrupt, cancelling run");
            }
        }
        token.cancel();
    })
}

fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::Invalid(_) => EXIT_INVALID_CONFIG,
        LoadError::Read { .. } | LoadError::Parse(_) => EXIT_FAILURE,
    }
}

fn run_exit_code(err: &ProvisionError) -> u8 {
    match err {
        ProvisionError::InvalidConfiguration(_) => EXIT_INVALID_CONFIG,
        ProvisionError::ProvisioningFailure { .. } => EXIT_FAILURE,
    }
}

async fn run(cli: Cli) -> u8 {
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err @ LoadError::Invalid(_)) => {
            eprintln!("Error: {err}");
            return load_exit_code(&err);
        }
        Err(err) => {
            let code = load_exit_code(&err);
            eprintln!("Failed to parse config: {:#}", anyhow::Error::from(err));
            return code;
        }
    };

    let provider = match AwsProvider::connect(&config, cli.endpoint_url.as_deref()).await {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("Failed to initialize AWS provider: {err}");
            return EXIT_FAILURE;
        }
    };

    let token = CancellationToken::new();
    let watchdog = spawn_watchdog(token.clone(), Duration::from_secs(cli.timeout_secs));

    let mut provisioner = Provisioner::new(provider, config).with_cancellation(token);
    let result = provisioner.run().await;
    watchdog.abort();

    match result {
        Ok(()) => {
            info!("configuration completed successfully");
            0
        }
        Err(err @ ProvisionError::InvalidConfiguration(_)) => {
            eprintln!("Error: {err}");
            run_exit_code(&err)
        }
        Err(err) => {
            let code = run_exit_code(&err);
            eprintln!("Configuration failed: {:#}", anyhow::Error::from(err));
            code
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_FAILURE } else { 0 };
            err.print().ok();
            return ExitCode::from(code);
        }
    };

    if let Err(err) = init_tracing(&log_level()) {
        eprintln!("Error: {err:#}");
        return ExitCode::from(EXIT_FAILURE);
    }

    ExitCode::from(run(cli).await)
}
