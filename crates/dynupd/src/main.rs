// # dynupd - dynup Daemon
//
// Thin integration layer only: reads configuration, initializes the
// runtime, wires the collaborators, and starts the scheduler. All update
// logic lives in dynup-core.
//
// ## Configuration
//
// Command-line flags and environment variables, flags taking precedence:
//
// - `-u/--username` / `DYNUP_USERNAME`: provider account username
// - `-p/--password` / `DYNUP_PASSWORD`: provider account password
// - `-n/--hosts` / `DYNUP_HOSTS`: comma-separated hostnames
// - `--interval` / `DYNUP_INTERVAL`: poll interval in seconds (default 600)
// - `--refresh-interval` / `DYNUP_REFRESH_INTERVAL`: refresh threshold in
//   seconds (default 518400, i.e. 6 days)
// - `--jitter-bound` / `DYNUP_JITTER_BOUND`: jitter bound in seconds
//   (default 3600)
// - `--state-dir` / `DYNUP_STATE_DIR`: state directory
// - `--checkip-url` / `DYNUP_CHECKIP_URL`: check-ip page URL
// - `--update-url` / `DYNUP_UPDATE_URL`: provider update endpoint
// - `--log-level` / `DYNUP_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export DYNUP_USERNAME=me@example.com
// export DYNUP_PASSWORD=hunter2
// export DYNUP_HOSTS=example.dy.fi,other.dy.fi
//
// dynupd --interval 600 --state-dir /var/lib/dynup
// ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use dynup_core::{Credentials, FileStateStore, RunConfig, Scheduler};
use dynup_ip_http::HttpIpResolver;
use dynup_provider_dyfi::DyfiUpdateClient;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DynupExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DynupExitCode> for ExitCode {
    fn from(code: DynupExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// dy.fi-style multi-host DDNS updater
#[derive(Debug, Parser)]
#[command(name = "dynupd", version, about)]
struct Cli {
    /// Provider account username
    #[arg(short = 'u', long, env = "DYNUP_USERNAME")]
    username: String,

    /// Provider account password
    #[arg(short = 'p', long, env = "DYNUP_PASSWORD", hide_env_values = true)]
    password: String,

    /// Comma-separated hostnames to keep updated
    #[arg(short = 'n', long = "hosts", env = "DYNUP_HOSTS", value_delimiter = ',')]
    hosts: Vec<String>,

    /// IP check interval in seconds
    #[arg(long, env = "DYNUP_INTERVAL", default_value_t = 600)]
    interval: u64,

    /// Maximum record age before a refresh update, in seconds
    #[arg(long, env = "DYNUP_REFRESH_INTERVAL", default_value_t = 518_400)]
    refresh_interval: u64,

    /// Bound of the random refresh perturbation, in seconds
    #[arg(long, env = "DYNUP_JITTER_BOUND", default_value_t = 3_600)]
    jitter_bound: u64,

    /// Directory for per-hostname state records
    #[arg(long, env = "DYNUP_STATE_DIR", default_value = "/var/lib/dynup")]
    state_dir: PathBuf,

    /// Check-ip page URL
    #[arg(long, env = "DYNUP_CHECKIP_URL", default_value = dynup_ip_http::DEFAULT_CHECKIP_URL)]
    checkip_url: String,

    /// Provider update endpoint URL
    #[arg(long, env = "DYNUP_UPDATE_URL", default_value = dynup_provider_dyfi::DEFAULT_UPDATE_URL)]
    update_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DYNUP_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Build the immutable run configuration from the parsed arguments
    fn run_config(&self) -> RunConfig {
        let hostnames = self
            .hosts
            .iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        let mut config = RunConfig::new(
            Credentials::new(self.username.clone(), self.password.clone()),
            hostnames,
        );
        config.poll_interval_secs = self.interval;
        config.refresh_interval_secs = self.refresh_interval;
        config.jitter_bound_secs = self.jitter_bound;
        config
    }
}

fn main() -> ExitCode {
    // Missing required flags/env vars are rejected here by clap (non-zero
    // exit); semantic validation follows
    let cli = Cli::parse();

    let config = cli.run_config();
    if let Err(e) = config.validate() {
        eprintln!("configuration error: {e}");
        return DynupExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("configuration error: invalid log level '{other}'");
            return DynupExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {e}");
        return DynupExitCode::ConfigError.into();
    }

    info!("starting dynupd for: {}", config.hostnames.join(", "));

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return DynupExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(cli, config).await {
            error!("daemon error: {e}");
            DynupExitCode::RuntimeError
        } else {
            DynupExitCode::CleanShutdown
        }
    })
    .into()
}

/// Wire the collaborators and run the scheduler until shutdown
async fn run_daemon(cli: Cli, config: RunConfig) -> Result<()> {
    let resolver = Box::new(HttpIpResolver::new(cli.checkip_url));
    let client = Box::new(DyfiUpdateClient::with_endpoint(
        config.credentials.clone(),
        cli.update_url,
    ));
    let store = Box::new(FileStateStore::new(&cli.state_dir));

    let (mut scheduler, mut events) = Scheduler::new(resolver, client, store, &config)?;

    // The log stream already carries one line per significant event; the
    // event channel is drained at debug level for anyone running with
    // verbose logging
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "scheduler event");
        }
    });

    scheduler.run().await?;
    info!("dynupd stopped");
    Ok(())
}
