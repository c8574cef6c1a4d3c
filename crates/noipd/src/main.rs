// # noipd - No-IP Update Daemon
//
// The noipd daemon is a thin integration layer around noip-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the settings source, console UI and No-IP client
// 4. Running the UpdateScheduler until SIGTERM/SIGINT
//
// Validation, update and reconfiguration logic all live in noip-core.
//
// ## Configuration
//
// ### Daemon
// - `NOIP_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `NOIP_PROVIDER_URL`: dyndns2 base URL (default https://dynupdate.no-ip.com)
// - `NOIP_CONTACT`: contact address sent in the User-Agent
// - `NOIP_HTTP_TIMEOUT_SECS`: per-request timeout, 1..=300 (default 30)
// - `NOIP_RECONFIGURE_DELAY_SECS`: pause after asking for new settings,
//   0..=3600 (default 30)
// - `NOIP_SETTINGS_FILE`: JSON settings file; environment settings otherwise
//
// When the provider rejects the settings, noipd waits for the settings file
// to change (or, for environment settings, for a restart) before sending
// them again.
//
// ### Update settings (without NOIP_SETTINGS_FILE)
// - `NOIP_HOST`, `NOIP_USERNAME`, `NOIP_PASSWORD`
// - `NOIP_INTERVAL_HOURS` (default 24)
// - `NOIP_SHOW_NOTIFICATIONS` (default false)
//
// ## Example
//
// ```bash
// export NOIP_HOST=home.ddns.net
// export NOIP_USERNAME=alice@example.com
// export NOIP_PASSWORD=...
// export NOIP_CONTACT=alice@example.com
//
// noipd
// ```

mod host;

use anyhow::{Context, Result};
use noip_core::config::DEFAULT_RECONFIGURE_DELAY_SECS;
use noip_core::traits::SettingsSource;
use noip_core::{FileSettings, SchedulerConfig, SchedulerEvent, Shutdown, UpdateScheduler};
use noip_provider::{NOIP_UPDATE_BASE, NoIpClient, user_agent};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::host::{ConsoleUi, EnvSettings, SettingsLocation};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Sent in the User-Agent when NOIP_CONTACT is unset
const DEFAULT_CONTACT: &str = "https://github.com/ddns-lab/noip-updater";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum NoipExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<NoipExitCode> for ExitCode {
    fn from(code: NoipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
#[derive(Debug)]
struct Config {
    log_level: String,
    provider_url: String,
    contact: String,
    http_timeout_secs: u64,
    reconfigure_delay_secs: u64,
    settings_file: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            log_level: lookup("NOIP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            provider_url: lookup("NOIP_PROVIDER_URL")
                .unwrap_or_else(|| NOIP_UPDATE_BASE.to_string()),
            contact: lookup("NOIP_CONTACT").unwrap_or_else(|| DEFAULT_CONTACT.to_string()),
            http_timeout_secs: parse_or(
                &lookup,
                "NOIP_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
            reconfigure_delay_secs: parse_or(
                &lookup,
                "NOIP_RECONFIGURE_DELAY_SECS",
                DEFAULT_RECONFIGURE_DELAY_SECS,
            )?,
            settings_file: lookup("NOIP_SETTINGS_FILE").filter(|p| !p.trim().is_empty()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !self.provider_url.starts_with("https://") && !self.provider_url.starts_with("http://")
        {
            anyhow::bail!(
                "NOIP_PROVIDER_URL must use HTTP or HTTPS scheme. Got: {}",
                self.provider_url
            );
        }

        if self.provider_url.starts_with("http://") {
            eprintln!(
                "WARNING: NOIP_PROVIDER_URL uses HTTP (not HTTPS). \
                Credentials would be sent in clear text."
            );
        }

        if self.contact.trim().is_empty() || self.contact.chars().any(char::is_control) {
            anyhow::bail!("NOIP_CONTACT must be a non-empty single-line value");
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "NOIP_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        if self.reconfigure_delay_secs > 3600 {
            anyhow::bail!(
                "NOIP_RECONFIGURE_DELAY_SECS must be between 0 and 3600 seconds. Got: {}",
                self.reconfigure_delay_secs
            );
        }

        if let Some(ref path) = self.settings_file
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            anyhow::bail!(
                "NOIP_SETTINGS_FILE parent directory does not exist: {}. \
                Create it first: sudo mkdir -p {}",
                parent.display(),
                parent.display()
            );
        }

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "NOIP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number. Got: {}", key, raw)),
        None => Ok(default),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return NoipExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return NoipExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NoipExitCode::ConfigError.into();
    }

    info!("Starting noipd daemon");
    info!("Provider: {}", config.provider_url);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return NoipExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            NoipExitCode::RuntimeError
        } else {
            NoipExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let client = NoIpClient::new(Duration::from_secs(config.http_timeout_secs))?
        .with_base_url(config.provider_url.clone());

    let location = match config.settings_file {
        Some(ref path) => {
            info!("Update settings file: {}", path);
            SettingsLocation::File(PathBuf::from(path))
        }
        None => {
            info!("Update settings from environment");
            SettingsLocation::Environment
        }
    };
    let settings: Box<dyn SettingsSource> = match &location {
        SettingsLocation::File(path) => Box::new(FileSettings::new(path)),
        SettingsLocation::Environment => Box::new(EnvSettings),
    };

    let scheduler_config = SchedulerConfig::new(user_agent(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.contact,
    ))
    .with_reconfigure_delay_secs(config.reconfigure_delay_secs);

    let (shutdown, waiter) = Shutdown::new();
    let (scheduler, events) = UpdateScheduler::new(
        settings,
        Box::new(ConsoleUi::new(location, shutdown.waiter())),
        Box::new(client),
        Box::new(waiter),
        scheduler_config,
    )?;

    tokio::spawn(log_events(events));

    supervise(scheduler, shutdown, wait_for_shutdown()).await?;

    info!("Daemon stopped");
    Ok(())
}

/// Run the scheduler until `signals` resolves
///
/// A signal handler that failed to install also stops the scheduler, and
/// its error is returned so the daemon exits as a runtime failure.
async fn supervise<S>(scheduler: UpdateScheduler, shutdown: Shutdown, signals: S) -> Result<()>
where
    S: Future<Output = Result<&'static str>> + Send + 'static,
{
    let signals = tokio::spawn(async move {
        let result = signals.await;
        match &result {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Signal handler error: {}", e),
        }
        shutdown.trigger();
        result
    });

    scheduler.run().await?;
    signals.await.context("Signal task failed")??;
    Ok(())
}

/// Log scheduler events until the scheduler drops its sender
async fn log_events(mut events: mpsc::Receiver<SchedulerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SchedulerEvent::Activated {
                interval_secs,
                next_update_at: Some(at),
            } => info!("Updates every {}s, next at {}", interval_secs, at),
            SchedulerEvent::ReconfigurationRequired { code, reason } => {
                warn!("Reconfiguration required ({}): {}", code, reason)
            }
            other => debug!("Scheduler event: {:?}", other),
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
