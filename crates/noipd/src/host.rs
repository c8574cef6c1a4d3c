//! Headless host collaborators for the daemon
//!
//! - [`EnvSettings`]: update settings from `NOIP_*` environment variables
//! - [`ConsoleUi`]: dialogs and notifications rendered as log events, and a
//!   configuration prompt that blocks until the settings can have changed

use async_trait::async_trait;
use noip_core::Error;
use noip_core::ShutdownWaiter;
use noip_core::config::{DEFAULT_INTERVAL_HOURS, RawSettings};
use noip_core::traits::{Dialog, Notification, SettingsSource, Severity, UserInterface};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How often a settings file is checked for edits
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Update settings read from the process environment
///
/// - `NOIP_HOST`, `NOIP_USERNAME`, `NOIP_PASSWORD`
/// - `NOIP_INTERVAL_HOURS` (default 24)
/// - `NOIP_SHOW_NOTIFICATIONS` (`true`/`1`/`yes`, default off)
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettings;

#[async_trait]
impl SettingsSource for EnvSettings {
    async fn get_settings(&self) -> Result<RawSettings, Error> {
        read_settings(|key| std::env::var(key).ok())
    }
}

/// Build settings from a variable lookup
pub fn read_settings(lookup: impl Fn(&str) -> Option<String>) -> Result<RawSettings, Error> {
    let interval = match lookup("NOIP_INTERVAL_HOURS") {
        Some(raw) => raw.trim().parse::<NonZeroU32>().map_err(|_| {
            Error::settings(format!(
                "NOIP_INTERVAL_HOURS must be a whole number of hours > 0. Got: {}",
                raw
            ))
        })?,
        None => NonZeroU32::new(DEFAULT_INTERVAL_HOURS).unwrap_or(NonZeroU32::MIN),
    };

    let shownotif = lookup("NOIP_SHOW_NOTIFICATIONS")
        .map(|v| parse_flag(&v))
        .unwrap_or(false);

    Ok(RawSettings::new(
        lookup("NOIP_HOST").unwrap_or_default().trim(),
        lookup("NOIP_USERNAME").unwrap_or_default(),
        lookup("NOIP_PASSWORD").unwrap_or_default(),
    )
    .with_interval(interval)
    .with_notifications(shownotif))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Where the daemon's update settings live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsLocation {
    /// `NOIP_*` variables, fixed for the life of the process
    Environment,

    /// JSON file, re-read on every validation
    File(PathBuf),
}

/// User interface for a process without a display
///
/// Dialogs and notifications become log events. The configuration prompt
/// returns only once the settings may have changed: never for environment
/// settings (only a restart changes them), on the next edit for a settings
/// file. Shutdown releases it in both cases. Rejected credentials are
/// therefore not sent again until someone has touched them.
#[derive(Debug, Clone)]
pub struct ConsoleUi {
    location: SettingsLocation,
    shutdown: ShutdownWaiter,
    poll_interval: Duration,
}

impl ConsoleUi {
    pub fn new(location: SettingsLocation, shutdown: ShutdownWaiter) -> Self {
        Self {
            location,
            shutdown,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Check a settings file for edits this often
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait until the file content differs from what it is now
    ///
    /// Returns false when shutdown came first.
    async fn wait_for_edit(&self, path: &Path) -> bool {
        let before = tokio::fs::read(path).await.ok();
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return false,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
            if tokio::fs::read(path).await.ok() != before {
                return true;
            }
        }
    }
}

#[async_trait]
impl UserInterface for ConsoleUi {
    async fn open_configuration_ui(&self) -> Result<(), Error> {
        match &self.location {
            SettingsLocation::Environment => {
                warn!(
                    "Update settings need attention: set NOIP_HOST, NOIP_USERNAME \
                    and NOIP_PASSWORD, then restart noipd"
                );
                info!("Environment settings cannot change while running, waiting for shutdown");
                self.shutdown.cancelled().await;
            }
            SettingsLocation::File(path) => {
                warn!(
                    "Update settings need attention: edit {} \
                    (host, username, password, interval, shownotif)",
                    path.display()
                );
                if self.wait_for_edit(path).await {
                    info!("Settings file changed, validating again");
                } else {
                    debug!("Shutdown while waiting for a settings edit");
                }
            }
        }
        Ok(())
    }

    async fn show_blocking_dialog(&self, dialog: Dialog) -> Result<(), Error> {
        warn!(
            "{}: {} - {} {}",
            dialog.title, dialog.heading, dialog.message, dialog.detail
        );
        Ok(())
    }

    async fn show_notification(&self, notification: Notification) -> Result<(), Error> {
        match notification.severity {
            Severity::Info => info!("{}: {}", notification.title, notification.message),
            Severity::Error => error!("{}: {}", notification.title, notification.message),
        }
        Ok(())
    }
}
