//! Configuration types for the No-IP updater
//!
//! [`RawSettings`] is what the host hands us, [`Configuration`] is what an
//! update is built from, and [`validate`] turns one into the other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use tracing::debug;

/// Seconds per configured interval hour
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Default update interval in hours
pub const DEFAULT_INTERVAL_HOURS: u32 = 24;

/// Default pause after the configuration UI closes, in seconds
pub const DEFAULT_RECONFIGURE_DELAY_SECS: u64 = 30;

/// Default title for dialogs and notifications
pub const DEFAULT_CLIENT_NAME: &str = "No-IP Updater";

/// Settings as persisted by the host
///
/// Field names follow the host's setting keys so a settings file reads
/// `{"interval": 24, "host": "...", "username": "...", ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSettings {
    /// Interval between updates, in hours
    #[serde(default = "default_interval")]
    pub interval: NonZeroU32,

    /// Hostname managed by the provider
    #[serde(default)]
    pub host: String,

    /// Account username
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub username: String,

    /// Account password
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub password: String,

    /// Show a transient notification after each periodic update
    #[serde(default)]
    pub shownotif: bool,
}

impl RawSettings {
    /// Create settings with the default interval and notifications off
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            interval: default_interval(),
            host: host.into(),
            username: username.into(),
            password: password.into(),
            shownotif: false,
        }
    }

    /// Set the interval in hours
    pub fn with_interval(mut self, interval: NonZeroU32) -> Self {
        self.interval = interval;
        self
    }

    /// Enable or disable notifications
    pub fn with_notifications(mut self, shownotif: bool) -> Self {
        self.shownotif = shownotif;
        self
    }
}

impl Default for RawSettings {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

// Custom Debug implementation that hides the credentials
impl fmt::Debug for RawSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSettings")
            .field("interval", &self.interval)
            .field("host", &self.host)
            .field("username", &"<REDACTED>")
            .field("password", &"<REDACTED>")
            .field("shownotif", &self.shownotif)
            .finish()
    }
}

fn default_interval() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_INTERVAL_HOURS).unwrap_or(NonZeroU32::MIN)
}

/// Validated update configuration
///
/// Never mutated by the core; a fresh one is produced at each validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub interval_hours: u32,
    pub show_notifications: bool,
}

impl Configuration {
    /// Polling interval in seconds
    pub fn interval_secs(&self) -> u64 {
        u64::from(self.interval_hours) * SECONDS_PER_HOUR
    }

    /// Whether all required fields are present
    pub fn is_complete(&self) -> bool {
        !self.hostname.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("hostname", &self.hostname)
            .field("username", &"<REDACTED>")
            .field("password", &"<REDACTED>")
            .field("interval_hours", &self.interval_hours)
            .field("show_notifications", &self.show_notifications)
            .finish()
    }
}

/// Result of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub config: Configuration,
    pub valid: bool,
}

impl Validation {
    /// The configuration, if it is usable
    pub fn into_valid(self) -> Option<Configuration> {
        self.valid.then_some(self.config)
    }
}

/// Validate host settings
///
/// Invalid iff hostname, username or password is empty. No network I/O.
pub fn validate(raw: &RawSettings) -> Validation {
    let config = Configuration {
        hostname: raw.host.clone(),
        username: raw.username.clone(),
        password: raw.password.clone(),
        interval_hours: raw.interval.get(),
        show_notifications: raw.shownotif,
    };

    debug!("Interval: {}s", config.interval_secs());
    debug!("Host: {}", config.hostname);

    let valid = config.is_complete();
    Validation { config, valid }
}

/// Scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// User-Agent sent with every update request
    pub user_agent: String,

    /// Title used for dialogs and notifications
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Pause after the configuration UI returns before re-validating
    ///
    /// Set to 0 to re-validate immediately, relying on the host UI to block.
    #[serde(default = "default_reconfigure_delay_secs")]
    pub reconfigure_delay_secs: u64,

    /// Capacity of the scheduler event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SchedulerConfig {
    /// Create a scheduler configuration with default delays
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            client_name: default_client_name(),
            reconfigure_delay_secs: default_reconfigure_delay_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the dialog/notification title
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Set the reconfiguration delay
    pub fn with_reconfigure_delay_secs(mut self, secs: u64) -> Self {
        self.reconfigure_delay_secs = secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.user_agent.trim().is_empty() {
            return Err(crate::Error::config("User-Agent cannot be empty"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_string()
}

fn default_reconfigure_delay_secs() -> u64 {
    DEFAULT_RECONFIGURE_DELAY_SECS
}

fn default_event_channel_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(h: u32) -> NonZeroU32 {
        NonZeroU32::new(h).unwrap()
    }

    #[test]
    fn all_blank_is_invalid() {
        let validation = validate(&RawSettings::default());
        assert!(!validation.valid);
        assert!(validation.into_valid().is_none());
    }

    #[test]
    fn any_blank_required_field_is_invalid() {
        let cases = [
            RawSettings::new("", "user", "pwd"),
            RawSettings::new("host.ddns.net", "", "pwd"),
            RawSettings::new("host.ddns.net", "user", ""),
        ];
        for raw in cases {
            assert!(!validate(&raw).valid, "{raw:?}");
        }
    }

    #[test]
    fn complete_settings_are_valid_with_exact_interval() {
        for h in [1, 12, 24, 48] {
            let raw = RawSettings::new("host.ddns.net", "user", "pwd").with_interval(hours(h));
            let config = validate(&raw).into_valid().expect("valid");
            assert_eq!(config.interval_secs(), u64::from(h) * 3600);
            assert_eq!(config.hostname, "host.ddns.net");
        }
    }

    #[test]
    fn notifications_flag_is_carried() {
        let raw = RawSettings::new("h", "u", "p").with_notifications(true);
        assert!(validate(&raw).config.show_notifications);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let raw: RawSettings = serde_json::from_str(r#"{"host": "home.ddns.net"}"#).unwrap();
        assert_eq!(raw.interval.get(), DEFAULT_INTERVAL_HOURS);
        assert_eq!(raw.host, "home.ddns.net");
        assert!(raw.username.is_empty());
        assert!(!raw.shownotif);
    }

    #[test]
    fn zero_interval_is_rejected_by_serde() {
        let parsed = serde_json::from_str::<RawSettings>(r#"{"interval": 0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let raw = RawSettings::new("home.ddns.net", "alice", "s3cr3t-pw");
        let config = validate(&raw).config;

        for rendered in [format!("{raw:?}"), format!("{config:?}")] {
            assert!(!rendered.contains("alice"));
            assert!(!rendered.contains("s3cr3t-pw"));
            assert!(rendered.contains("home.ddns.net"));
        }
    }

    #[test]
    fn scheduler_config_validation() {
        assert!(SchedulerConfig::new("noipd/0.1 admin@example.com").validate().is_ok());
        assert!(SchedulerConfig::new("  ").validate().is_err());
    }
}
