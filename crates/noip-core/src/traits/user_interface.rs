// # User Interface Trait
//
// Defines the host-side prompts the scheduler can raise.

use async_trait::async_trait;

/// A modal notice the user must acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub heading: String,
    pub message: String,
    pub detail: String,
}

impl Dialog {
    pub fn new(
        title: impl Into<String>,
        heading: impl Into<String>,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            heading: heading.into(),
            message: message.into(),
            detail: detail.into(),
        }
    }
}

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A non-blocking, transient notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Trait for host user interface collaborators
///
/// # Blocking Semantics
///
/// `open_configuration_ui` and `show_blocking_dialog` are expected to return
/// only once the user has dealt with them. The scheduler re-validates right
/// after `open_configuration_ui` returns (after its configured delay), so a
/// UI that returns immediately turns reconfiguration into a tight loop
/// bounded only by `SchedulerConfig::reconfigure_delay_secs`.
#[async_trait]
pub trait UserInterface: Send + Sync {
    /// Let the user edit the settings; returns when the editor is closed
    async fn open_configuration_ui(&self) -> Result<(), crate::Error>;

    /// Show a modal notice
    async fn show_blocking_dialog(&self, dialog: Dialog) -> Result<(), crate::Error>;

    /// Show a transient notice
    async fn show_notification(&self, notification: Notification) -> Result<(), crate::Error>;
}
