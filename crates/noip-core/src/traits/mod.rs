//! Collaborator traits for the No-IP updater
//!
//! The scheduler only talks to the outside world through these interfaces.
//!
//! - [`SettingsSource`]: Read the host's persisted settings
//! - [`UserInterface`]: Dialogs, configuration UI and notifications
//! - [`UpdateTransport`]: Issue the HTTP update request
//! - [`AbortWaiter`]: Interruptible wait between attempts

pub mod abort_waiter;
pub mod settings_source;
pub mod update_transport;
pub mod user_interface;

pub use abort_waiter::AbortWaiter;
pub use settings_source::SettingsSource;
pub use update_transport::UpdateTransport;
pub use user_interface::{Dialog, Notification, Severity, UserInterface};
