// # Settings Source Trait
//
// Defines how the updater reads the host's persisted settings.
//
// ## Implementations
//
// - `MemorySettings`: in-memory, for embedding and tests
// - `FileSettings`: JSON file, re-read on every call
// - `EnvSettings`: environment variables (in `noipd`)

use async_trait::async_trait;

use crate::config::RawSettings;

/// Trait for reading the current update settings
///
/// The scheduler calls this at every validation attempt and before every
/// periodic notification, so implementations must return the *current*
/// values (user edits are picked up without a restart).
///
/// # Security
///
/// Implementations must not log the username or password.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Read the current settings
    ///
    /// # Returns
    ///
    /// - `Ok(RawSettings)`: The settings as currently persisted
    /// - `Err(Error)`: If the settings could not be read
    async fn get_settings(&self) -> Result<RawSettings, crate::Error>;
}
