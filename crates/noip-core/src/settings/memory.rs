// # Memory Settings
//
// In-memory implementation of SettingsSource.
//
// ## Purpose
//
// Lets an embedding application own the settings directly and push edits
// with `set()`. Every clone shares the same value, so a UI layer can hold
// one handle while the scheduler reads through another.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::RawSettings;
use crate::traits::SettingsSource;

/// In-memory settings source
///
/// # Example
///
/// ```rust,no_run
/// use noip_core::config::RawSettings;
/// use noip_core::settings::MemorySettings;
/// use noip_core::traits::SettingsSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = MemorySettings::default();
///     settings.set(RawSettings::new("home.ddns.net", "user", "pass")).await;
///
///     let current = settings.get_settings().await?;
///     assert_eq!(current.host, "home.ddns.net");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemorySettings {
    inner: Arc<RwLock<RawSettings>>,
}

impl MemorySettings {
    /// Create a settings source holding `settings`
    pub fn new(settings: RawSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Replace the stored settings
    pub async fn set(&self, settings: RawSettings) {
        *self.inner.write().await = settings;
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new(RawSettings::default())
    }
}

#[async_trait]
impl SettingsSource for MemorySettings {
    async fn get_settings(&self) -> Result<RawSettings, Error> {
        Ok(self.inner.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_settings_default_is_blank() {
        let settings = MemorySettings::default();
        let raw = settings.get_settings().await.unwrap();
        assert!(raw.host.is_empty());
        assert!(raw.username.is_empty());
        assert!(raw.password.is_empty());
    }

    #[tokio::test]
    async fn test_memory_settings_clones_share_edits() {
        let settings = MemorySettings::default();
        let handle = settings.clone();

        handle
            .set(RawSettings::new("home.ddns.net", "user", "pass"))
            .await;

        let raw = settings.get_settings().await.unwrap();
        assert_eq!(raw.host, "home.ddns.net");
    }
}
