// # File Settings
//
// File-based implementation of SettingsSource.
//
// ## Purpose
//
// Lets a user (or a separate settings editor) change the update settings
// while the daemon runs. The file is read again on every call, so an edit
// made while the configuration prompt is open is picked up by the next
// validation.
//
// ## File Format
//
// ```json
// {
//   "interval": 24,
//   "host": "home.ddns.net",
//   "username": "user@example.com",
//   "password": "secret",
//   "shownotif": false
// }
// ```
//
// Every field is optional. A missing file reads as blank settings, which
// the validator reports as unconfigured.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::config::RawSettings;
use crate::traits::SettingsSource;

/// JSON file settings source
///
/// # Example
///
/// ```rust,no_run
/// use noip_core::settings::FileSettings;
/// use noip_core::traits::SettingsSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = FileSettings::new("/etc/noipd/settings.json");
///     let current = settings.get_settings().await?;
///     println!("host: {}", current.host);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Create a settings source backed by `path`
    ///
    /// The file does not need to exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write settings atomically (temp file, then rename)
    ///
    /// On unix the file is created owner read/write only.
    pub async fn save(&self, settings: &RawSettings) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::settings(format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(settings)?;

        let temp_path = self.temp_path();
        // A stale temp file would keep its old permissions
        let _ = fs::remove_file(&temp_path).await;
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create_new(true);
            // The file holds the password
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options.open(&temp_path).await.map_err(|e| {
                Error::settings(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await?;
            file.flush().await?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::settings(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Settings written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl SettingsSource for FileSettings {
    async fn get_settings(&self) -> Result<RawSettings, Error> {
        if !self.path.exists() {
            tracing::debug!("Settings file does not exist: {}", self.path.display());
            return Ok(RawSettings::default());
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::settings(format!(
                "Failed to read settings file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // serde_json messages can quote the offending value (a numeric
        // password, say), so only its position is reported
        serde_json::from_str(&content).map_err(|e| {
            Error::settings(format!(
                "Failed to parse settings file {}: {:?} error at line {} column {}",
                self.path.display(),
                e.classify(),
                e.line(),
                e.column()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_blank() {
        let dir = tempdir().unwrap();
        let settings = FileSettings::new(dir.path().join("settings.json"));

        let raw = settings.get_settings().await.unwrap();
        assert_eq!(raw, RawSettings::default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = FileSettings::new(&path);

        let raw = RawSettings::new("home.ddns.net", "user", "pass")
            .with_interval(NonZeroU32::new(12).unwrap())
            .with_notifications(true);
        settings.save(&raw).await.unwrap();

        assert!(path.exists());
        assert!(!settings.temp_path().exists());
        assert_eq!(settings.get_settings().await.unwrap(), raw);
    }

    #[tokio::test]
    async fn test_edits_are_picked_up_without_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = FileSettings::new(&path);

        fs::write(&path, br#"{"host": ""}"#).await.unwrap();
        assert!(settings.get_settings().await.unwrap().host.is_empty());

        fs::write(&path, br#"{"host": "home.ddns.net"}"#).await.unwrap();
        assert_eq!(settings.get_settings().await.unwrap().host, "home.ddns.net");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = FileSettings::new(&path);

        // a leftover temp file from an interrupted save
        fs::write(settings.temp_path(), b"{}").await.unwrap();
        settings
            .save(&RawSettings::new("home.ddns.net", "user", "pass"))
            .await
            .unwrap();

        let mode = fs::metadata(&path).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_parse_error_does_not_quote_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            br#"{"host": "home.ddns.net", "username": "alice", "password": 98765432}"#,
        )
        .await
        .unwrap();

        let err = FileSettings::new(&path).get_settings().await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::Settings(_)), "{message}");
        assert!(message.contains("line 1"), "{message}");
        assert!(!message.contains("98765432"), "{message}");
    }

    #[tokio::test]
    async fn test_malformed_file_is_settings_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let err = FileSettings::new(&path).get_settings().await.unwrap_err();
        assert!(matches!(err, Error::Settings(_)), "{err}");
    }
}
