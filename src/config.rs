//! Configuration management.
//!
//! A single data directory holds the SQLite database, the blob root, and a
//! small TOML settings file.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default object storage bucket/container name.
pub const DEFAULT_BUCKET: &str = "tender-documents";

/// Default signed download URL lifetime in seconds.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 900;

/// Tunable settings persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bucket/container identifier recorded on stored documents.
    pub bucket: String,
    /// Lifetime of signed download URLs.
    pub signed_url_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
        }
    }
}

/// Resolved configuration for one data directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Load configuration, falling back to the platform data directory and
    /// default settings when nothing is configured yet.
    pub fn load(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let settings_path = data_dir.join("settings.toml");
        let settings = if settings_path.exists() {
            let raw = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("reading {}", settings_path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("parsing {}", settings_path.display()))?
        } else {
            Settings::default()
        };
        Ok(Self { data_dir, settings })
    }

    /// Create the data directory layout and write default settings if absent.
    pub fn init(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.blobs_dir())?;
        let settings_path = self.data_dir.join("settings.toml");
        if !settings_path.exists() {
            let raw = toml::to_string_pretty(&self.settings)?;
            std::fs::write(&settings_path, raw)?;
        }
        Ok(())
    }

    /// Path to the SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("tenderfile.db")
    }

    /// Root directory of the filesystem object store.
    pub fn blobs_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("tenderfile"))
        .context("could not determine a data directory; pass --data-dir")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults_when_unconfigured() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.settings.bucket, DEFAULT_BUCKET);
        assert!(config.database_path().starts_with(dir.path()));
    }

    #[test]
    fn test_init_writes_settings_and_round_trips() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(dir.path().to_path_buf())).unwrap();
        config.init().unwrap();

        assert!(config.blobs_dir().is_dir());
        assert!(dir.path().join("settings.toml").exists());

        let reloaded = Config::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(reloaded.settings.bucket, config.settings.bucket);
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            "bucket = \"custom-bucket\"\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.settings.bucket, "custom-bucket");
        // Unspecified keys keep their defaults.
        assert_eq!(config.settings.signed_url_ttl_secs, DEFAULT_SIGNED_URL_TTL_SECS);
    }
}
