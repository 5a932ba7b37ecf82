//! Application configuration.
//!
//! Reads `config/default.toml` (or the file given with `--config`), then
//! applies `MEDTRACK_DB` / `MEDTRACK_WRITE_MODE` / `MEDTRACK_LOG` overrides.
//! A missing file is not an error; every key has a default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use medtrack_store::WriteMode;
use serde::Deserialize;
use tracing::debug;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub logging: LoggingSection,
}

/// The `[storage]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// SQLite database file.
    pub path: PathBuf,
    pub write_mode: WriteMode,
    /// Maximum number of cached keys (0 disables the cache).
    pub cache_capacity: u64,
    pub cache_ttl_seconds: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/medtrack.db"),
            write_mode: WriteMode::FireAndForget,
            cache_capacity: 64,
            cache_ttl_seconds: 300,
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config {}", path.display()));
            }
        };

        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Apply `MEDTRACK_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup("MEDTRACK_DB") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(mode) = lookup("MEDTRACK_WRITE_MODE") {
            self.storage.write_mode = mode
                .parse()
                .map_err(anyhow::Error::msg)
                .context("MEDTRACK_WRITE_MODE")?;
        }
        if let Some(level) = lookup("MEDTRACK_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }
}
