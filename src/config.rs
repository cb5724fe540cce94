//! Sprinkler configuration.
//!
//! Loaded from `~/.sprinkler/config.toml`. Every key is optional; a missing
//! file means all defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use sprinkler::{clock::Clock, storage::StorePaths};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Sprinkler configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the command log, audit trail and lock file.
    /// Defaults to `~/.sprinkler/controller`.
    pub data_dir: Option<PathBuf>,

    /// Mirror file polled by the device agent.
    /// Defaults to `mirrorstate.txt` beside the data directory.
    pub mirror_path: Option<PathBuf>,

    /// Actual-state file written by the device agent.
    /// Defaults to `actualstate.txt` beside the data directory.
    pub actual_path: Option<PathBuf>,

    /// IANA time zone for command timestamps. Defaults to the system zone.
    pub timezone: Option<String>,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

impl Config {
    /// Load config from `~/.sprinkler/config.toml`, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from an explicit path, or defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.sprinkler/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sprinkler").join("config.toml"))
    }

    /// Resolve where every artifact lives.
    ///
    /// An explicit `data_dir` (from `--data-dir` or `SPRINKLER_DATA_DIR`)
    /// wins over the configured one.
    pub fn store_paths(&self, data_dir: Option<&Path>) -> Result<StorePaths, String> {
        let data_dir = match data_dir.or(self.data_dir.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir()
                .map(|h| h.join(".sprinkler").join("controller"))
                .ok_or("could not determine home directory")?,
        };

        let mut paths = StorePaths::in_dir(&data_dir);
        if let Some(mirror) = &self.mirror_path {
            paths.mirror.clone_from(mirror);
        }
        if let Some(actual) = &self.actual_path {
            paths.actual.clone_from(actual);
        }
        Ok(paths)
    }

    pub fn clock(&self) -> Result<Clock, String> {
        match &self.timezone {
            Some(name) => {
                Clock::in_zone(name).map_err(|e| format!("unknown timezone '{name}': {e}"))
            }
            None => Ok(Clock::system()),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
