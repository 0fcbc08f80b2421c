//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use stil_core::{PolicyError, SessionPolicy};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Directory exported tables are written to.
    pub export_dir: PathBuf,
    /// Minimum stay before a session may be closed, in minutes.
    pub min_stay_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("stil.db"),
            export_dir: PathBuf::from("."),
            min_stay_minutes: 15,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (STIL_*)
        figment = figment.merge(Env::prefixed("STIL_"));

        figment.extract()
    }

    /// Session rules derived from this configuration.
    pub fn session_policy(&self) -> Result<SessionPolicy, PolicyError> {
        SessionPolicy::with_min_stay_minutes(self.min_stay_minutes)
    }

    /// Test configuration rooted in `dir`.
    #[cfg(test)]
    pub(crate) fn in_dir(dir: &Path) -> Self {
        Self {
            database_path: dir.join("stil.db"),
            export_dir: dir.join("exports"),
            min_stay_minutes: 15,
        }
    }
}

/// Returns the platform-specific config directory for stil.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stil"))
}

/// Returns the platform-specific data directory for stil.
///
/// On Linux: `~/.local/share/stil`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("stil"))
}
