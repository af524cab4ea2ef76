//! Application configuration
//!
//! Authentication is an external collaborator: the current host identity
//! arrives from the config file, created with a fresh id on first run.
//! The data directory follows the platform convention.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use casita_core::{Error, Result};

/// Base URL prefix for shareable guest links (`?g=<id>`)
const DEFAULT_SHARE_BASE_URL: &str = "https://casita.app/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Owning-user identifier attached to every stored profile
    pub owner_id: Uuid,
    /// Display name prefilled as the host name on new drafts
    pub owner_name: String,
    /// Override for the SQLite database location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Origin used when printing shareable guest links
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
}

fn default_share_base_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

impl AppConfig {
    /// Load the config file, creating one with a fresh owner identity on
    /// first run.
    pub fn load_or_init() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let config: AppConfig = toml::from_str(&raw)
                .map_err(|e| Error::Validation(format!("Invalid config file: {e}")))?;
            return Ok(config);
        }

        let config = AppConfig {
            owner_id: Uuid::new_v4(),
            owner_name: "Host".to_string(),
            database_path: None,
            share_base_url: default_share_base_url(),
        };
        config.save(&path)?;
        info!(path = %path.display(), "Created new configuration");
        Ok(config)
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| Error::Validation(format!("Could not serialize config: {e}")))?;
        fs::write(path, raw)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("app", "casita", "casita").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Resolved database path, honoring the override
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("app", "casita", "casita").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(dirs.data_dir().join("casita.db"))
    }

    /// Shareable, unauthenticated guest link for a profile
    pub fn share_url(&self, profile_id: Uuid) -> String {
        format!(
            "{}?g={profile_id}",
            self.share_base_url.trim_end_matches('?')
        )
    }
}
