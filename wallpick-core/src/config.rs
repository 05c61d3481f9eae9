//! src/config.rs
//! ============================================================================
//! # Config: Picker Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the cross-platform config path
//! resolved by the [`directories`](https://docs.rs/directories) crate. A
//! missing file is replaced by the defaults, which are written back so the
//! user has something to edit.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.validate()?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::AppError;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "wallpick";
const APPLICATION: &str = "wallpick";

/// Where log files go and how chatty they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,

    /// `EnvFilter` directive, e.g. `info` or `wallpick_core=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_data_dir().join("logs"),
            level: "info".to_string(),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// One folder per wallpaper; read once at startup.
    pub catalog_dir: PathBuf,

    /// Wallpaper renderer executable, stopped and restarted on selection.
    pub app_binary: String,

    /// Per-monitor properties file name prefix (`<prefix><monitor>.prop`).
    pub prop_file_prefix: String,

    /// Holds `favorites.txt`, `history.txt` and `to-edit.txt`.
    pub lists_dir: PathBuf,

    pub backups_dir: PathBuf,

    /// Number of history entries shown in `recent` mode.
    pub max_recent_history: usize,

    /// Refuse to run without an effective uid of 0 (unix only).
    pub require_elevated: bool,

    /// Pause before the key reader starts, so the Enter that answered the
    /// monitor prompt is not picked up as a selection.
    #[serde(with = "humantime_serde")]
    pub startup_delay: Duration,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            catalog_dir: PathBuf::from("/System/Resources/Komorebi"),
            app_binary: "komorebi".to_string(),
            prop_file_prefix: ".Komorebi".to_string(),
            lists_dir: data_dir.join("lists"),
            backups_dir: data_dir.join("backups"),
            max_recent_history: 25,
            require_elevated: true,
            startup_delay: Duration::from_millis(250),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Loads config from TOML file at the platform config dir, or writes and
    /// returns defaults.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to TOML file at the platform config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_recent_history == 0 {
            return Err(AppError::invalid_input(
                "max_recent_history",
                "must be at least 1",
            ));
        }

        if self.catalog_dir.as_os_str().is_empty() {
            return Err(AppError::invalid_input("catalog_dir", "is required"));
        }

        if self.app_binary.trim().is_empty() {
            return Err(AppError::invalid_input("app_binary", "is required"));
        }

        Ok(())
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.lists_dir.join("favorites.txt")
    }

    pub fn history_path(&self) -> PathBuf {
        self.lists_dir.join("history.txt")
    }

    pub fn to_edit_path(&self) -> PathBuf {
        self.lists_dir.join("to-edit.txt")
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}
