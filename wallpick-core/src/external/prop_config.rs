//! The renderer's per-monitor properties file (`<prefix><monitor>.prop`),
//! a line-oriented `key=value` file. Only the `WallpaperName` line is ours.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{error::AppError, external::ActiveItemStore};

const NAME_KEY: &str = "WallpaperName=";

#[derive(Debug, Clone)]
pub struct PropConfig {
    path: PathBuf,
}

impl PropConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the properties file (and its sibling monitors).
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// `.Komorebi` + `0` + `.prop`
    pub fn file_name(prefix: &str, monitor: &str) -> String {
        format!("{prefix}{monitor}.prop")
    }

    /// Search every user home for the properties file, falling back to
    /// `<fallback_home>/<file>` with a warning.
    pub fn locate(prefix: &str, monitor: &str, homes: &[PathBuf], fallback_home: &Path) -> Self {
        let file_name = Self::file_name(prefix, monitor);
        let app_dir = prefix.trim_start_matches('.');

        for home in homes {
            for candidate in candidate_paths(home, app_dir, &file_name) {
                if candidate.exists() {
                    info!("Using properties file {}", candidate.display());
                    return Self::new(candidate);
                }
            }
        }

        let fallback = fallback_home.join(&file_name);
        warn!(
            "Could not find a properties file named '{}'. Using default location {}.",
            file_name,
            fallback.display()
        );
        Self::new(fallback)
    }
}

/// Locations checked for one home, in order.
fn candidate_paths(home: &Path, app_dir: &str, file_name: &str) -> Vec<PathBuf> {
    let mut paths = vec![
        home.join(file_name),
        home.join(".config").join(app_dir).join(file_name),
        home.join(".local").join("share").join(app_dir).join(file_name),
        home.join(format!(".{app_dir}")).join(file_name),
        home.join(".config").join(file_name),
        PathBuf::from("/").join(file_name),
    ];
    if cfg!(windows) {
        paths.extend([
            home.join("AppData").join("Local").join(app_dir).join(file_name),
            home.join("AppData").join("Roaming").join(app_dir).join(file_name),
            home.join("AppData").join("Local").join(file_name),
        ]);
    }
    paths
}

/// Home folders of every local user.
pub fn user_homes() -> Vec<PathBuf> {
    let base = if cfg!(windows) {
        PathBuf::from("C:\\Users")
    } else {
        PathBuf::from("/home")
    };

    let mut homes: Vec<PathBuf> = match fs::read_dir(&base) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect(),
        Err(e) => {
            debug!("Cannot list {}: {}", base.display(), e);
            Vec::new()
        }
    };
    homes.sort();
    homes
}

impl ActiveItemStore for PropConfig {
    fn active_name(&self) -> Result<Option<String>, AppError> {
        if !self.path.exists() {
            warn!("Properties file {} does not exist", self.path.display());
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        let name = text
            .lines()
            .find_map(|line| line.trim_start().strip_prefix(NAME_KEY))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(name)
    }

    /// Rewrite the name line in place, keeping every other line. A file
    /// without one gets the line appended.
    fn set_active_name(&self, name: &str) -> Result<(), AppError> {
        let text = if self.path.exists() {
            fs::read_to_string(&self.path)?
        } else {
            String::new()
        };

        let mut replaced = false;
        let mut out = String::with_capacity(text.len() + name.len());
        for line in text.lines() {
            if line.trim_start().starts_with(NAME_KEY) {
                out.push_str(NAME_KEY);
                out.push_str(name);
                replaced = true;
            } else {
                out.push_str(line);
            }
            out.push('\n');
        }
        if !replaced {
            out.push_str(NAME_KEY);
            out.push_str(name);
            out.push('\n');
        }

        fs::write(&self.path, out)?;
        debug!("Wrote {}{} to {}", NAME_KEY, name, self.path.display());
        Ok(())
    }
}
