//! Append-only wallpaper history.
//!
//! The file is unbounded; `recent` mode shows only the newest non-empty
//! lines and re-reads the file every time, so out-of-band edits show up.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    error::AppError,
    model::{
        catalog::Catalog,
        list_file::{append_line, ensure_list_file, read_lines},
    },
};

pub const DEFAULT_HISTORY_WINDOW: usize = 25;

#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    window: usize,
}

/// What `sync_on_startup` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Appended(String),
    AlreadyLatest,
    /// No usable active name was reported.
    NoActiveName,
    /// The active name is not (or no longer) in the catalog.
    UnknownItem(String),
}

impl History {
    pub fn open(path: impl Into<PathBuf>, window: usize) -> Result<Self, AppError> {
        let path = path.into();
        ensure_list_file(&path)?;
        Ok(Self { path, window })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the wallpaper the external app last showed, unless it is
    /// already the newest entry.
    pub fn sync_on_startup(
        &self,
        active: Option<&str>,
        catalog: &Catalog,
    ) -> Result<SyncOutcome, AppError> {
        let active = match active.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => {
                warn!("Could not read the active wallpaper. Skipping history update.");
                return Ok(SyncOutcome::NoActiveName);
            }
        };

        let last = self.last_entry()?;
        if last.is_none() {
            warn!("History file {} is empty", self.path.display());
        }
        if last.as_deref() == Some(active) {
            return Ok(SyncOutcome::AlreadyLatest);
        }

        if !catalog.contains(active) {
            warn!(
                "Active wallpaper '{}' is no longer in {}. It may have been deleted.",
                active,
                catalog.root().display()
            );
            return Ok(SyncOutcome::UnknownItem(active.to_string()));
        }

        self.append(active)?;
        info!("History synced with active wallpaper '{}'", active);
        Ok(SyncOutcome::Appended(active.to_string()))
    }

    pub fn append(&self, name: &str) -> Result<(), AppError> {
        append_line(&self.path, name)
    }

    /// Newest first, blank lines skipped, at most `window` entries.
    pub fn display_window(&self) -> Result<Vec<String>, AppError> {
        let lines = read_lines(&self.path)?;
        Ok(lines
            .into_iter()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .take(self.window)
            .collect())
    }

    fn last_entry(&self) -> Result<Option<String>, AppError> {
        let lines = read_lines(&self.path)?;
        Ok(lines
            .into_iter()
            .rev()
            .map(|line| line.trim().to_string())
            .find(|line| !line.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::from_names("/wallpapers", ["ocean-wave", "ocean-calm", "forest"])
    }

    #[test]
    fn test_sync_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let history = History::open(dir.path().join("history.txt"), DEFAULT_HISTORY_WINDOW).unwrap();

        let first = history.sync_on_startup(Some("forest"), &catalog()).unwrap();
        let second = history.sync_on_startup(Some("forest"), &catalog()).unwrap();

        assert_eq!(first, SyncOutcome::Appended("forest".into()));
        assert_eq!(second, SyncOutcome::AlreadyLatest);
        assert_eq!(fs::read_to_string(history.path()).unwrap(), "forest\n");
    }

    #[test]
    fn test_sync_compares_last_non_empty_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        fs::write(&path, "ocean-wave\nforest\n\n  \n").unwrap();
        let history = History::open(&path, DEFAULT_HISTORY_WINDOW).unwrap();

        let outcome = history.sync_on_startup(Some("forest"), &catalog()).unwrap();
        assert_eq!(outcome, SyncOutcome::AlreadyLatest);
    }

    #[test]
    fn test_sync_skips_unknown_and_empty_names() {
        let dir = TempDir::new().unwrap();
        let history = History::open(dir.path().join("history.txt"), DEFAULT_HISTORY_WINDOW).unwrap();

        assert_eq!(
            history.sync_on_startup(Some("deleted-one"), &catalog()).unwrap(),
            SyncOutcome::UnknownItem("deleted-one".into())
        );
        assert_eq!(
            history.sync_on_startup(Some("  "), &catalog()).unwrap(),
            SyncOutcome::NoActiveName
        );
        assert_eq!(
            history.sync_on_startup(None, &catalog()).unwrap(),
            SyncOutcome::NoActiveName
        );
        assert_eq!(fs::read_to_string(history.path()).unwrap(), "");
    }

    #[test]
    fn test_display_window_is_capped_and_newest_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!("wp-{i}\n\n"));
        }
        fs::write(&path, text).unwrap();

        let history = History::open(&path, DEFAULT_HISTORY_WINDOW).unwrap();
        let window = history.display_window().unwrap();
        assert_eq!(window.len(), 25);
        assert_eq!(window[0], "wp-39");
        assert_eq!(window[24], "wp-15");
        assert!(window.iter().all(|name| !name.is_empty()));
    }

    #[test]
    fn test_display_window_sees_out_of_band_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        let history = History::open(&path, 3).unwrap();
        assert!(history.display_window().unwrap().is_empty());

        fs::write(&path, "forest\nocean-wave\n").unwrap();
        assert_eq!(history.display_window().unwrap(), ["ocean-wave", "forest"]);
    }
}
