//! Favorites list persisted one name per line.
//!
//! Every mutation writes through to disk immediately. Entries that do not
//! exist in the catalog are dropped from memory at load time but stay in the
//! file, so rewrites are computed from the on-disk lines rather than from
//! the in-memory list.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    model::{
        catalog::Catalog,
        list_file::{append_line, ensure_list_file, read_lines, write_lines},
    },
};

#[derive(Debug, Clone, Default)]
pub struct Favorites {
    path: PathBuf,
    entries: Vec<String>,
}

impl Favorites {
    /// Read the favorites file, validating every entry against the catalog.
    ///
    /// Returns the list plus one `AppError::Integrity` per dangling entry.
    pub fn load(path: impl Into<PathBuf>, catalog: &Catalog) -> Result<(Self, Vec<AppError>), AppError> {
        let path = path.into();
        ensure_list_file(&path)?;

        let mut entries: Vec<String> = Vec::new();
        let mut problems = Vec::new();
        for line in read_lines(&path)? {
            if line.is_empty() {
                continue;
            }
            if !catalog.contains(&line) {
                warn!("Favorite '{}' in {} is not in the catalog", line, path.display());
                problems.push(AppError::Integrity {
                    list: path.clone(),
                    name: line,
                });
            } else if entries.contains(&line) {
                debug!("Ignoring duplicate favorite '{}'", line);
            } else {
                entries.push(line);
            }
        }

        info!("Loaded {} favorites from {}", entries.len(), path.display());
        Ok((Self { path, entries }, problems))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add(&mut self, name: &str) -> Result<(), AppError> {
        if self.contains(name) {
            return Err(AppError::AlreadyFavorite(name.to_string()));
        }

        append_line(&self.path, name)?;
        self.entries.push(name.to_string());
        info!("Added '{}' to favorites", name);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), AppError> {
        if !self.contains(name) {
            return Err(AppError::NotFavorite(name.to_string()));
        }

        let kept: Vec<String> = read_lines(&self.path)?
            .into_iter()
            .filter(|line| line != name)
            .collect();
        write_lines(&self.path, &kept)?;
        self.entries.retain(|n| n != name);
        info!("Removed '{}' from favorites", name);
        Ok(())
    }

    /// Follow a wallpaper rename. The renamed entry moves to the end of the
    /// list; a non-favorite `old` is a no-op.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), AppError> {
        if !self.contains(old) {
            return Ok(());
        }

        let mut lines: Vec<String> = read_lines(&self.path)?
            .into_iter()
            .filter(|line| line != old && line != new)
            .collect();
        lines.push(new.to_string());
        write_lines(&self.path, &lines)?;

        self.entries.retain(|n| n != old && n != new);
        self.entries.push(new.to_string());
        info!("Favorite '{}' renamed to '{}'", old, new);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::from_names("/wallpapers", ["ocean-wave", "ocean-calm", "forest", "foo"])
    }

    #[test]
    fn test_load_drops_unknown_entries_but_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.txt");
        fs::write(&path, "forest\nghost\nocean-calm\n").unwrap();

        let (favorites, problems) = Favorites::load(&path, &catalog()).unwrap();
        assert_eq!(favorites.entries(), ["forest", "ocean-calm"]);
        assert_eq!(problems.len(), 1);
        assert!(matches!(&problems[0], AppError::Integrity { name, .. } if name == "ghost"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "forest\nghost\nocean-calm\n");
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lists").join("favorites.txt");

        let (favorites, problems) = Favorites::load(&path, &catalog()).unwrap();
        assert!(favorites.is_empty());
        assert!(problems.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_add_then_remove_restores_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.txt");
        fs::write(&path, "forest\nghost\n").unwrap();
        let before = fs::read(&path).unwrap();

        let (mut favorites, _) = Favorites::load(&path, &catalog()).unwrap();
        favorites.add("foo").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "forest\nghost\nfoo\n");

        favorites.remove("foo").unwrap();
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(favorites.entries(), ["forest"]);
    }

    #[test]
    fn test_add_after_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.txt");
        fs::write(&path, "forest").unwrap();

        let (mut favorites, _) = Favorites::load(&path, &catalog()).unwrap();
        favorites.add("foo").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "forest\nfoo\n");
    }

    #[test]
    fn test_preconditions_do_not_mutate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.txt");
        fs::write(&path, "forest\n").unwrap();

        let (mut favorites, _) = Favorites::load(&path, &catalog()).unwrap();
        assert!(matches!(favorites.add("forest"), Err(AppError::AlreadyFavorite(_))));
        assert!(matches!(favorites.remove("foo"), Err(AppError::NotFavorite(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "forest\n");
        assert_eq!(favorites.entries(), ["forest"]);
    }

    #[test]
    fn test_rename_moves_entry_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.txt");
        fs::write(&path, "forest\nocean-calm\nfoo\n").unwrap();

        let (mut favorites, _) = Favorites::load(&path, &catalog()).unwrap();
        favorites.rename("forest", "woods").unwrap();
        assert_eq!(favorites.entries(), ["ocean-calm", "foo", "woods"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "ocean-calm\nfoo\nwoods\n");

        // not a favorite: nothing happens
        favorites.rename("ocean-wave", "sea").unwrap();
        assert_eq!(favorites.entries(), ["ocean-calm", "foo", "woods"]);
    }
}
