//! The wallpaper catalog: folder names under the catalog root, enumerated
//! once at startup. Later additions/removals on disk are not observed until
//! the next run; membership checks elsewhere rely on this snapshot.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    root: PathBuf,
    /// Enumeration order, used as display order.
    names: Vec<String>,
}

impl Catalog {
    /// Enumerate the catalog root. A missing root is fatal.
    pub fn scan(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(AppError::CatalogMissing(root));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            // follows symlinks, so linked wallpaper folders count too
            if !entry.path().is_dir() {
                debug!("Skipping non-folder catalog entry {:?}", entry.file_name());
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!("Skipping non UTF-8 catalog entry {:?}", raw),
            }
        }

        info!("Catalog {} holds {} wallpapers", root.display(), names.len());
        Ok(Self { root, names })
    }

    pub fn from_names<I, S>(root: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
