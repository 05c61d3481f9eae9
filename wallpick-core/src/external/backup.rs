//! Copy a wallpaper folder into the backups directory before it is renamed
//! or deleted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{error::AppError, model::catalog::Catalog};

/// Copy `<catalog>/<name>` to `<backups_dir>/<name>`. An existing backup is
/// kept; the new copy gets a timestamp suffix instead.
pub fn backup_item(catalog: &Catalog, name: &str, backups_dir: &Path) -> Result<PathBuf, AppError> {
    let source = catalog.path_of(name);
    let mut dest = backups_dir.join(name);
    if dest.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        dest = backups_dir.join(format!("{name}-{stamp}"));
    }

    info!("Backing up {} to {}", source.display(), dest.display());
    copy_tree(&source, &dest).map_err(|e| AppError::backup_failed(name, &dest, e.to_string()))?;
    Ok(dest)
}

fn copy_tree(source: &Path, dest: &Path) -> Result<(), AppError> {
    if !source.is_dir() {
        return Err(AppError::Other(format!("{} is not a folder", source.display())));
    }

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| AppError::Other(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| AppError::Other(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            debug!("Copying {}", relative.display());
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated() -> (TempDir, Catalog) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("catalog");
        let item = root.join("ocean-wave");
        fs::create_dir_all(item.join("nested")).unwrap();
        fs::write(item.join("config"), "[Info]\n").unwrap();
        fs::write(item.join("nested").join("clip.mp4"), b"video").unwrap();
        let catalog = Catalog::from_names(&root, ["ocean-wave"]);
        (dir, catalog)
    }

    #[test]
    fn test_copies_whole_tree() {
        let (dir, catalog) = populated();
        let backups = dir.path().join("backups");

        let dest = backup_item(&catalog, "ocean-wave", &backups).unwrap();
        assert_eq!(dest, backups.join("ocean-wave"));
        assert_eq!(fs::read_to_string(dest.join("config")).unwrap(), "[Info]\n");
        assert_eq!(fs::read(dest.join("nested").join("clip.mp4")).unwrap(), b"video");
    }

    #[test]
    fn test_second_backup_gets_new_folder() {
        let (dir, catalog) = populated();
        let backups = dir.path().join("backups");

        let first = backup_item(&catalog, "ocean-wave", &backups).unwrap();
        let second = backup_item(&catalog, "ocean-wave", &backups).unwrap();
        assert_ne!(first, second);
        assert!(second.join("config").exists());
    }

    #[test]
    fn test_missing_item_fails() {
        let (dir, catalog) = populated();
        let err = backup_item(&catalog, "gone", &dir.path().join("backups")).unwrap_err();
        assert!(matches!(err, AppError::BackupFailed { .. }));
    }
}
