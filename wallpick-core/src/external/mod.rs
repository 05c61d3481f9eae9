//! Collaborators outside the picker: the renderer's properties file, the
//! renderer process itself, asset creation and the system clipboard.
//!
//! The live loop and edit mode only talk to these traits, so tests swap in
//! in-memory versions.

pub mod assets;
pub mod backup;
pub mod clipboard;
pub mod process;
pub mod prop_config;

use std::path::{Path, PathBuf};

use crate::error::AppError;

pub use assets::DateTimeOverlay;

/// Reads and writes the name of the wallpaper the renderer shows.
pub trait ActiveItemStore {
    /// `None` when the properties file is missing or has no name line.
    fn active_name(&self) -> Result<Option<String>, AppError>;

    fn set_active_name(&self, name: &str) -> Result<(), AppError>;
}

/// Stops and starts the wallpaper renderer. Fire-and-forget: neither call
/// waits for the renderer to settle.
pub trait ProcessController {
    fn stop(&self) -> Result<(), AppError>;

    fn start(&self) -> Result<(), AppError>;
}

pub trait AssetCreator {
    /// Build a new catalog folder from a media file. Returns the folder.
    fn create_from_media(
        &self,
        source: &Path,
        name: &str,
        overlay: &DateTimeOverlay,
    ) -> Result<PathBuf, AppError>;
}

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), AppError>;
}

/// The full set of collaborators one session works with.
pub struct Externals {
    pub store: Box<dyn ActiveItemStore>,
    pub process: Box<dyn ProcessController>,
    pub assets: Box<dyn AssetCreator>,
    pub clipboard: Box<dyn Clipboard>,
}

#[cfg(test)]
pub mod testing {
    //! In-memory collaborators shared by controller and prompt tests.

    use std::{
        cell::RefCell,
        path::{Path, PathBuf},
        rc::Rc,
    };

    use super::*;

    /// Ordered record of every collaborator call.
    pub type CallLog = Rc<RefCell<Vec<String>>>;

    pub struct MemoryStore {
        pub name: Rc<RefCell<Option<String>>>,
        pub log: CallLog,
    }

    impl ActiveItemStore for MemoryStore {
        fn active_name(&self) -> Result<Option<String>, AppError> {
            Ok(self.name.borrow().clone())
        }

        fn set_active_name(&self, name: &str) -> Result<(), AppError> {
            self.log.borrow_mut().push(format!("set:{name}"));
            *self.name.borrow_mut() = Some(name.to_string());
            Ok(())
        }
    }

    pub struct RecordingProcess {
        pub log: CallLog,
        pub fail_stop: bool,
    }

    impl ProcessController for RecordingProcess {
        fn stop(&self) -> Result<(), AppError> {
            self.log.borrow_mut().push("stop".into());
            if self.fail_stop {
                return Err(AppError::Other("killall exploded".into()));
            }
            Ok(())
        }

        fn start(&self) -> Result<(), AppError> {
            self.log.borrow_mut().push("start".into());
            Ok(())
        }
    }

    /// Creates the folder only, no media work.
    pub struct FolderAssets {
        pub root: PathBuf,
        pub log: CallLog,
    }

    impl AssetCreator for FolderAssets {
        fn create_from_media(
            &self,
            source: &Path,
            name: &str,
            overlay: &DateTimeOverlay,
        ) -> Result<PathBuf, AppError> {
            self.log.borrow_mut().push(format!(
                "create:{}:{}:{}",
                name,
                source.display(),
                overlay.visible
            ));
            let folder = self.root.join(name);
            std::fs::create_dir_all(&folder)?;
            Ok(folder)
        }
    }

    pub struct MemoryClipboard {
        pub copied: Rc<RefCell<Vec<String>>>,
        pub available: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn copy(&self, text: &str) -> Result<(), AppError> {
            if !self.available {
                return Err(AppError::tool_missing("clipboard tool", "Copy the path manually."));
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    pub struct Harness {
        pub log: CallLog,
        pub active: Rc<RefCell<Option<String>>>,
        pub copied: Rc<RefCell<Vec<String>>>,
        pub clipboard_available: bool,
    }

    impl Harness {
        pub fn new(active: Option<&str>) -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                active: Rc::new(RefCell::new(active.map(str::to_string))),
                copied: Rc::new(RefCell::new(Vec::new())),
                clipboard_available: true,
            }
        }

        pub fn externals(&self, catalog_root: &Path) -> Externals {
            Externals {
                store: Box::new(MemoryStore {
                    name: self.active.clone(),
                    log: self.log.clone(),
                }),
                process: Box::new(RecordingProcess {
                    log: self.log.clone(),
                    fail_stop: false,
                }),
                assets: Box::new(FolderAssets {
                    root: catalog_root.to_path_buf(),
                    log: self.log.clone(),
                }),
                clipboard: Box::new(MemoryClipboard {
                    copied: self.copied.clone(),
                    available: self.clipboard_available,
                }),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }
}
