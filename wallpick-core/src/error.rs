//! src/error.rs
//! ============================================================================
//! # AppError: Unified Error Type for the Wallpaper Picker
//!
//! Every fallible library operation returns `Result<T, AppError>`. Most
//! variants are recoverable and end up as a notification in the live view
//! or a message in edit mode; only a missing catalog root, an interrupt and
//! a declined destructive confirmation terminate the process.

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config write error: {0}")]
    ConfigSer(#[from] toml::ser::Error),

    /// The wallpaper catalog root does not exist. Fatal.
    #[error("Catalog directory not found: {0:?}")]
    CatalogMissing(PathBuf),

    /// A persisted list references an item that is not in the catalog.
    #[error("'{name}' in {list:?} does not exist in the catalog")]
    Integrity { list: PathBuf, name: String },

    /// Selection attempted on an empty result list.
    #[error("Results are empty, nothing to select from")]
    NoResults,

    #[error("'{0}' is already in favorites")]
    AlreadyFavorite(String),

    #[error("'{0}' is not in favorites")]
    NotFavorite(String),

    /// Rejected user input (empty, duplicate or illegal name, bad path...).
    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    /// External process/command failure (ffmpeg, killall...).
    #[error("External command failed: {cmd} (exit code: {code:?})\n{stderr}")]
    ExternalCmd {
        cmd: String,
        code: Option<i32>,
        stderr: String,
    },

    /// No usable external tool was found on PATH.
    #[error("No {tool} found. {hint}")]
    ExternalToolMissing { tool: String, hint: String },

    #[error("Could not back up '{name}' into {dest:?}: {reason}")]
    BackupFailed {
        name: String,
        dest: PathBuf,
        reason: String,
    },

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Operation cancelled by user or system.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an external command failure from a finished process
    pub fn external_cmd<S: Into<String>>(cmd: S, output: &std::process::Output) -> Self {
        Self::ExternalCmd {
            cmd: cmd.into(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    pub fn tool_missing<S1: Into<String>, S2: Into<String>>(tool: S1, hint: S2) -> Self {
        Self::ExternalToolMissing {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    pub fn backup_failed<S1, P, S2>(name: S1, dest: P, reason: S2) -> Self
    where
        S1: Into<String>,
        P: Into<PathBuf>,
        S2: Into<String>,
    {
        Self::BackupFailed {
            name: name.into(),
            dest: dest.into(),
            reason: reason.into(),
        }
    }

    /// Whether the process must stop when this error reaches the top level.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CatalogMissing(_) | Self::Cancelled)
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
