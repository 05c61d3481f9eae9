//! Plain-text list files: UTF-8, one entry per line, no header, no escaping.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use tracing::warn;

use crate::error::AppError;

/// Create an empty list file (and its folder) when missing.
pub fn ensure_list_file(path: &Path) -> Result<(), AppError> {
    if path.exists() {
        return Ok(());
    }
    warn!("Could not find list file at {}. Creating it.", path.display());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path)?;
    Ok(())
}

/// Lines without their terminators; `\r\n` endings are accepted.
pub fn read_lines(path: &Path) -> Result<Vec<String>, AppError> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), AppError> {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}

/// Append one line, repairing a missing trailing newline first.
pub fn append_line(path: &Path, line: &str) -> Result<(), AppError> {
    let needs_separator = fs::read(path)
        .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
        .unwrap_or(false);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_separator {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{line}")?;
    Ok(())
}
