//! System clipboard through whichever command-line tool is installed.

use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use tracing::{debug, info};

use crate::{error::AppError, external::Clipboard};

/// Tried in order; the first one on PATH wins.
#[cfg(not(windows))]
const CANDIDATES: &[(&str, &[&str])] = &[
    ("clipboard", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("pbcopy", &[]),
];

#[cfg(windows)]
const CANDIDATES: &[(&str, &[&str])] = &[("clip", &[])];

const INSTALL_HINT: &str =
    "Install one (xclip, clipboard, pbcopy on mac) or copy the path manually from the terminal.";

#[derive(Debug, Clone, Default)]
pub struct SystemClipboard {
    /// Run the tool as this user so it reaches their display session.
    run_as: Option<String>,
}

impl SystemClipboard {
    pub fn new(run_as: Option<String>) -> Self {
        Self { run_as }
    }

    fn find_tool() -> Option<(PathBuf, &'static [&'static str])> {
        CANDIDATES.iter().find_map(|(tool, args)| {
            which::which(tool)
                .ok()
                .map(|path| (path, *args))
        })
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), AppError> {
        let (tool, args) =
            Self::find_tool().ok_or_else(|| AppError::tool_missing("clipboard tool", INSTALL_HINT))?;
        debug!("Using clipboard tool {}", tool.display());

        let mut cmd = match &self.run_as {
            Some(user) if cfg!(unix) => {
                let mut cmd = Command::new("sudo");
                cmd.args(["-u", user.as_str()]).arg(&tool);
                cmd
            }
            _ => Command::new(&tool),
        };
        let mut child = cmd
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(text.as_bytes())?;
        }
        // close stdin so the tool sees EOF
        drop(child.stdin.take());

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(AppError::external_cmd(tool.display().to_string(), &output));
        }
        info!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }
}
