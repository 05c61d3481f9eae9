//! Shell-level control of the wallpaper renderer.

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::{debug, info, warn};

use crate::{error::AppError, external::ProcessController};

#[derive(Debug, Clone)]
pub struct ShellProcessController {
    binary: String,
    prop_dir: PathBuf,
    prop_prefix: String,
    /// Start the renderer as this user (the invoking user under sudo).
    run_as: Option<String>,
}

impl ShellProcessController {
    pub fn new(
        binary: impl Into<String>,
        prop_dir: impl Into<PathBuf>,
        prop_prefix: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            prop_dir: prop_dir.into(),
            prop_prefix: prop_prefix.into(),
            run_as: std::env::var("SUDO_USER").ok().filter(|u| !u.is_empty()),
        }
    }

    pub fn with_run_as(mut self, user: Option<String>) -> Self {
        self.run_as = user;
        self
    }

    fn launch_command(&self, monitor: &str) -> Command {
        let mut cmd = match &self.run_as {
            Some(user) => {
                let mut cmd = Command::new("sudo");
                cmd.args(["-u", user.as_str(), "nohup", self.binary.as_str()]);
                cmd
            }
            None => {
                let mut cmd = Command::new("nohup");
                cmd.arg(&self.binary);
                cmd
            }
        };
        cmd.arg(monitor)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // keep our Ctrl-C away from the renderer
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

/// Monitor indices with a properties file in `dir`, sorted.
pub fn configured_monitors(dir: &Path, prefix: &str) -> Result<Vec<String>, AppError> {
    let mut monitors: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|name| {
            name.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(".prop"))
                .filter(|monitor| !monitor.is_empty())
                .map(str::to_string)
        })
        .collect();
    monitors.sort();
    Ok(monitors)
}

impl ProcessController for ShellProcessController {
    fn stop(&self) -> Result<(), AppError> {
        info!("Killing any running instances of {}", self.binary);
        let output = Command::new("killall").arg(&self.binary).output()?;
        if !output.status.success() {
            // killall exits non-zero when nothing was running
            debug!(
                "killall {} exited with {:?}: {}",
                self.binary,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    fn start(&self) -> Result<(), AppError> {
        let monitors = configured_monitors(&self.prop_dir, &self.prop_prefix)?;
        if monitors.is_empty() {
            warn!(
                "No {}N.prop files in {}, nothing to start",
                self.prop_prefix,
                self.prop_dir.display()
            );
            return Ok(());
        }

        for monitor in &monitors {
            info!("Starting {} for monitor {}", self.binary, monitor);
            self.launch_command(monitor)
                .spawn()
                .map_err(|e| AppError::Io(e).with_context(format!("start {} {}", self.binary, monitor)))?;
        }
        Ok(())
    }
}
