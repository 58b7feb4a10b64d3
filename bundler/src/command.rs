//! External command execution.
//!
//! The bundler shells out twice: once to check the runtime and once to run
//! the package manager. Both go through [`CommandExecutor`] so the pipeline
//! can be exercised without Node.js installed. The runtime check captures
//! its output; the package manager streams stdout to the terminal.

use crate::error::Result;
use std::process::{Command, Output, Stdio};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs a command to completion and returns its captured output.
    ///
    /// The command inherits the current working directory of the process.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dxt_bundler::command::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let output = SystemCommandExecutor.run("node", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), dxt_bundler::error::BuildError>(())
    /// ```
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output>;

    /// Runs a command to completion with stdout passed through to the
    /// terminal.
    ///
    /// Only stderr is captured; the returned `stdout` is empty.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    fn run_streaming<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        log::debug!("running {cmd} {}", args.join(" "));
        let output = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        log::trace!("{cmd} exited with {}", output.status);
        Ok(output)
    }

    fn run_streaming(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        log::debug!("running {cmd} {} (streaming stdout)", args.join(" "));
        let output = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()?;
        log::trace!("{cmd} exited with {}", output.status);
        Ok(output)
    }
}

/// Returns the trimmed stderr of a failed command, falling back to its exit
/// status when stderr is empty.
#[must_use]
pub fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("command exited with {}", output.status)
    } else {
        trimmed.to_owned()
    }
}
