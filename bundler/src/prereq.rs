//! Runtime prerequisite detection.

use crate::command::CommandExecutor;

/// Outcome of probing for the JavaScript runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// The runtime answered `--version`.
    Found {
        /// Trimmed version string reported by the runtime.
        version: String,
    },
    /// The runtime could not be spawned or exited non-zero.
    Missing,
}

impl RuntimeStatus {
    /// Returns `true` when the runtime is installed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dxt_bundler::prereq::RuntimeStatus;
    ///
    /// let found = RuntimeStatus::Found { version: "v20.11.1".to_owned() };
    /// assert!(found.is_found());
    /// assert!(!RuntimeStatus::Missing.is_found());
    /// ```
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Checks whether `runtime` is installed by running `<runtime> --version`.
///
/// Never fails: a spawn error is reported as [`RuntimeStatus::Missing`], and
/// it is up to the caller to abort the build.
pub fn check_runtime(executor: &dyn CommandExecutor, runtime: &str) -> RuntimeStatus {
    match executor.run(runtime, &["--version"]) {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            RuntimeStatus::Found { version }
        }
        Ok(output) => {
            log::debug!("{runtime} --version exited with {}", output.status);
            RuntimeStatus::Missing
        }
        Err(err) => {
            log::debug!("{runtime} --version could not be run: {err}");
            RuntimeStatus::Missing
        }
    }
}
