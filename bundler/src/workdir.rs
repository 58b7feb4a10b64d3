//! Scoped changes of the process working directory.
//!
//! The package manager must run inside the staging directory. The working
//! directory is process-global, so it is only ever changed through
//! [`ScopedCurrentDir`], which puts the previous directory back when dropped.

use crate::error::{BuildError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::path::PathBuf;

/// Changes the working directory for as long as the guard lives.
///
/// The original directory is restored in `Drop`, so early returns, `?`
/// propagation, and unwinding panics all leave the process where it started.
#[derive(Debug)]
#[must_use = "the working directory is restored as soon as the guard is dropped"]
pub struct ScopedCurrentDir {
    original: PathBuf,
}

impl ScopedCurrentDir {
    /// Enters `dir`, remembering the current working directory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::WorkDir`] when the current directory cannot be
    /// determined or `dir` cannot be entered. The working directory is
    /// unchanged in that case.
    pub fn enter(dir: &Utf8Path) -> Result<Self> {
        let original = env::current_dir().map_err(|source| BuildError::WorkDir {
            path: Utf8PathBuf::from("."),
            source,
        })?;
        env::set_current_dir(dir).map_err(|source| BuildError::WorkDir {
            path: dir.to_owned(),
            source,
        })?;
        log::trace!("entered {dir} from {}", original.display());
        Ok(Self { original })
    }
}

impl Drop for ScopedCurrentDir {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.original) {
            log::warn!(
                "failed to restore working directory {}: {err}",
                self.original.display()
            );
        } else {
            log::trace!("restored working directory {}", self.original.display());
        }
    }
}
