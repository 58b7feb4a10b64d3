//! Staging directory management.
//!
//! The bundle is assembled in a directory next to the sources before it is
//! archived. Every run starts from a clean slate: the previous staging
//! directory and archive are removed first.

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Files copied into staging and files skipped because they were absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    /// Names copied into the staging root.
    pub copied: Vec<String>,
    /// Names not present in the working directory.
    pub skipped: Vec<String>,
}

/// Handles the staging directory and the output archive location.
#[derive(Debug, Clone)]
pub struct Stager {
    work_dir: Utf8PathBuf,
    staging_dir: Utf8PathBuf,
    archive_path: Utf8PathBuf,
}

impl Stager {
    /// Create a stager rooted at `work_dir`.
    #[must_use]
    pub fn new(work_dir: &Utf8Path, staging_name: &str, archive_name: &str) -> Self {
        Self {
            work_dir: work_dir.to_owned(),
            staging_dir: work_dir.join(staging_name),
            archive_path: work_dir.join(archive_name),
        }
    }

    /// Create a stager using the names from `config`.
    #[must_use]
    pub fn from_config(work_dir: &Utf8Path, config: &BuildConfig) -> Self {
        Self::new(work_dir, &config.staging_dir, &config.archive_name)
    }

    /// Remove any previous staging directory and archive.
    ///
    /// Safe to call when neither exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing artefact cannot be removed.
    pub fn clean(&self) -> Result<()> {
        ignore_not_found(fs::remove_dir_all(&self.staging_dir)).map_err(|e| {
            BuildError::StagingFailed {
                reason: format!("failed to remove {}: {e}", self.staging_dir),
            }
        })?;
        ignore_not_found(fs::remove_file(&self.archive_path)).map_err(|e| {
            BuildError::StagingFailed {
                reason: format!("failed to remove {}: {e}", self.archive_path),
            }
        })?;
        Ok(())
    }

    /// Create the staging directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.staging_dir).map_err(|e| BuildError::StagingFailed {
            reason: format!("failed to create {}: {e}", self.staging_dir),
        })
    }

    /// Copy a single file from the working directory into the staging root.
    ///
    /// Returns `false` without error when the source does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be copied.
    pub fn copy_file(&self, name: &str) -> Result<bool> {
        let source = self.work_dir.join(name);
        if !source.is_file() {
            return Ok(false);
        }

        let file_name = source.file_name().unwrap_or(name);
        let dest = self.staging_dir.join(file_name);
        copy_preserving_mtime(&source, &dest).map_err(|e| BuildError::StagingFailed {
            reason: format!("failed to copy {source} to {dest}: {e}"),
        })?;
        Ok(true)
    }

    /// Copy each allow-listed file that exists, skipping the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be copied.
    pub fn copy_sources(&self, names: &[String]) -> Result<CopyReport> {
        let mut report = CopyReport::default();
        for name in names {
            if self.copy_file(name)? {
                report.copied.push(name.clone());
            } else {
                log::debug!("{name} not found in {}; skipping", self.work_dir);
                report.skipped.push(name.clone());
            }
        }
        Ok(report)
    }

    /// Delete the staging directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn remove_staging(&self) -> Result<()> {
        fs::remove_dir_all(&self.staging_dir).map_err(|e| BuildError::StagingFailed {
            reason: format!("failed to remove {}: {e}", self.staging_dir),
        })
    }

    /// The working directory sources are copied from.
    #[must_use]
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work_dir
    }

    /// Full path of the staging directory.
    #[must_use]
    pub fn staging_path(&self) -> &Utf8Path {
        &self.staging_dir
    }

    /// Full path of the output archive.
    #[must_use]
    pub fn archive_path(&self) -> &Utf8Path {
        &self.archive_path
    }
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Copy `source` to `dest`, carrying the modification time over when the
/// platform allows it.
fn copy_preserving_mtime(source: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    fs::copy(source, dest)?;
    let modified = fs::metadata(source)?.modified();
    if let Ok(mtime) = modified {
        if let Err(e) = fs::File::options()
            .write(true)
            .open(dest)
            .and_then(|f| f.set_modified(mtime))
        {
            log::trace!("could not preserve mtime on {dest}: {e}");
        }
    }
    Ok(())
}
