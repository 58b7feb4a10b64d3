//! Best-effort pruning of installed dependencies.
//!
//! Package managers install READMEs, changelogs, test suites, and CI
//! configuration alongside the code a package needs at runtime. None of it is
//! required inside a DXT bundle, so entries whose file name matches one of
//! the configured globs are deleted. A failed deletion only makes the archive
//! larger, so failures are collected in the [`PruneReport`] instead of being
//! returned as errors.

use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Compiled file-name globs.
#[derive(Debug, Clone)]
pub struct PrunePatterns {
    patterns: Vec<Pattern>,
}

impl PrunePatterns {
    /// Compiles the given globs.
    ///
    /// # Errors
    ///
    /// Returns the first [`glob::PatternError`] encountered.
    ///
    /// # Examples
    ///
    /// ```
    /// use dxt_bundler::prune::PrunePatterns;
    ///
    /// let patterns = PrunePatterns::new(["*.md", "tests"])?;
    /// assert!(patterns.matches("CHANGELOG.md"));
    /// assert!(patterns.matches("tests"));
    /// assert!(!patterns.matches("index.js"));
    /// # Ok::<(), glob::PatternError>(())
    /// ```
    pub fn new<I, S>(globs: I) -> Result<Self, glob::PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = globs
            .into_iter()
            .map(|glob| Pattern::new(glob.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns `true` when `file_name` matches any pattern.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }
}

/// A deletion that failed and was skipped.
#[derive(Debug)]
pub struct PruneFailure {
    /// The entry that could not be removed.
    pub path: Utf8PathBuf,
    /// Why the removal failed.
    pub error: io::Error,
}

/// Summary of a pruning pass.
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Entries deleted, directories counted once.
    pub removed: Vec<Utf8PathBuf>,
    /// Entries that matched but could not be deleted.
    pub failures: Vec<PruneFailure>,
}

impl PruneReport {
    /// Returns `true` when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.failures.is_empty()
    }
}

/// Removes every entry under `root` whose file name matches `patterns`.
///
/// Matching directories are removed recursively and not descended into.
/// Files and symlinks are unlinked individually. `root` itself is never
/// matched, and a missing `root` yields an empty report. This function does
/// not fail; entries that cannot be read or removed end up in
/// [`PruneReport::failures`].
pub fn prune_tree(root: &Utf8Path, patterns: &PrunePatterns) -> PruneReport {
    let mut report = PruneReport::default();
    if !root.as_std_path().is_dir() {
        log::debug!("{root} does not exist; nothing to prune");
        return report;
    }

    let mut entries = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = entries.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| root.to_owned(), lossy_utf8);
                log::debug!("skipping unreadable entry {path}: {err}");
                report.failures.push(PruneFailure {
                    path,
                    error: err.into(),
                });
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        if !patterns.matches(&name) {
            continue;
        }

        let path = lossy_utf8(entry.path());
        let is_dir = entry.file_type().is_dir();
        if is_dir {
            entries.skip_current_dir();
        }

        let removal = if is_dir {
            fs::remove_dir_all(entry.path())
        } else {
            fs::remove_file(entry.path())
        };

        match removal {
            Ok(()) => {
                log::trace!("pruned {path}");
                report.removed.push(path);
            }
            Err(error) => {
                log::debug!("failed to prune {path}: {error}");
                report.failures.push(PruneFailure { path, error });
            }
        }
    }

    report
}

fn lossy_utf8(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from(path.to_string_lossy().into_owned())
}
