//! Build pipeline orchestration.
//!
//! A build is an ordered list of [`Stage`]s. Each stage either succeeds and
//! records what it did in the [`BuildReport`], or fails and stops the
//! pipeline; the error is returned unchanged so the caller can map it to an
//! exit status. Nothing is retried and nothing is rolled back: a failure
//! after staging has started leaves the staging directory in place for
//! inspection.

use crate::archive::{ArchiveSummary, create_archive};
use crate::command::CommandExecutor;
use crate::config::BuildConfig;
use crate::deps::install_dependencies;
use crate::error::{BuildError, Result};
use crate::manifest::{Manifest, validate_manifest};
use crate::output::{install_instructions, success_message, write_stderr_line};
use crate::prereq::{RuntimeStatus, check_runtime};
use crate::stager::{CopyReport, Stager};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// One step of the build, in execution order.
///
/// Stages compare in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Check for the JavaScript runtime.
    CheckRuntime,
    /// Parse and validate the manifest.
    ValidateManifest,
    /// Remove the previous staging directory and archive.
    Clean,
    /// Create the staging directory.
    CreateStaging,
    /// Copy allow-listed sources into staging.
    CopySources,
    /// Install and prune production dependencies.
    InstallDependencies,
    /// Zip the staging directory.
    Archive,
    /// Remove the staging directory.
    RemoveStaging,
    /// Print the result and installation instructions.
    Summarise,
}

/// Every stage of a build, in order.
pub const STAGES: [Stage; 9] = [
    Stage::CheckRuntime,
    Stage::ValidateManifest,
    Stage::Clean,
    Stage::CreateStaging,
    Stage::CopySources,
    Stage::InstallDependencies,
    Stage::Archive,
    Stage::RemoveStaging,
    Stage::Summarise,
];

/// Switches that alter pipeline behaviour without changing its stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Suppress per-stage progress lines.
    pub quiet: bool,
    /// Leave the staging directory in place after archiving.
    pub keep_staging: bool,
}

/// What a build did, filled in stage by stage.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Version reported by the runtime.
    pub runtime_version: Option<String>,
    /// The validated manifest.
    pub manifest: Option<Manifest>,
    /// Sources copied into staging.
    pub sources: CopyReport,
    /// Dependency entries removed by pruning.
    pub pruned: Vec<Utf8PathBuf>,
    /// Dependency entries that matched but could not be removed.
    pub prune_failures: usize,
    /// The written archive.
    pub archive: Option<ArchiveSummary>,
    /// The last stage that completed.
    pub completed: Option<Stage>,
}

impl BuildReport {
    /// True once this build has created its own staging directory.
    ///
    /// A staging directory found before that point was left by an earlier
    /// run.
    #[must_use]
    pub fn staging_created(&self) -> bool {
        self.completed >= Some(Stage::CreateStaging)
    }
}

/// Runs the build stages against a working directory.
pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    executor: &'a dyn CommandExecutor,
    stager: Stager,
    manifest_path: Utf8PathBuf,
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline for a build rooted at `work_dir`.
    ///
    /// `work_dir` should be absolute: the working directory changes while
    /// dependencies are installed.
    #[must_use]
    pub fn new(
        work_dir: &Utf8Path,
        config: &'a BuildConfig,
        executor: &'a dyn CommandExecutor,
        options: PipelineOptions,
    ) -> Self {
        Self {
            config,
            executor,
            stager: Stager::from_config(work_dir, config),
            manifest_path: config.manifest_path(work_dir),
            options,
        }
    }

    /// The stager used for the build.
    #[must_use]
    pub const fn stager(&self) -> &Stager {
        &self.stager
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn run(&self, stderr: &mut dyn Write) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        self.run_into(&mut report, stderr)?;
        Ok(report)
    }

    /// Run every stage in order, recording progress in `report`.
    ///
    /// On failure `report.completed` names the last stage that finished, so
    /// the caller can tell how far the build got.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn run_into(&self, report: &mut BuildReport, stderr: &mut dyn Write) -> Result<()> {
        for stage in STAGES {
            self.run_stage(stage, report, stderr).inspect_err(|err| {
                log::debug!("stage {stage:?} failed: {err}");
            })?;
            report.completed = Some(stage);
        }
        Ok(())
    }

    fn run_stage(
        &self,
        stage: Stage,
        report: &mut BuildReport,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        match stage {
            Stage::CheckRuntime => self.check_runtime(report, stderr),
            Stage::ValidateManifest => self.validate_manifest(report, stderr),
            Stage::Clean => {
                self.progress(stderr, "Cleaning previous build...");
                self.stager.clean()
            }
            Stage::CreateStaging => {
                self.progress(
                    stderr,
                    format!("Creating staging directory {}...", self.stager.staging_path()),
                );
                self.stager.prepare()
            }
            Stage::CopySources => self.copy_sources(report, stderr),
            Stage::InstallDependencies => self.install_dependencies(report, stderr),
            Stage::Archive => {
                self.progress(
                    stderr,
                    format!("Creating {}...", self.stager.archive_path()),
                );
                let summary =
                    create_archive(self.stager.staging_path(), self.stager.archive_path())?;
                report.archive = Some(summary);
                Ok(())
            }
            Stage::RemoveStaging => {
                if self.options.keep_staging {
                    self.progress(
                        stderr,
                        format!("Keeping staging directory {}", self.stager.staging_path()),
                    );
                    return Ok(());
                }
                self.progress(stderr, "Removing staging directory...");
                self.stager.remove_staging()
            }
            Stage::Summarise => {
                self.summarise(report, stderr);
                Ok(())
            }
        }
    }

    fn check_runtime(&self, report: &mut BuildReport, stderr: &mut dyn Write) -> Result<()> {
        let runtime = &self.config.runtime;
        self.progress(stderr, format!("Checking for {}...", runtime.command));
        match check_runtime(self.executor, &runtime.command) {
            RuntimeStatus::Found { version } => {
                self.progress(stderr, format!("  {} {version} found", runtime.command));
                report.runtime_version = Some(version);
                Ok(())
            }
            RuntimeStatus::Missing => Err(BuildError::RuntimeMissing {
                runtime: runtime.command.clone(),
                install_hint: runtime.install_hint.clone(),
            }),
        }
    }

    fn validate_manifest(&self, report: &mut BuildReport, stderr: &mut dyn Write) -> Result<()> {
        self.progress(stderr, format!("Validating {}...", self.config.manifest));
        let manifest = validate_manifest(&self.manifest_path)?;
        let label = match (manifest.name(), manifest.version()) {
            (Some(name), Some(version)) => format!("  manifest is valid ({name} {version})"),
            _ => "  manifest is valid".to_owned(),
        };
        self.progress(stderr, label);
        report.manifest = Some(manifest);
        Ok(())
    }

    fn copy_sources(&self, report: &mut BuildReport, stderr: &mut dyn Write) -> Result<()> {
        self.progress(stderr, "Copying source files...");
        let copied = self.stager.copy_sources(&self.config.source_files)?;
        for name in &copied.copied {
            self.progress(stderr, format!("  copied {name}"));
        }
        report.sources = copied;
        Ok(())
    }

    fn install_dependencies(
        &self,
        report: &mut BuildReport,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        self.progress(
            stderr,
            format!(
                "Installing dependencies with {}...",
                self.config.package_manager.command
            ),
        );
        let pruned = install_dependencies(self.executor, self.config, &self.stager)?;
        self.progress(
            stderr,
            format!(
                "  dependencies installed; pruned {} entries",
                pruned.removed.len()
            ),
        );
        report.prune_failures = pruned.failures.len();
        report.pruned = pruned.removed;
        Ok(())
    }

    fn summarise(&self, report: &BuildReport, stderr: &mut dyn Write) {
        write_stderr_line(stderr, "");
        if let Some(summary) = &report.archive {
            write_stderr_line(stderr, success_message(summary));
        }
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, install_instructions(&self.config.archive_name));
    }

    fn progress(&self, stderr: &mut dyn Write, message: impl std::fmt::Display) {
        if !self.options.quiet {
            write_stderr_line(stderr, message);
        }
    }
}
