//! Dependency installation into the staging directory.
//!
//! The package manager runs with the staging directory as its working
//! directory, so `node_modules` lands inside the bundle. Afterwards the
//! installed tree is pruned of documentation and test files.

use crate::command::{CommandExecutor, failure_detail};
use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::prune::{PrunePatterns, PruneReport, prune_tree};
use crate::stager::Stager;
use crate::workdir::ScopedCurrentDir;

/// Installs production dependencies into staging and prunes them.
///
/// The dependency manifest is copied into staging first, even if the source
/// allow-list already did so. The working directory is restored before this
/// function returns, whether or not the install succeeded.
///
/// # Errors
///
/// Returns [`BuildError::StagingFailed`] when the dependency manifest is
/// missing, [`BuildError::WorkDir`] when staging cannot be entered, and
/// [`BuildError::DependencyInstall`] when the package manager cannot be
/// spawned or exits non-zero.
pub fn install_dependencies(
    executor: &dyn CommandExecutor,
    config: &BuildConfig,
    stager: &Stager,
) -> Result<PruneReport> {
    if !stager.copy_file(&config.dependency_manifest)? {
        return Err(BuildError::StagingFailed {
            reason: format!(
                "{} not found in {}",
                config.dependency_manifest,
                stager.work_dir()
            ),
        });
    }

    run_install(executor, config, stager)?;

    let patterns =
        PrunePatterns::new(&config.prune_patterns).map_err(|e| BuildError::InvalidConfig {
            path: stager.work_dir().join(crate::config::CONFIG_FILE_NAME),
            reason: e.to_string(),
        })?;
    let report = prune_tree(
        &stager.staging_path().join(&config.dependency_dir),
        &patterns,
    );
    if !report.failures.is_empty() {
        log::debug!(
            "{} dependency entries could not be pruned",
            report.failures.len()
        );
    }
    Ok(report)
}

fn run_install(
    executor: &dyn CommandExecutor,
    config: &BuildConfig,
    stager: &Stager,
) -> Result<()> {
    let tool = &config.package_manager.command;
    let args: Vec<&str> = config
        .package_manager
        .install_args
        .iter()
        .map(String::as_str)
        .collect();

    let _cwd = ScopedCurrentDir::enter(stager.staging_path())?;
    let output = executor
        .run_streaming(tool, &args)
        .map_err(|e| BuildError::DependencyInstall {
            tool: tool.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(BuildError::DependencyInstall {
            tool: tool.clone(),
            message: failure_detail(&output),
        });
    }

    Ok(())
}
