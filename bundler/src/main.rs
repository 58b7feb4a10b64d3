//! `dxt-build` CLI entrypoint.
//!
//! Builds a DXT package from the current directory (or `-C DIR`) and exits
//! with status 1 on any failure.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use dxt_bundler::cli::Cli;
use dxt_bundler::command::SystemCommandExecutor;
use dxt_bundler::config::BuildConfig;
use dxt_bundler::error::{BuildError, Result};
use dxt_bundler::output::write_stderr_line;
use dxt_bundler::pipeline::{BuildReport, Pipeline, PipelineOptions};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let work_dir = resolve_work_dir(cli.directory.as_deref())?;
    let config = BuildConfig::load(&work_dir, cli.config.as_deref())?;
    let options = PipelineOptions {
        quiet: cli.quiet,
        keep_staging: cli.keep_staging,
    };

    if !cli.quiet {
        write_stderr_line(stderr, format!("Building {}", config.archive_name));
        write_stderr_line(stderr, "");
    }

    let executor = SystemCommandExecutor;
    let pipeline = Pipeline::new(&work_dir, &config, &executor, options);
    let mut report = BuildReport::default();
    if let Err(err) = pipeline.run_into(&mut report, stderr) {
        report_leftover_staging(&report, pipeline.stager().staging_path(), stderr);
        return Err(err);
    }
    Ok(())
}

/// Points at the staging directory a failed build left behind.
///
/// Nothing is printed when the build failed before creating staging; any
/// directory found then belongs to an earlier run.
fn report_leftover_staging(report: &BuildReport, staging: &Utf8Path, stderr: &mut dyn Write) {
    if report.staging_created() && staging.exists() {
        write_stderr_line(stderr, format!("Staging directory left at {staging}"));
    }
}

/// Resolves the build directory to an absolute path.
///
/// The package manager runs with the staging directory as the process
/// working directory, so every path the pipeline holds must be absolute.
fn resolve_work_dir(directory: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    let requested = directory.unwrap_or_else(|| Utf8Path::new("."));
    let absolute = std::path::absolute(requested).map_err(|source| BuildError::WorkDir {
        path: requested.to_owned(),
        source,
    })?;
    if !absolute.is_dir() {
        return Err(BuildError::WorkDir {
            path: requested.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    Utf8PathBuf::try_from(absolute).map_err(|e| BuildError::WorkDir {
        path: requested.to_owned(),
        source: e.into_io_error(),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, "");
            write_stderr_line(stderr, format!("Build failed: {err}"));
            1
        }
    }
}
