//! Build configuration.
//!
//! `BuildConfig` captures every name, command, and pattern the pipeline
//! relies on. The defaults reproduce the LibraLM bundle layout, so a checkout
//! without `dxt-build.toml` builds exactly as before. When the file is
//! present, values are deserialised from it and omitted keys fall back to the
//! defaults.

use crate::error::{BuildError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "dxt-build.toml";

/// Settings for a DXT build.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// File name of the archive written to the working directory.
    pub archive_name: String,
    /// Name of the staging directory created in the working directory.
    pub staging_dir: String,
    /// Path of the manifest relative to the working directory.
    pub manifest: String,
    /// Dependency manifest copied into staging before installation.
    pub dependency_manifest: String,
    /// Directory, relative to staging, that the package manager populates.
    pub dependency_dir: String,
    /// Allow-list of files copied from the working directory into staging.
    pub source_files: Vec<String>,
    /// File-name globs removed from the installed dependency tree.
    pub prune_patterns: Vec<String>,
    /// Runtime prerequisite.
    pub runtime: RuntimeConfig,
    /// Package manager used to install dependencies.
    pub package_manager: PackageManagerConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            archive_name: "libralm.dxt".to_owned(),
            staging_dir: "bundle".to_owned(),
            manifest: "manifest.json".to_owned(),
            dependency_manifest: "package.json".to_owned(),
            dependency_dir: "node_modules".to_owned(),
            source_files: to_owned_list(&[
                "manifest.json",
                "libralm_mcp_server.js",
                "package.json",
                "LICENSE",
                "README.md",
                "icon.png",
            ]),
            prune_patterns: to_owned_list(&[
                "*.md", "*.txt", "test", "tests", "example", "examples", ".github",
            ]),
            runtime: RuntimeConfig::default(),
            package_manager: PackageManagerConfig::default(),
        }
    }
}

/// The runtime whose presence is checked before building.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Executable run with `--version`.
    pub command: String,
    /// Shown to the operator when the runtime is missing.
    pub install_hint: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: "node".to_owned(),
            install_hint: "https://nodejs.org/".to_owned(),
        }
    }
}

/// The package manager invoked inside the staging directory.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageManagerConfig {
    /// Executable name.
    pub command: String,
    /// Arguments for a production-only install.
    pub install_args: Vec<String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            command: "npm".to_owned(),
            install_args: to_owned_list(&["install", "--production"]),
        }
    }
}

impl BuildConfig {
    /// Loads the configuration for a build rooted at `work_dir`.
    ///
    /// An explicit path must exist. Without one, `dxt-build.toml` in
    /// `work_dir` is used when present and the defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] when the file cannot be read or
    /// parsed, when a staging, archive, or dependency name is not a single
    /// path component, or when a prune pattern is not a valid glob.
    pub fn load(work_dir: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => work_dir.join(path),
            None => {
                let candidate = work_dir.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("no {CONFIG_FILE_NAME} in {work_dir}; using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let contents = fs::read_to_string(&path).map_err(|e| invalid(&path, e))?;
        let config = Self::from_toml(&path, &contents)?;
        log::debug!("loaded build configuration from {path}");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] on parse or validation failure.
    pub fn from_toml(path: &Utf8Path, contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| invalid(path, e))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Utf8Path) -> Result<()> {
        for (key, value) in [
            ("archive_name", &self.archive_name),
            ("staging_dir", &self.staging_dir),
            ("manifest", &self.manifest),
            ("dependency_manifest", &self.dependency_manifest),
            ("runtime.command", &self.runtime.command),
            ("package_manager.command", &self.package_manager.command),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(path, format!("{key} must not be empty")));
            }
        }

        for (key, value) in [
            ("archive_name", &self.archive_name),
            ("staging_dir", &self.staging_dir),
            ("dependency_manifest", &self.dependency_manifest),
            ("dependency_dir", &self.dependency_dir),
        ] {
            if !is_plain_name(value) {
                return Err(invalid(
                    path,
                    format!("{key} must be a single file name, got {value:?}"),
                ));
            }
        }

        if self.archive_name == self.staging_dir {
            return Err(invalid(
                path,
                "archive_name and staging_dir must differ",
            ));
        }

        for pattern in &self.prune_patterns {
            glob::Pattern::new(pattern)
                .map_err(|e| invalid(path, format!("bad prune pattern {pattern:?}: {e}")))?;
        }

        Ok(())
    }

    /// Path of the manifest for a build rooted at `work_dir`.
    #[must_use]
    pub fn manifest_path(&self, work_dir: &Utf8Path) -> Utf8PathBuf {
        work_dir.join(&self.manifest)
    }
}

fn invalid(path: &Utf8Path, reason: impl std::fmt::Display) -> BuildError {
    BuildError::InvalidConfig {
        path: path.to_owned(),
        reason: reason.to_string(),
    }
}

/// True when `value` names an entry directly inside its parent directory.
///
/// The staging directory and the dependency tree are deleted recursively, so
/// `.`, `..`, absolute paths, and nested paths are never accepted.
fn is_plain_name(value: &str) -> bool {
    let mut components = Utf8Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    )
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
