//! Error types for the DXT bundler.
//!
//! Every variant is terminal for a build: the pipeline stops at the first
//! error and the binary exits with a non-zero status. Variants carry enough
//! context (paths, tool names, parser messages) for the operator to fix the
//! problem without re-running with extra diagnostics.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building a DXT package.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The JavaScript runtime could not be found on `PATH`.
    #[error("{runtime} is required but was not found; install it from {install_hint}")]
    RuntimeMissing {
        /// Command used to check for the runtime.
        runtime: String,
        /// Where the operator can obtain the runtime.
        install_hint: String,
    },

    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    ManifestUnreadable {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid JSON.
    #[error("manifest {path} is not valid JSON: {source}")]
    ManifestMalformed {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The JSON parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest parsed, but its top-level value is not a JSON object.
    #[error("manifest {path} must contain a JSON object")]
    ManifestNotObject {
        /// Path to the manifest.
        path: Utf8PathBuf,
    },

    /// A required manifest key is absent.
    #[error("manifest is missing required field: {field}")]
    ManifestMissingField {
        /// The first required key found missing.
        field: &'static str,
    },

    /// The build configuration file is missing or invalid.
    #[error("invalid configuration {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// Assembling the staging directory failed.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// The package manager failed to install dependencies.
    #[error("failed to install dependencies with {tool}: {message}")]
    DependencyInstall {
        /// The package manager command.
        tool: String,
        /// Stderr of the failed command, or its exit status.
        message: String,
    },

    /// Writing the zip archive failed.
    #[error("failed to write archive {path}: {source}")]
    Archive {
        /// Path of the archive being written.
        path: Utf8PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// A working directory could not be resolved or entered.
    #[error("working directory {path} is unusable: {source}")]
    WorkDir {
        /// The directory that could not be used.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;
