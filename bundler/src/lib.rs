//! DXT bundler library.
//!
//! This crate assembles DXT extension packages: it validates the manifest,
//! stages the server sources, installs and prunes production dependencies,
//! and zips the result. It backs the `dxt-build` binary and can be driven
//! programmatically through [`pipeline::Pipeline`].
//!
//! # Modules
//!
//! - [`archive`] - Zip archive creation from the staging tree
//! - [`cli`] - Command-line argument definitions
//! - [`command`] - External command execution abstraction
//! - [`config`] - Build configuration and `dxt-build.toml` loading
//! - [`deps`] - Dependency installation inside the staging directory
//! - [`error`] - Error types for every build failure
//! - [`manifest`] - Manifest parsing and required-key validation
//! - [`output`] - Console output formatting
//! - [`pipeline`] - Ordered build stages
//! - [`prereq`] - Runtime prerequisite detection
//! - [`prune`] - Best-effort pruning of installed dependencies
//! - [`stager`] - Staging directory management
//! - [`workdir`] - Scoped working-directory changes

pub mod archive;
pub mod cli;
pub mod command;
pub mod config;
pub mod deps;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod prereq;
pub mod prune;
pub mod stager;
pub mod workdir;

#[cfg(test)]
mod test_utils;
