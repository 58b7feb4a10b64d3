//! Command-line argument definitions for `dxt-build`.
//!
//! Running the binary without arguments builds the package from the current
//! directory; every flag is optional.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build a DXT extension package.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "dxt-build")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a DXT extension package.\n\n",
    "Validates manifest.json, copies the server sources into a staging ",
    "directory, installs production dependencies with npm, strips ",
    "documentation and tests from node_modules, and zips the result into ",
    "a .dxt archive that the desktop application can install.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build from the current directory:\n",
    "    $ dxt-build\n\n",
    "  Build another checkout and keep the staging directory:\n",
    "    $ dxt-build -C ../libralm-mcp --keep-staging\n\n",
    "Settings are read from dxt-build.toml in the working directory when present.",
))]
pub struct Cli {
    /// Directory containing manifest.json [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<Utf8PathBuf>,

    /// Configuration file [default: dxt-build.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Suppress progress output (errors and the final summary still shown).
    #[arg(short, long)]
    pub quiet: bool,

    /// Leave the staging directory in place after a successful build.
    #[arg(long)]
    pub keep_staging: bool,
}
