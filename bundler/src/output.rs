//! Console output for the bundler CLI.
//!
//! Progress and results are written to an injected sink so the pipeline can
//! be tested without capturing the real stderr.

use crate::archive::ArchiveSummary;
use std::io::Write;

const BYTES_PER_MEBIBYTE: u64 = 1024 * 1024;

/// Writes one line, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Formats a byte count as mebibytes with two decimals.
///
/// # Examples
///
/// ```
/// use dxt_bundler::output::format_mebibytes;
///
/// assert_eq!(format_mebibytes(1_572_864), "1.50 MB");
/// assert_eq!(format_mebibytes(0), "0.00 MB");
/// ```
#[must_use]
pub fn format_mebibytes(bytes: u64) -> String {
    let hundredths = (u128::from(bytes) * 100 + u128::from(BYTES_PER_MEBIBYTE) / 2)
        / u128::from(BYTES_PER_MEBIBYTE);
    format!("{}.{:02} MB", hundredths / 100, hundredths % 100)
}

/// Format the message printed once the archive is written.
#[must_use]
pub fn success_message(summary: &ArchiveSummary) -> String {
    let name = summary.path.file_name().unwrap_or(summary.path.as_str());
    format!(
        "Created {name} ({}, {} files)",
        format_mebibytes(summary.size_bytes),
        summary.entries
    )
}

/// Steps for installing the package in the desktop application.
#[must_use]
pub fn install_instructions(archive_name: &str) -> String {
    format!(
        concat!(
            "To install in Claude Desktop:\n",
            "1. Open Claude Desktop\n",
            "2. Go to Settings > Extensions\n",
            "3. Click 'Install from file...'\n",
            "4. Select {}"
        ),
        archive_name
    )
}
