//! Test support utilities for bundler behavioural tests.
//!
//! Provides a scripted stand-in for `node` and `npm`, a checkout fixture, and
//! helpers for reading the produced archive.

use camino::{Utf8Path, Utf8PathBuf};
use dxt_bundler::command::CommandExecutor;
use dxt_bundler::error::{BuildError, Result};
use std::fs;
use std::process::{ExitStatus, Output};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

/// Serialises scenarios that change the process working directory.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Acquires the working-directory lock.
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Manifest with every required key present.
pub const MANIFEST: &str = r#"{
  "dxt_version": "0.1",
  "name": "libralm",
  "version": "1.0.0",
  "description": "Search and summarise your book library",
  "author": { "name": "LibraLM" },
  "server": {
    "type": "node",
    "entry_point": "libralm_mcp_server.js",
    "mcp_config": { "command": "node", "args": ["${__dirname}/libralm_mcp_server.js"] }
  }
}"#;

/// Files the fake package manager installs, relative to `node_modules`.
pub const INSTALLED_FILES: [&str; 9] = [
    "@modelcontextprotocol/sdk/dist/index.js",
    "@modelcontextprotocol/sdk/README.md",
    "@modelcontextprotocol/sdk/package.json",
    "zod/lib/index.js",
    "zod/NOTES.md",
    "zod/test/schema.test.js",
    "zod/examples/basic.js",
    "zod/.github/workflows/ci.yml",
    "zod/CHANGELOG.txt",
];

/// Files that must survive pruning, relative to `node_modules`.
pub const KEPT_FILES: [&str; 3] = [
    "@modelcontextprotocol/sdk/dist/index.js",
    "@modelcontextprotocol/sdk/package.json",
    "zod/lib/index.js",
];

/// A temporary extension checkout.
pub struct Checkout {
    _dir: TempDir,
    /// Absolute path of the checkout.
    pub root: Utf8PathBuf,
}

impl Checkout {
    /// Creates a checkout with every allow-listed source present.
    pub fn complete() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8 temp dir");
        for (name, body) in [
            ("manifest.json", MANIFEST),
            ("libralm_mcp_server.js", "#!/usr/bin/env node\n"),
            ("package.json", r#"{"name":"libralm-mcp","dependencies":{"zod":"^3"}}"#),
            ("LICENSE", "MIT"),
            ("README.md", "# LibraLM"),
            ("icon.png", "\u{89}PNG"),
        ] {
            fs::write(root.join(name), body).expect("write source");
        }
        Self { _dir: dir, root }
    }

    /// Path of the default archive.
    pub fn archive(&self) -> Utf8PathBuf {
        self.root.join("libralm.dxt")
    }

    /// Path of the default staging directory.
    pub fn staging(&self) -> Utf8PathBuf {
        self.root.join("bundle")
    }
}

/// Stands in for `node` and `npm`.
#[derive(Debug, Clone, Copy)]
pub struct FakeToolchain {
    /// Whether `node --version` succeeds.
    pub runtime_installed: bool,
    /// Whether `npm install` exits non-zero.
    pub install_fails: bool,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            runtime_installed: true,
            install_fails: false,
        }
    }
}

impl CommandExecutor for FakeToolchain {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        match (cmd, args) {
            ("node", ["--version"]) if self.runtime_installed => Ok(output(0, "v20.11.1\n", "")),
            ("node", _) => Err(BuildError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "node: command not found",
            ))),
            _ => panic!("unexpected captured command: {cmd} {args:?}"),
        }
    }

    fn run_streaming(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        match (cmd, args) {
            ("npm", ["install", "--production"]) if self.install_fails => {
                Ok(output(1, "", "npm ERR! code ETARGET"))
            }
            ("npm", ["install", "--production"]) => {
                let cwd = std::env::current_dir()?;
                let cwd = Utf8PathBuf::try_from(cwd).expect("utf8 cwd");
                install_into(&cwd.join("node_modules"));
                Ok(output(0, "", ""))
            }
            _ => panic!("unexpected streamed command: {cmd} {args:?}"),
        }
    }
}

fn install_into(modules: &Utf8Path) {
    for file in INSTALLED_FILES {
        let path = modules.join(file);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, file).expect("write dependency file");
    }
}

/// Lists the entry names of a zip archive.
pub fn archive_entries(path: &Utf8Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open archive");
    let archive = zip::ZipArchive::new(file).expect("read archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    names
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

fn output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}
