//! DXT archive creation.
//!
//! A DXT package is a deflate-compressed zip whose root is the staging
//! directory. Entry names are relative to that root and always use `/`
//! separators, so `bundle/node_modules/foo/index.js` is stored as
//! `node_modules/foo/index.js`.

use crate::error::{BuildError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What [`create_archive`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Location of the archive.
    pub path: Utf8PathBuf,
    /// Number of file entries written.
    pub entries: usize,
    /// Size of the archive on disk.
    pub size_bytes: u64,
}

/// Zips every file under `staging_dir` into `archive_path`.
///
/// The tree is walked in file-name order so that identical inputs produce
/// identical entry order. Regular files are stored as-is; symlinks that
/// resolve to regular files are stored with the target's content. Directories
/// are implied by entry names and not stored.
///
/// # Errors
///
/// Returns [`BuildError::Archive`] if the archive cannot be written and
/// [`BuildError::Io`] if the staging tree cannot be read.
pub fn create_archive(staging_dir: &Utf8Path, archive_path: &Utf8Path) -> Result<ArchiveSummary> {
    let zip_err = |source: ZipError| BuildError::Archive {
        path: archive_path.to_owned(),
        source,
    };

    let file = File::create(archive_path).map_err(|e| zip_err(e.into()))?;
    let mut writer = ZipWriter::new(file);
    let mut entries = 0;

    for entry in WalkDir::new(staging_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !is_archivable(&entry)? {
            continue;
        }

        let name = entry_name(staging_dir.as_std_path(), entry.path())?;
        writer
            .start_file(name.as_str(), file_options(entry.path())?)
            .map_err(zip_err)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut writer)?;
        log::trace!("added {name}");
        entries += 1;
    }

    writer.finish().map_err(zip_err)?;
    let size_bytes = fs::metadata(archive_path)?.len();

    Ok(ArchiveSummary {
        path: archive_path.to_owned(),
        entries,
        size_bytes,
    })
}

/// Builds the archive entry name for `path` relative to `root`.
///
/// # Errors
///
/// Returns an [`io::ErrorKind::InvalidInput`] error when `path` is not below
/// `root` or is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use dxt_bundler::archive::entry_name;
/// use std::path::Path;
///
/// let name = entry_name(Path::new("/src/bundle"), Path::new("/src/bundle/node_modules/foo/index.js"))?;
/// assert_eq!(name, "node_modules/foo/index.js");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn entry_name(root: &Path, path: &Path) -> io::Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is outside {}", path.display(), root.display()),
        )
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unexpected component in {}", relative.display()),
            ));
        };
        let part = part.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not valid UTF-8", relative.display()),
            )
        })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

fn is_archivable(entry: &walkdir::DirEntry) -> io::Result<bool> {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return Ok(true);
    }
    if file_type.is_symlink() {
        return match fs::metadata(entry.path()) {
            Ok(target) => Ok(target.is_file()),
            Err(e) => Err(io::Error::new(
                e.kind(),
                format!("broken symlink {}: {e}", entry.path().display()),
            )),
        };
    }
    Ok(false)
}

#[cfg(unix)]
fn file_options(path: &Path) -> io::Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)?.permissions().mode();
    Ok(deflated().unix_permissions(mode & 0o777))
}

#[cfg(not(unix))]
fn file_options(_path: &Path) -> io::Result<SimpleFileOptions> {
    Ok(deflated())
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}
