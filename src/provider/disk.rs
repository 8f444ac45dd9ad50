//! Real filesystem provider.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::ResourceProvider;
use crate::error::{VfsError, VfsResult};
use crate::fs::attributes;
use crate::fs::{DirFilter, DirectoryStream, OpenOptions};
use crate::path::{AccessMode, LinkOption, absolute_path, lexical_normalize};
use crate::resource::inner::Content;

/// Delegates to the real filesystem.
///
/// Paths arrive already joined onto the plugin root or base directory, so
/// this provider carries no state of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProvider;

impl DiskProvider {
    /// Open a file with the given options.
    pub fn open(&self, path: &Path, options: OpenOptions) -> VfsResult<File> {
        Ok(options.to_std().open(path)?)
    }

    /// Replace the content of a file, creating it if needed.
    pub fn write(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        Ok(fs::write(path, data)?)
    }

    /// Delete a file, symlink or empty directory.
    pub fn delete(&self, path: &Path) -> VfsResult<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Create a directory and any missing parents.
    pub fn create_directory(&self, path: &Path) -> VfsResult<()> {
        Ok(fs::create_dir_all(path)?)
    }

    /// List the children of a directory.
    pub fn list(&self, dir: &Path, filter: Option<DirFilter>) -> VfsResult<DirectoryStream> {
        Ok(DirectoryStream::open(dir, filter)?)
    }

    /// Read basic attributes selected by `selector`.
    pub fn stat(
        &self,
        path: &Path,
        selector: &str,
        link: LinkOption,
    ) -> VfsResult<Map<String, Value>> {
        let meta = match link {
            LinkOption::Follow => fs::metadata(path)?,
            LinkOption::NoFollow => fs::symlink_metadata(path)?,
        };
        Ok(attributes::select(&meta, selector)?)
    }

    /// Resolve `path` against the current directory.
    pub fn to_absolute_path(&self, path: &Path) -> PathBuf {
        absolute_path(path)
    }

    /// Canonicalize an existing path.
    ///
    /// With [`LinkOption::NoFollow`] only `.` and `..` are resolved, but the
    /// path must still exist.
    pub fn to_real_path(&self, path: &Path, link: LinkOption) -> VfsResult<PathBuf> {
        match link {
            LinkOption::Follow => Ok(path.canonicalize()?),
            LinkOption::NoFollow => {
                let real = lexical_normalize(&absolute_path(path));
                fs::symlink_metadata(&real)?;
                Ok(real)
            }
        }
    }
}

impl ResourceProvider for DiskProvider {
    type Key = Path;

    fn check_access(&self, path: &Path, modes: &[AccessMode], link: LinkOption) -> VfsResult<()> {
        let real = self.to_real_path(path, link)?;
        for &mode in modes {
            if !is_permitted(&real, mode) {
                return Err(VfsError::AccessDenied { path: real, mode });
            }
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> VfsResult<Content> {
        Ok(Arc::from(read_disk(path)?))
    }
}

/// Read file from disk.
fn read_disk(path: &Path) -> io::Result<Vec<u8>> {
    let meta = fs::metadata(path)?;
    if meta.is_dir() {
        Err(io::Error::new(io::ErrorKind::IsADirectory, "is a directory"))
    } else {
        fs::read(path)
    }
}

/// Whether the current process may use `path` in `mode`.
///
/// Files are checked by opening them. Directories cannot be opened for
/// writing, so WRITE on a directory only consults the read-only flag of its
/// permission bits and ignores the process owner; EXECUTE likewise only
/// looks at the mode bits.
fn is_permitted(path: &Path, mode: AccessMode) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    match mode {
        AccessMode::Read if meta.is_dir() => fs::read_dir(path).is_ok(),
        AccessMode::Read => File::open(path).is_ok(),
        AccessMode::Write if meta.is_dir() => !meta.permissions().readonly(),
        AccessMode::Write => fs::OpenOptions::new().write(true).open(path).is_ok(),
        AccessMode::Execute => is_executable(&meta),
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(meta: &fs::Metadata) -> bool {
    meta.is_dir() || meta.is_file()
}

// =============================================================================
// Tests
// =============================================================================
