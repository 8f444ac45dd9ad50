//! Directory listing for disk paths.

use std::fs::ReadDir;
use std::io;
use std::path::{Path, PathBuf};

/// Filter applied to each child path of a directory stream.
pub type DirFilter = Box<dyn Fn(&Path) -> bool + Send>;

/// Lazily iterates the children of a directory, skipping filtered paths.
///
/// Yields full paths (the directory joined with the entry name), matching
/// how the script engine resolves siblings of an importing module.
pub struct DirectoryStream {
    entries: ReadDir,
    filter: Option<DirFilter>,
}

impl DirectoryStream {
    pub(crate) fn open(dir: &Path, filter: Option<DirFilter>) -> io::Result<Self> {
        Ok(Self {
            entries: std::fs::read_dir(dir)?,
            filter,
        })
    }
}

impl Iterator for DirectoryStream {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.entries.next()? {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(e)),
            };
            match &self.filter {
                Some(filter) if !filter(&path) => continue,
                _ => return Some(Ok(path)),
            }
        }
    }
}

impl std::fmt::Debug for DirectoryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryStream")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
