//! Virtual path types and path utilities.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Reserved inner module synthesized from the owning plugin's id.
pub const PLUGIN_ID_MODULE: &str = "plugin-id";

/// Namespace prefix used when rendering inner module paths.
pub const INNER_MODULE_PREFIX: &str = "inner-module";

/// Namespace prefix used when rendering host class paths.
pub const HOST_CLASS_PREFIX: &str = "host-class";

/// A classified import path.
///
/// Produced by [`PathClassifier`](crate::PathClassifier); the variant decides
/// which provider serves every later operation on the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VirtualPath {
    /// A real file, already joined onto the plugin root or base directory.
    Disk(PathBuf),
    /// A module bundled with the host, addressed by logical name.
    InnerModule(String),
    /// A loaded host class, addressed by fully qualified name.
    HostClass(String),
}

impl VirtualPath {
    /// Returns true for inner modules and host classes.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, Self::Disk(_))
    }

    /// Get the disk path, if this is a disk path.
    pub fn as_disk(&self) -> Option<&Path> {
        match self {
            Self::Disk(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disk(path) => write!(f, "{}", path.display()),
            Self::InnerModule(name) => write!(f, "{INNER_MODULE_PREFIX}/{name}"),
            Self::HostClass(name) => write!(f, "{HOST_CLASS_PREFIX}/{name}"),
        }
    }
}

/// Access mode requested by [`check_access`](crate::PluginFileSystem::check_access).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Read content.
    Read,
    /// Modify content.
    Write,
    /// Execute as a program.
    Execute,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Execute => "execute",
        })
    }
}

/// Whether symbolic links are followed when resolving a disk path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkOption {
    /// Resolve symlinks (the usual behavior).
    #[default]
    Follow,
    /// Leave symlinks in place; only `.` and `..` are resolved.
    NoFollow,
}

/// Make a path absolute without touching the filesystem beyond the cwd.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}

/// Resolve `.` and `..` components without following links.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // `..` at the root stays at the root
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
