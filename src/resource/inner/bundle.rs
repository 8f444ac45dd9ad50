//! Module bundle trait and implementations.
//!
//! A bundle is the host's read-only store of resources shipped with the
//! application. Inner modules are looked up in it by resource name, e.g.
//! `inner-module/net/sockets.js`.

use std::io;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

// =============================================================================
// ModuleBundle Trait
// =============================================================================

/// Trait for reading resources bundled with the host application.
///
/// # Example
///
/// ```ignore
/// use script_vfs::{ModuleBundle, HostServices};
/// use std::io;
///
/// struct Embedded;
///
/// impl ModuleBundle for Embedded {
///     fn open(&self, resource: &str) -> io::Result<Option<Vec<u8>>> {
///         Ok(match resource {
///             "inner-module/util.js" => Some(include_bytes!("util.js").to_vec()),
///             _ => None,
///         })
///     }
/// }
///
/// let services = HostServices::<()>::builder().bundle(Embedded).build();
/// ```
pub trait ModuleBundle: Send + Sync {
    /// Read a bundled resource by name.
    ///
    /// Return `Ok(None)` when the resource does not exist; `Err` is reserved
    /// for resources that exist but could not be read.
    fn open(&self, resource: &str) -> io::Result<Option<Vec<u8>>>;
}

// =============================================================================
// NoBundle - Default Implementation
// =============================================================================

/// Bundle without any resources.
pub struct NoBundle;

impl ModuleBundle for NoBundle {
    fn open(&self, _resource: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

// =============================================================================
// DirBundle - Directory-backed Implementation
// =============================================================================

/// Bundle backed by a directory on disk, e.g. an unpacked resource folder.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    /// Create a bundle serving resources below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the bundle root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ModuleBundle for DirBundle {
    fn open(&self, resource: &str) -> io::Result<Option<Vec<u8>>> {
        // Resource names are `/`-separated and never leave the bundle
        if resource.split('/').any(|part| part == "..") {
            return Ok(None);
        }
        match std::fs::read(self.root.join(resource)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// MapBundle - Simple Map-based Implementation
// =============================================================================

/// A simple map-based bundle.
///
/// # Example
///
/// ```ignore
/// use script_vfs::MapBundle;
///
/// let mut bundle = MapBundle::new();
/// bundle.insert("inner-module/util.js", "export const answer = 42");
/// ```
#[derive(Default, Clone)]
pub struct MapBundle {
    files: FxHashMap<String, Vec<u8>>,
}

impl MapBundle {
    /// Create a new empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource with string content.
    pub fn insert(&mut self, resource: impl Into<String>, content: impl AsRef<str>) {
        self.files
            .insert(resource.into(), content.as_ref().as_bytes().to_vec());
    }

    /// Insert a resource with binary content.
    pub fn insert_bytes(&mut self, resource: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(resource.into(), content.into());
    }

    /// Check if a resource exists.
    pub fn contains(&self, resource: &str) -> bool {
        self.files.contains_key(resource)
    }

    /// Get the number of resources.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ModuleBundle for MapBundle {
    fn open(&self, resource: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.files.get(resource).cloned())
    }
}
