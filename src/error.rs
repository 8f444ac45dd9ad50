//! Error type for virtual filesystem operations.

use std::io;

use thiserror::Error;

use crate::path::AccessMode;

/// Boxed error produced by host collaborators (bundles, exporters).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type VfsResult<T> = Result<T, VfsError>;

/// Error type for plugin filesystem failures.
///
/// Access errors come in two flavors: [`VfsError::AccessRejected`] for any
/// mutation of a synthetic namespace, and [`VfsError::AccessDenied`] when
/// the real filesystem refuses a mode on a disk path.
///
/// # Example
///
/// ```ignore
/// match fs.check_access(&path, &[AccessMode::Write], LinkOption::Follow) {
///     Ok(()) => { /* writable */ }
///     Err(VfsError::AccessRejected { path, .. }) => {
///         eprintln!("{path} is read-only");
///     }
///     Err(VfsError::AccessDenied { path, mode }) => {
///         eprintln!("no {mode} permission on {}", path.display());
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum VfsError {
    /// Write, execute or structural access to an inner module or host class.
    #[error("{path} cannot be accessed: {operation} is not allowed on a read-only namespace")]
    AccessRejected {
        /// Rendered virtual path.
        path: String,
        /// What was attempted (`"write"`, `"delete"`, ...).
        operation: String,
    },

    /// The real filesystem denied a requested access mode.
    #[error("access denied ({mode}): {}", path.display())]
    AccessDenied {
        /// Canonical path that was checked.
        path: std::path::PathBuf,
        /// First denied mode.
        mode: AccessMode,
    },

    /// A bundled module or class export could not be produced.
    #[error("resource unavailable: {resource}: {source}")]
    ResourceUnavailable {
        /// Rendered virtual path of the resource.
        resource: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// Disk I/O failure, surfaced verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VfsError {
    /// Create an access rejection for a synthetic path.
    pub fn rejected(path: impl ToString, operation: impl Into<String>) -> Self {
        Self::AccessRejected {
            path: path.to_string(),
            operation: operation.into(),
        }
    }

    /// Create a resource failure for a synthetic path.
    pub fn unavailable(resource: impl ToString, source: impl Into<BoxError>) -> Self {
        Self::ResourceUnavailable {
            resource: resource.to_string(),
            source: source.into(),
        }
    }

    /// Check if this error is an access-control failure.
    pub fn is_access_error(&self) -> bool {
        matches!(self, Self::AccessRejected { .. } | Self::AccessDenied { .. })
    }
}

impl From<VfsError> for io::Error {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::Io(e) => e,
            e if e.is_access_error() => io::Error::new(io::ErrorKind::PermissionDenied, e),
            e => io::Error::other(e),
        }
    }
}
