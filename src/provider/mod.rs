//! Resource providers behind each virtual namespace.
//!
//! ```text
//! VirtualPath::Disk(path)          ──► DiskProvider         (read/write/delete/list/stat)
//! VirtualPath::InnerModule(name)   ──► InnerModuleProvider  (read only)
//! VirtualPath::HostClass(name)     ──► HostClassProvider    (read only)
//! ```
//!
//! Providers never call each other; [`PluginFileSystem`](crate::PluginFileSystem)
//! alone decides which one serves a path.

mod disk;
mod host_class;
mod inner;

pub use disk::DiskProvider;
pub use host_class::HostClassProvider;
pub use inner::InnerModuleProvider;

use crate::error::{VfsError, VfsResult};
use crate::path::{AccessMode, LinkOption};
use crate::resource::inner::Content;

/// Capabilities every provider offers.
pub trait ResourceProvider {
    /// How the provider addresses a resource.
    type Key: ?Sized;

    /// Fail unless every requested mode is permitted on `key`.
    fn check_access(
        &self,
        key: &Self::Key,
        modes: &[AccessMode],
        link: LinkOption,
    ) -> VfsResult<()>;

    /// Read the whole resource.
    fn read(&self, key: &Self::Key) -> VfsResult<Content>;
}

/// Access policy of the synthetic namespaces: reading only.
pub(crate) fn read_only_access(
    rendered: impl Fn() -> String,
    modes: &[AccessMode],
) -> VfsResult<()> {
    match modes.iter().find(|mode| **mode != AccessMode::Read) {
        Some(mode) => Err(VfsError::rejected(rendered(), mode.to_string())),
        None => Ok(()),
    }
}
