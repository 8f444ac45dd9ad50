//! Host class export provider.

use std::sync::Arc;

use super::{ResourceProvider, read_only_access};
use crate::error::{VfsError, VfsResult};
use crate::path::{AccessMode, LinkOption, VirtualPath};
use crate::resource::class::ClassHandle;
use crate::resource::inner::Content;
use crate::services::HostServices;

/// Serves script bindings generated from resolved host classes.
///
/// Exports are generated on every read and never cached here, so a module
/// always reflects the class as it is at read time.
pub struct HostClassProvider<'a, H> {
    services: &'a HostServices<H>,
}

impl<'a, H: ClassHandle> HostClassProvider<'a, H> {
    /// Create a provider over the shared class cache.
    pub fn new(services: &'a HostServices<H>) -> Self {
        Self { services }
    }

    /// Generate the export source for `name`.
    ///
    /// The class must have been resolved by classification beforehand.
    pub fn export(&self, name: &str) -> VfsResult<String> {
        let vpath = || VirtualPath::HostClass(name.to_string());
        let class = self
            .services
            .classes()
            .get(name)
            .ok_or_else(|| VfsError::unavailable(vpath(), "class was never resolved"))?;

        tracing::trace!(class = name, "exporting host class");
        self.services
            .exporter()
            .export(&class)
            .map_err(|e| VfsError::unavailable(vpath(), e))
    }
}

impl<H: ClassHandle> ResourceProvider for HostClassProvider<'_, H> {
    type Key = str;

    fn check_access(
        &self,
        name: &str,
        modes: &[AccessMode],
        _link: LinkOption,
    ) -> VfsResult<()> {
        read_only_access(|| VirtualPath::HostClass(name.to_string()).to_string(), modes)
    }

    fn read(&self, name: &str) -> VfsResult<Content> {
        Ok(Arc::from(self.export(name)?.into_bytes()))
    }
}
