//! Inner module provider.

use std::sync::Arc;

use super::{ResourceProvider, read_only_access};
use crate::error::{VfsError, VfsResult};
use crate::path::{AccessMode, LinkOption, PLUGIN_ID_MODULE, VirtualPath};
use crate::resource::class::ClassHandle;
use crate::resource::inner::Content;
use crate::services::HostServices;

/// Serves modules bundled with the host, plus the per-plugin `plugin-id`.
pub struct InnerModuleProvider<'a, H> {
    services: &'a HostServices<H>,
    plugin_id: i32,
}

impl<'a, H: ClassHandle> InnerModuleProvider<'a, H> {
    /// Create a provider for the plugin with id `plugin_id`.
    pub fn new(services: &'a HostServices<H>, plugin_id: i32) -> Self {
        Self {
            services,
            plugin_id,
        }
    }

    /// Source of the `plugin-id` module for this plugin.
    pub fn plugin_id_source(&self) -> String {
        format!("export const id = {}", self.plugin_id)
    }

    /// Read a bundled module through the shared cache.
    ///
    /// Missing modules yield empty content and are looked up again on the
    /// next call.
    pub(crate) fn read_bundled(&self, name: &str) -> VfsResult<Content> {
        let cache = self.services.inner_modules();
        if let Some(content) = cache.get(name) {
            tracing::trace!(module = name, "inner module cache hit");
            return Ok(content);
        }

        let resource = self.services.inner_resource(name);
        let data = self
            .services
            .bundle()
            .open(&resource)
            .map_err(|e| {
                tracing::warn!(%resource, error = %e, "failed to read bundled module");
                VfsError::unavailable(VirtualPath::InnerModule(name.to_string()), e)
            })?
            .unwrap_or_default();

        let content: Content = Arc::from(data);
        if content.is_empty() {
            tracing::debug!(%resource, "inner module not found in bundle");
        } else if cache.insert(name, content.clone()) {
            tracing::debug!(module = name, bytes = content.len(), "cached inner module");
        }
        Ok(content)
    }
}

impl<H: ClassHandle> ResourceProvider for InnerModuleProvider<'_, H> {
    type Key = str;

    fn check_access(
        &self,
        name: &str,
        modes: &[AccessMode],
        _link: LinkOption,
    ) -> VfsResult<()> {
        read_only_access(
            || VirtualPath::InnerModule(name.to_string()).to_string(),
            modes,
        )
    }

    fn read(&self, name: &str) -> VfsResult<Content> {
        if name == PLUGIN_ID_MODULE {
            return Ok(Arc::from(self.plugin_id_source().into_bytes()));
        }
        self.read_bundled(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::inner::MapBundle;

    fn services() -> HostServices<()> {
        let mut bundle = MapBundle::new();
        bundle.insert("inner-module/util.js", "export const answer = 42");
        HostServices::builder().bundle(bundle).build()
    }

    #[test]
    fn test_plugin_id_module() {
        let services = services();
        let provider = InnerModuleProvider::new(&services, 12);
        assert_eq!(&*provider.read("plugin-id").unwrap(), b"export const id = 12");
        assert!(!services.inner_modules().contains("plugin-id"));
    }

    #[test]
    fn test_bundled_module_is_cached() {
        let services = services();
        let provider = InnerModuleProvider::new(&services, 0);
        assert_eq!(&*provider.read("util").unwrap(), b"export const answer = 42");
        assert!(services.inner_modules().contains("util"));
    }

    #[test]
    fn test_missing_module_is_empty() {
        let services = services();
        let provider = InnerModuleProvider::new(&services, 0);
        assert!(provider.read("nope").unwrap().is_empty());
        assert!(services.inner_modules().is_empty());
    }

    #[test]
    fn test_write_rejected() {
        let services = services();
        let provider = InnerModuleProvider::new(&services, 0);
        let err = provider
            .check_access("util", &[AccessMode::Write], LinkOption::Follow)
            .unwrap_err();
        assert!(matches!(err, VfsError::AccessRejected { .. }));
        assert!(provider
            .check_access("util", &[AccessMode::Read], LinkOption::Follow)
            .is_ok());
    }
}
