//! Shared resources behind the synthetic namespaces (classes, inner modules).

pub mod class;
pub mod inner;
pub mod read;

use crate::error::VfsResult;
use crate::path::PLUGIN_ID_MODULE;
use crate::provider::InnerModuleProvider;
use crate::resource::class::ClassHandle;
use crate::services::HostServices;

/// Fill the inner module cache ahead of the first import.
///
/// Returns how many of `names` were found in the bundle. The synthesized
/// `plugin-id` module is never bundled and is skipped. With the `batch`
/// feature the bundle is read in parallel.
pub fn preload_inner_modules<H, S>(services: &HostServices<H>, names: &[S]) -> VfsResult<usize>
where
    H: ClassHandle,
    S: AsRef<str> + Sync,
{
    let provider = InnerModuleProvider::new(services, 0);
    let load = |name: &S| -> VfsResult<bool> {
        match name.as_ref() {
            PLUGIN_ID_MODULE => Ok(false),
            name => Ok(!provider.read_bundled(name)?.is_empty()),
        }
    };

    #[cfg(feature = "batch")]
    let found: Vec<bool> = {
        use rayon::prelude::*;
        names.par_iter().map(load).collect::<VfsResult<_>>()?
    };

    #[cfg(not(feature = "batch"))]
    let found: Vec<bool> = names.iter().map(load).collect::<VfsResult<_>>()?;

    let loaded = found.into_iter().filter(|hit| *hit).count();
    tracing::debug!(requested = names.len(), loaded, "preloaded inner modules");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::inner::MapBundle;

    #[test]
    fn test_preload_inner_modules() {
        let mut bundle = MapBundle::new();
        bundle.insert("inner-module/a.js", "export const a = 1");
        bundle.insert("inner-module/b.js", "export const b = 2");
        let services = HostServices::<()>::builder().bundle(bundle).build();

        let loaded = preload_inner_modules(&services, &["a", "b", "missing"]).unwrap();
        assert_eq!(loaded, 2);
        assert!(services.inner_modules().contains("a"));
        assert!(services.inner_modules().contains("b"));
        assert_eq!(services.inner_modules().len(), 2);
    }

    #[test]
    fn test_preload_skips_plugin_id() {
        let services = HostServices::<()>::builder().bundle(MapBundle::new()).build();

        let loaded = preload_inner_modules(&services, &["plugin-id"]).unwrap();
        assert_eq!(loaded, 0);
        assert!(services.inner_modules().is_empty());
    }
}
