//! Host services shared by every plugin filesystem.
//!
//! One [`HostServices`] is built at host startup and handed (as an `Arc`) to
//! each [`PluginFileSystem`](crate::PluginFileSystem). It owns the two
//! process-wide caches and the host collaborators:
//!
//! - **Class cache**: qualified name → class handle, write-once
//! - **Inner module cache**: module name → bundled bytes, size-bounded
//! - **Bundle**: where inner modules are read from
//! - **Exporter**: turns class handles into script source
//! - **Context loader**: yields the class resolver of the calling thread
//!
//! # Usage
//!
//! ```ignore
//! let services = HostServices::builder()
//!     .plugin_root("/srv/server/plugins")
//!     .bundle(DirBundle::new("/srv/server/resources"))
//!     .resolver(|name: &str| registry.lookup(name))
//!     .exporter(|class: &ClassRef| Ok(render_bindings(class)))
//!     .build()
//!     .into_shared();
//!
//! let fs = PluginFileSystem::new(services.clone(), "/srv/server/plugins/demo", 3);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config;
use crate::resource::class::{
    ClassCache, ClassExporter, ClassHandle, ClassResolver, NoClasses, NoExporter,
};
use crate::resource::inner::{InnerModuleCache, ModuleBundle, NoBundle};

/// Supplies the class resolver bound to the calling thread.
///
/// Called at most once per plugin filesystem, on the first dotted import.
pub type ContextLoader<H> = dyn Fn() -> Arc<dyn ClassResolver<H>> + Send + Sync;

/// Shared caches and host collaborators.
pub struct HostServices<H> {
    plugin_root: PathBuf,
    inner_module_dir: String,
    classes: ClassCache<H>,
    inner_modules: InnerModuleCache,
    bundle: Box<dyn ModuleBundle>,
    exporter: Box<dyn ClassExporter<H>>,
    context_loader: Box<ContextLoader<H>>,
}

impl<H: ClassHandle> HostServices<H> {
    /// Create a builder seeded from the global [`config`].
    pub fn builder() -> ServicesBuilder<H> {
        ServicesBuilder::new()
    }

    /// Wrap in an `Arc` for sharing between plugin filesystems.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Directory `@` paths resolve against.
    pub fn plugin_root(&self) -> &Path {
        &self.plugin_root
    }

    /// Shared class resolution cache.
    pub fn classes(&self) -> &ClassCache<H> {
        &self.classes
    }

    /// Shared inner module cache.
    pub fn inner_modules(&self) -> &InnerModuleCache {
        &self.inner_modules
    }

    /// Host bundle.
    pub fn bundle(&self) -> &dyn ModuleBundle {
        &*self.bundle
    }

    /// Host class exporter.
    pub fn exporter(&self) -> &dyn ClassExporter<H> {
        &*self.exporter
    }

    /// Capture the class resolver of the calling thread.
    pub fn context_resolver(&self) -> Arc<dyn ClassResolver<H>> {
        (self.context_loader)()
    }

    /// Bundle resource name of an inner module.
    pub fn inner_resource(&self, module: &str) -> String {
        format!("{}/{module}.js", self.inner_module_dir)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`HostServices`].
pub struct ServicesBuilder<H> {
    plugin_root: PathBuf,
    inner_module_dir: String,
    inner_cache_budget: usize,
    bundle: Box<dyn ModuleBundle>,
    exporter: Box<dyn ClassExporter<H>>,
    context_loader: Box<ContextLoader<H>>,
}

impl<H: ClassHandle> ServicesBuilder<H> {
    fn new() -> Self {
        let config = config::get();
        let no_classes: Arc<dyn ClassResolver<H>> = Arc::new(NoClasses);
        Self {
            plugin_root: config.plugin_root.clone(),
            inner_module_dir: config.inner_module_dir.clone(),
            inner_cache_budget: config.inner_cache_budget,
            bundle: Box::new(NoBundle),
            exporter: Box::new(NoExporter),
            context_loader: Box::new(move || no_classes.clone()),
        }
    }

    /// Override the directory `@` paths resolve against.
    pub fn plugin_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.plugin_root = root.into();
        self
    }

    /// Override the bundle directory inner modules are read from.
    pub fn inner_module_dir(mut self, dir: impl Into<String>) -> Self {
        self.inner_module_dir = dir.into();
        self
    }

    /// Override the inner module cache budget in bytes.
    pub fn inner_cache_budget(mut self, bytes: usize) -> Self {
        self.inner_cache_budget = bytes;
        self
    }

    /// Set the host bundle.
    pub fn bundle(mut self, bundle: impl ModuleBundle + 'static) -> Self {
        self.bundle = Box::new(bundle);
        self
    }

    /// Set the class exporter.
    pub fn exporter(mut self, exporter: impl ClassExporter<H> + 'static) -> Self {
        self.exporter = Box::new(exporter);
        self
    }

    /// Use one resolver for every thread.
    pub fn resolver(self, resolver: impl ClassResolver<H> + 'static) -> Self {
        let resolver: Arc<dyn ClassResolver<H>> = Arc::new(resolver);
        self.context_loader(move || resolver.clone())
    }

    /// Capture the resolver from the calling thread's context.
    ///
    /// Each plugin filesystem invokes `loader` once, on the thread that
    /// classifies its first dotted import, and keeps the result.
    pub fn context_loader(
        mut self,
        loader: impl Fn() -> Arc<dyn ClassResolver<H>> + Send + Sync + 'static,
    ) -> Self {
        self.context_loader = Box::new(loader);
        self
    }

    /// Build the services.
    pub fn build(self) -> HostServices<H> {
        HostServices {
            plugin_root: self.plugin_root,
            inner_module_dir: self.inner_module_dir,
            classes: ClassCache::new(),
            inner_modules: InnerModuleCache::new(self.inner_cache_budget),
            bundle: self.bundle,
            exporter: self.exporter,
            context_loader: self.context_loader,
        }
    }
}
