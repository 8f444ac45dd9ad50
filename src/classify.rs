//! Import string classification.
//!
//! Every import string the script engine hands over is sorted into one of
//! three namespaces. Rules are tried in order, first match wins:
//!
//! ```text
//! "@scripts/init.js"   ──► Disk(<plugin root>/@scripts/init.js)
//! ":net/sockets"       ──► InnerModule("net/sockets")
//! "com.example.Foo"    ──► HostClass("com.example.Foo")     if the class resolves
//!                      └─► Disk(<base dir>/com.example.Foo) otherwise
//! ".js", "lib/a.js"    ──► Disk(<base dir>/...)
//! ```
//!
//! A string is a class candidate when it contains more than one `.`, which
//! separates `pkg.sub.Name` from `name.js`. Relative paths such as
//! `../../lib.js` also qualify, fail to resolve, and land on disk.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use url::Url;

use crate::path::VirtualPath;
use crate::resource::class::{ClassHandle, ClassResolver};
use crate::services::HostServices;

/// Turns import strings into [`VirtualPath`]s for one plugin.
pub struct PathClassifier<H> {
    services: Arc<HostServices<H>>,
    base_dir: PathBuf,
    /// Resolver captured from the thread of the first class candidate.
    loader: OnceLock<Arc<dyn ClassResolver<H>>>,
}

impl<H: ClassHandle> PathClassifier<H> {
    /// Create a classifier resolving relative paths against `base_dir`.
    pub fn new(services: Arc<HostServices<H>>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            services,
            base_dir: base_dir.into(),
            loader: OnceLock::new(),
        }
    }

    /// Get the plugin base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Classify an import string.
    ///
    /// Total over all inputs. Resolving a class candidate may initialize
    /// that class on the host, which is visible outside this crate.
    pub fn classify(&self, input: &str) -> VirtualPath {
        let vpath = self.classify_inner(input);
        tracing::debug!(input, %vpath, "classified import");
        vpath
    }

    /// Classify a URI.
    ///
    /// Local `file:` URIs always name disk files, percent-decoded. Anything
    /// else, including `file:` URIs with a remote host, is classified by its
    /// textual form.
    pub fn classify_uri(&self, uri: &str) -> VirtualPath {
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => VirtualPath::Disk(path),
                Err(()) => {
                    tracing::debug!(uri, "file URI is not local");
                    self.classify(uri)
                }
            },
            _ => self.classify(uri),
        }
    }

    fn classify_inner(&self, input: &str) -> VirtualPath {
        if input.starts_with('@') {
            return VirtualPath::Disk(self.services.plugin_root().join(input));
        }
        if let Some(name) = input.strip_prefix(':') {
            return VirtualPath::InnerModule(name.to_string());
        }
        if is_class_candidate(input) && self.resolve_class(input) {
            return VirtualPath::HostClass(input.to_string());
        }
        VirtualPath::Disk(self.base_dir.join(input))
    }

    /// Resolve `name` through the shared cache, loading it on a miss.
    fn resolve_class(&self, name: &str) -> bool {
        let classes = self.services.classes();
        if classes.contains(name) {
            return true;
        }

        let loader = self.loader.get_or_init(|| {
            tracing::debug!("binding class loader from calling thread");
            self.services.context_resolver()
        });
        match loader.resolve(name) {
            Some(handle) => {
                classes.insert(name, handle);
                tracing::debug!(class = name, "resolved host class");
                true
            }
            None => false,
        }
    }
}

/// Whether `input` could be a fully qualified class name.
fn is_class_candidate(input: &str) -> bool {
    input != ".js" && input.matches('.').count() > 1
}
