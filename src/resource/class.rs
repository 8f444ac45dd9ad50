//! Host class resolution and export.
//!
//! The host decides what a "class" is. This crate only needs to know
//! whether a qualified name resolves, and to hand the resolved handle to an
//! exporter that turns it into script source.
//!
//! ```text
//! "com.example.Foo" ──► ClassCache hit? ──► handle
//!                            │ miss
//!                            └─► ClassResolver::resolve ──► insert ──► handle
//!
//! handle ──► ClassExporter::export ──► "export class Foo { ... }"
//! ```

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::BoxError;

/// Bound for opaque host class handles.
///
/// Blanket-implemented; handles are usually cheap `Arc`s or ids.
pub trait ClassHandle: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> ClassHandle for T {}

/// Resolves fully qualified class names to host class handles.
///
/// Resolution may initialize the class on the host side. That side effect
/// is visible to anyone classifying a dotted import string.
///
/// # Example
///
/// ```ignore
/// let resolver = |name: &str| registry.lookup(name);
/// let services = HostServices::builder().resolver(resolver).build();
/// ```
pub trait ClassResolver<H>: Send + Sync {
    /// Load the class named `name`, or `None` if no such class exists.
    fn resolve(&self, name: &str) -> Option<H>;
}

impl<H, F> ClassResolver<H> for F
where
    F: Fn(&str) -> Option<H> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Option<H> {
        self(name)
    }
}

/// Generates script source exposing a resolved host class.
pub trait ClassExporter<H>: Send + Sync {
    /// Produce module source for `class`.
    fn export(&self, class: &H) -> Result<String, BoxError>;
}

impl<H, F> ClassExporter<H> for F
where
    F: Fn(&H) -> Result<String, BoxError> + Send + Sync,
{
    fn export(&self, class: &H) -> Result<String, BoxError> {
        self(class)
    }
}

/// Resolver that knows no classes; every dotted import falls back to disk.
pub struct NoClasses;

impl<H> ClassResolver<H> for NoClasses {
    fn resolve(&self, _name: &str) -> Option<H> {
        None
    }
}

/// Exporter used when the host provides none.
pub struct NoExporter;

impl<H> ClassExporter<H> for NoExporter {
    fn export(&self, _class: &H) -> Result<String, BoxError> {
        Err("no class exporter configured".into())
    }
}

// =============================================================================
// ClassCache
// =============================================================================

/// Shared map from qualified class name to resolved handle.
///
/// Entries are write-once and never evicted. Two racing resolutions of the
/// same name both succeed; the first insert is kept and returned to both.
pub struct ClassCache<H> {
    classes: RwLock<FxHashMap<String, H>>,
}

impl<H: ClassHandle> ClassCache<H> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(FxHashMap::default()),
        }
    }

    /// Get a cached handle.
    pub fn get(&self, name: &str) -> Option<H> {
        self.classes.read().get(name).cloned()
    }

    /// Check if `name` has been resolved before.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// Insert a handle unless one is already cached, returning the kept one.
    pub fn insert(&self, name: &str, handle: H) -> H {
        self.classes
            .write()
            .entry(name.to_string())
            .or_insert(handle)
            .clone()
    }

    /// Number of cached classes.
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl<H: ClassHandle> Default for ClassCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_insert_wins() {
        let cache: ClassCache<Arc<str>> = ClassCache::new();
        let first: Arc<str> = Arc::from("first");
        let kept = cache.insert("a.b.C", first.clone());
        assert!(Arc::ptr_eq(&kept, &first));

        let kept = cache.insert("a.b.C", Arc::from("second"));
        assert!(Arc::ptr_eq(&kept, &first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |name: &str| (name == "a.b.C").then_some(7u32);
        assert_eq!(ClassResolver::resolve(&resolver, "a.b.C"), Some(7));
        assert_eq!(ClassResolver::resolve(&resolver, "a.b.D"), None);
        assert_eq!(ClassResolver::<u32>::resolve(&NoClasses, "a.b.C"), None);
    }

    #[test]
    fn test_no_exporter_fails() {
        assert!(ClassExporter::<u32>::export(&NoExporter, &1).is_err());
    }

    #[test]
    fn test_concurrent_inserts_agree() {
        let cache: ClassCache<usize> = ClassCache::new();
        let kept: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    s.spawn(move || cache.insert("x.y.Z", i))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let winner = cache.get("x.y.Z").unwrap();
        assert!(kept.iter().all(|&k| k == winner));
    }
}
