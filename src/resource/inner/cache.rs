//! Memory-bounded cache of inner module content.
//!
//! # Caching Strategy
//!
//! ```text
//! InnerModuleCache (shared by every plugin filesystem)
//! └── FxHashMap<String, Entry>
//!     └── Entry
//!         ├── content: Arc<[u8]>     (immutable bundle bytes)
//!         └── last_access: u64       (tick of the last hit)
//! ```
//!
//! The cache holds at most `budget` bytes. Inserting past the budget evicts
//! least recently used entries. Content is always re-derivable from the
//! bundle, so an eviction only costs a re-read.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Immutable module content shared between the cache and open channels.
pub type Content = Arc<[u8]>;

struct Entry {
    content: Content,
    /// Tick when this entry was last read or written.
    last_access: AtomicU64,
}

struct Slots {
    entries: FxHashMap<String, Entry>,
    used: usize,
}

/// Size-aware LRU cache from module name to content.
///
/// Lookups take a read lock and bump an atomic access tick, so concurrent
/// readers never block each other. Only inserts and evictions take the
/// write lock.
pub struct InnerModuleCache {
    slots: RwLock<Slots>,
    budget: usize,
    /// Monotonic access clock.
    ///
    /// Instead of reordering a list on every hit, each entry stores the tick
    /// of its last access and eviction picks the smallest tick.
    clock: AtomicU64,
}

impl InnerModuleCache {
    /// Create a cache holding at most `budget` bytes of content.
    pub fn new(budget: usize) -> Self {
        Self {
            slots: RwLock::new(Slots {
                entries: FxHashMap::default(),
                used: 0,
            }),
            budget,
            clock: AtomicU64::new(1),
        }
    }

    #[inline]
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Get cached content, marking it as recently used.
    pub fn get(&self, name: &str) -> Option<Content> {
        let slots = self.slots.read();
        let entry = slots.entries.get(name)?;
        entry.last_access.store(self.tick(), Ordering::Relaxed);
        Some(entry.content.clone())
    }

    /// Cache `content` under `name`.
    ///
    /// Empty content is never cached, and neither is content larger than the
    /// whole budget. Returns whether the content was stored.
    pub fn insert(&self, name: &str, content: Content) -> bool {
        let size = content.len();
        if size == 0 || size > self.budget {
            return false;
        }

        let entry = Entry {
            content,
            last_access: AtomicU64::new(self.tick()),
        };

        let mut slots = self.slots.write();
        if let Some(prev) = slots.entries.insert(name.to_string(), entry) {
            slots.used -= prev.content.len();
        }
        slots.used += size;

        let target = self.budget;
        evict_until(&mut slots, target, Some(name));
        true
    }

    /// Evict least recently used entries until at most `bytes` are held.
    ///
    /// This is the memory-pressure hook: hosts call it when they need memory
    /// back. `trim_to(0)` empties the cache.
    pub fn trim_to(&self, bytes: usize) -> usize {
        let mut slots = self.slots.write();
        evict_until(&mut slots, bytes, None)
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut slots = self.slots.write();
        slots.entries.clear();
        slots.used = 0;
    }

    /// Check if `name` is currently cached.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.read().entries.contains_key(name)
    }

    /// Number of cached modules.
    pub fn len(&self) -> usize {
        self.slots.read().entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.slots.read().entries.is_empty()
    }

    /// Bytes of content currently held.
    pub fn used_bytes(&self) -> usize {
        self.slots.read().used
    }

    /// Maximum bytes of content held.
    pub fn budget(&self) -> usize {
        self.budget
    }
}

/// Evict oldest entries until `used <= target`, sparing `keep`.
///
/// Returns the number of evicted entries.
fn evict_until(slots: &mut Slots, target: usize, keep: Option<&str>) -> usize {
    let mut evicted = 0;
    while slots.used > target {
        let victim = slots
            .entries
            .iter()
            .filter(|(name, _)| Some(name.as_str()) != keep)
            .min_by_key(|(_, entry)| entry.last_access.load(Ordering::Relaxed))
            .map(|(name, _)| name.clone());

        let Some(victim) = victim else { break };
        if let Some(entry) = slots.entries.remove(&victim) {
            slots.used -= entry.content.len();
            evicted += 1;
            tracing::debug!(module = %victim, bytes = entry.content.len(), "evicted inner module");
        }
    }
    evicted
}

// =============================================================================
// Tests
// =============================================================================
