//! Named byte counters for memory diagnostics.
//!
//! Scratch buffers report every allocation and release to a counter so the
//! amount of CPU memory held by in-flight meshes can be inspected at runtime.
//! GPU memory is tracked separately by the world, on the render thread.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, OnceLock,
};

use parking_lot::Mutex;

/// Name of the counter every tessellation buffer reports to.
pub const TESSELLATION_BUFFER_COUNTER: &str = "tessellation_buffers";

/// A named, thread-safe byte counter.
#[derive(Debug)]
pub struct ByteCounter {
    name: &'static str,
    bytes: AtomicU64,
}

impl ByteCounter {
    /// Creates a counter starting at zero.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bytes: AtomicU64::new(0),
        }
    }

    /// The name this counter was registered under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Records `bytes` newly allocated bytes.
    pub fn add(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records `bytes` released bytes. Saturates at zero.
    pub fn sub(&self, bytes: u64) {
        let _ = self
            .bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    /// Current number of bytes recorded.
    pub fn get(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// Process-wide registry of named counters.
///
/// Counters are created lazily on first lookup and live for the rest of the
/// process.
pub struct MemoryCounters {
    counters: Mutex<Vec<Arc<ByteCounter>>>,
}

impl MemoryCounters {
    /// Returns the global registry.
    pub fn global() -> &'static MemoryCounters {
        static COUNTERS: OnceLock<MemoryCounters> = OnceLock::new();
        COUNTERS.get_or_init(|| MemoryCounters {
            counters: Mutex::new(Vec::new()),
        })
    }

    /// Returns the counter registered under `name`, creating it if needed.
    pub fn counter(&self, name: &'static str) -> Arc<ByteCounter> {
        let mut counters = self.counters.lock();
        if let Some(counter) = counters.iter().find(|counter| counter.name == name) {
            return counter.clone();
        }
        let counter = Arc::new(ByteCounter::new(name));
        counters.push(counter.clone());
        counter
    }

    /// Snapshot of every registered counter as `(name, bytes)` pairs.
    pub fn snapshot(&self) -> Vec<(&'static str, u64)> {
        self.counters
            .lock()
            .iter()
            .map(|counter| (counter.name, counter.get()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_add_and_saturating_sub() {
        let counter = ByteCounter::new("test");
        counter.add(100);
        counter.sub(40);
        assert_eq!(counter.get(), 60);

        counter.sub(1000);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_registry_returns_same_counter_for_name() {
        let registry = MemoryCounters::global();
        let a = registry.counter("registry_test_counter");
        let b = registry.counter("registry_test_counter");
        a.add(7);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry
            .snapshot()
            .iter()
            .any(|(name, _)| *name == "registry_test_counter"));
    }
}
