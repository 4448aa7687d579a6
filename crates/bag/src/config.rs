/// Configuration for a [`crate::Bag`].
#[derive(Debug, Clone, Copy)]
pub struct BagConfig {
    /// Maximum number of weak back-references a single thread's affinity
    /// cache retains. `HikariCP`'s `ConcurrentBag`, the canonical connection-pool
    /// design this crate follows, bounds its per-thread list at 50 entries;
    /// kept here as the default so a thread that requites in a tight loop
    /// doesn't grow its cache unboundedly.
    pub affinity_cache_capacity: usize,
    /// Enable the in-process counters returned by [`crate::Bag::metrics`]
    /// (negligible overhead when on; skipped entirely when off).
    pub enable_metrics: bool,
}

impl BagConfig {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `affinity_cache_capacity` is 0 — a zero-capacity cache
    /// would defeat the purpose of the affinity fast path.
    pub const fn new(affinity_cache_capacity: usize, enable_metrics: bool) -> Self {
        assert!(
            affinity_cache_capacity > 0,
            "affinity_cache_capacity must be at least 1"
        );

        Self {
            affinity_cache_capacity,
            enable_metrics,
        }
    }
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            affinity_cache_capacity: 50,
            enable_metrics: false,
        }
    }
}

/// Preset for workloads with many threads cycling items quickly: a deeper
/// affinity cache trades a little memory for fewer registry scans.
pub const HIGH_CONTENTION_CONFIG: BagConfig = BagConfig::new(128, false);
