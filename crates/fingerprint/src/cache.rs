use std::collections::HashMap;
use std::sync::Arc;

/// Per-run LRU cache of per-line position hash arrays.
///
/// Purely a speed optimization: a line covered by many tests hashes once. On
/// overflow the 20% least-recently-used entries are dropped in a single pass.
pub(crate) struct LineHashCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    tick: u64,
}

struct CacheEntry {
    hashes: Arc<Vec<u64>>,
    last_used: u64,
}

impl LineHashCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get_or_insert_with(
        &mut self,
        key: &str,
        compute: impl FnOnce() -> Vec<u64>,
    ) -> Arc<Vec<u64>> {
        self.tick += 1;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = self.tick;
            return Arc::clone(&entry.hashes);
        }

        if self.entries.len() >= self.capacity {
            self.evict_lru_batch();
        }

        let hashes = Arc::new(compute());
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                hashes: Arc::clone(&hashes),
                last_used: self.tick,
            },
        );
        hashes
    }

    /// Drops the oldest 20% of entries (at least one) in one pass.
    fn evict_lru_batch(&mut self) {
        let evict = (self.entries.len() / 5).max(1);
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.last_used, key.clone()))
            .collect();
        by_age.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for (_, key) in by_age.into_iter().take(evict) {
            self.entries.remove(&key);
        }
        log::debug!("line hash cache evicted {evict} entries");
    }
}
