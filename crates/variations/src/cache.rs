//! Two-tier variation cache.
//!
//! `auto` entries are keyed by fingerprint alone; `custom` entries by
//! fingerprint then verbatim prompt text. Custom prompts are deliberate,
//! lower-frequency requests worth retaining longer, hence the longer
//! TTL — but they are unbounded in cardinality, so pruning discards the
//! custom namespace wholesale and keeps only the freshest half of the
//! auto namespace.
//!
//! All operations take `now_ms` explicitly; no wall clock is read here.

use indexmap::IndexMap;
use tracing::debug;

/// Tunables; defaults match the web client's variation config.
#[derive(Clone, Copy, Debug)]
pub struct VariationCacheConfig {
    /// Variations to request per element.
    pub count: u32,
    pub auto_ttl_ms: u64,
    pub custom_ttl_ms: u64,
    /// Bound on auto keys + custom fingerprint keys, checked after every
    /// write.
    pub max_entries: usize,
}

impl Default for VariationCacheConfig {
    fn default() -> VariationCacheConfig {
        VariationCacheConfig {
            count: 3,
            auto_ttl_ms: 3_600_000,   // 1 hour
            custom_ttl_ms: 7_200_000, // 2 hours
            max_entries: 100,
        }
    }
}

/// Generated variants for one fingerprint, stamped at write time.
#[derive(Clone, Debug, PartialEq)]
pub struct VariationEntry {
    pub variations: Vec<String>,
    pub timestamp_ms: u64,
}

impl VariationEntry {
    fn is_valid(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp_ms) < ttl_ms
    }
}

/// Process-local cache of backend-generated design variants.
#[derive(Debug, Default)]
pub struct VariationCache {
    config: VariationCacheConfig,
    auto: IndexMap<String, VariationEntry>,
    custom: IndexMap<String, IndexMap<String, VariationEntry>>,
}

impl VariationCache {
    pub fn new(config: VariationCacheConfig) -> VariationCache {
        VariationCache {
            config,
            auto: IndexMap::new(),
            custom: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &VariationCacheConfig {
        &self.config
    }

    /// Live auto variants for a fingerprint, if any.
    pub fn get_auto(&self, key: &str, now_ms: u64) -> Option<&[String]> {
        self.auto
            .get(key)
            .filter(|entry| entry.is_valid(now_ms, self.config.auto_ttl_ms))
            .map(|entry| entry.variations.as_slice())
    }

    /// Live custom variants for a (fingerprint, prompt) pair, if any.
    pub fn get_custom(&self, key: &str, prompt: &str, now_ms: u64) -> Option<&[String]> {
        self.custom
            .get(key)
            .and_then(|by_prompt| by_prompt.get(prompt))
            .filter(|entry| entry.is_valid(now_ms, self.config.custom_ttl_ms))
            .map(|entry| entry.variations.as_slice())
    }

    pub fn put_auto(&mut self, key: &str, variations: Vec<String>, now_ms: u64) {
        self.auto.insert(
            key.to_owned(),
            VariationEntry {
                variations,
                timestamp_ms: now_ms,
            },
        );
        self.prune();
    }

    pub fn put_custom(&mut self, key: &str, prompt: &str, variations: Vec<String>, now_ms: u64) {
        self.custom.entry(key.to_owned()).or_default().insert(
            prompt.to_owned(),
            VariationEntry {
                variations,
                timestamp_ms: now_ms,
            },
        );
        self.prune();
    }

    /// Total entry count as bounded by `max_entries`: auto keys plus
    /// custom fingerprint keys.
    pub fn len(&self) -> usize {
        self.auto.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auto.is_empty() && self.custom.is_empty()
    }

    pub fn clear(&mut self) {
        self.auto.clear();
        self.custom.clear();
    }

    fn prune(&mut self) {
        if self.len() <= self.config.max_entries {
            return;
        }
        let keep = self.config.max_entries / 2;
        debug!(
            total = self.len(),
            keep, "variation cache over bound; pruning"
        );
        let mut entries: Vec<(String, VariationEntry)> = self.auto.drain(..).collect();
        // Newest first; ties keep insertion order.
        entries.sort_by(|a, b| b.1.timestamp_ms.cmp(&a.1.timestamp_ms));
        entries.truncate(keep);
        self.auto = entries.into_iter().collect();
        self.custom.clear();
    }
}
