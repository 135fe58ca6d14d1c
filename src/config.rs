//! Crate-wide configuration (SPEC_FULL.md §4.13).

/// BM25F constants and per-field weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25fConfig {
    pub k1: f64,
    pub b: f64,
    pub weight_author: f64,
    pub weight_title: f64,
    pub weight_body: f64,
}

impl Default for Bm25fConfig {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            weight_author: 0.5,
            weight_title: 2.0,
            weight_body: 1.0,
        }
    }
}

/// Tunables for the on-disk stores and their caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub block_size: u64,
    pub hmap_buckets: u64,
    pub document_cache_capacity: usize,
    pub term_cache_capacity: usize,
    pub posting_cache_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            hmap_buckets: 128 * 1024,
            document_cache_capacity: 1024,
            term_cache_capacity: 1024,
            posting_cache_capacity: 1024,
        }
    }
}

/// Aggregates every tunable the core consumes. There is no external
/// config-file format mandated by the spec, so none is invented here;
/// callers build this in code, same as the teacher's `Indexer` and
/// `QueryProcessor` take their knobs as constructor arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub storage: StorageConfig,
    pub bm25f: Bm25fConfig,
}
