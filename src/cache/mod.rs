//! Write-back LRU caches wrapping the on-disk stores, per SPEC_FULL.md §4.3.

pub mod cached_hmap;
pub mod cached_list;

pub use cached_hmap::{CachedHMap, HMapCodec};
pub use cached_list::{CachedList, ListCodec};
