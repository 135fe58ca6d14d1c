//! A bounded, write-back LRU cache over [`FileHMap`](crate::storage::FileHMap),
//! keyed by string.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::error::Result;
use crate::storage::FileHMap;

pub trait HMapCodec<T> {
    fn encode(value: &T) -> Vec<u8>;
    fn decode(bytes: &[u8], key: &str) -> Result<T>;
}

struct Entry<T> {
    value: T,
    dirty: bool,
}

pub struct CachedHMap<T, C: HMapCodec<T>> {
    store: FileHMap,
    cache: LruCache<String, Entry<T>>,
    _codec: std::marker::PhantomData<C>,
}

impl<T, C: HMapCodec<T>> CachedHMap<T, C> {
    pub fn new(store: FileHMap, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            store,
            cache: LruCache::new(capacity),
            _codec: std::marker::PhantomData,
        }
    }

    fn write_back(&self, key: &str, entry: &Entry<T>) -> Result<()> {
        if entry.dirty {
            self.store.set(key, &C::encode(&entry.value))?;
            log::trace!("cached_hmap: wrote back dirty entry for key {key}");
        }
        Ok(())
    }

    fn push_and_maybe_evict(&mut self, key: String, entry: Entry<T>) -> Result<()> {
        if let Some((evicted_key, evicted_entry)) = self.cache.push(key.clone(), entry) {
            if evicted_key != key {
                self.write_back(&evicted_key, &evicted_entry)?;
            }
        }
        Ok(())
    }

    pub fn get(&mut self, key: &str) -> Result<T>
    where
        T: Clone,
    {
        if let Some(entry) = self.cache.get(key) {
            return Ok(entry.value.clone());
        }
        let bytes = self.store.get(key)?;
        let value = C::decode(&bytes, key)?;
        self.push_and_maybe_evict(
            key.to_string(),
            Entry {
                value: value.clone(),
                dirty: false,
            },
        )?;
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: T) -> Result<()> {
        self.push_and_maybe_evict(
            key.to_string(),
            Entry {
                value,
                dirty: true,
            },
        )
    }

    /// Whether `key` has a value, either cached or in the backing
    /// store, without disturbing LRU order.
    pub fn contains(&self, key: &str) -> Result<bool> {
        if self.cache.peek(key).is_some() {
            return Ok(true);
        }
        self.store.contains(key)
    }

    pub fn flush(&mut self) -> Result<()> {
        for (key, entry) in self.cache.iter_mut() {
            if entry.dirty {
                self.store.set(key, &C::encode(&entry.value))?;
                entry.dirty = false;
            }
        }
        Ok(())
    }
}

impl<T, C: HMapCodec<T>> Drop for CachedHMap<T, C> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::warn!("cached_hmap: flush on drop failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct StringCodec;
    impl HMapCodec<String> for StringCodec {
        fn encode(value: &String) -> Vec<u8> {
            value.as_bytes().to_vec()
        }
        fn decode(bytes: &[u8], _key: &str) -> Result<String> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    #[test]
    fn eviction_writes_back_dirty_entries() {
        let dir = tempdir().unwrap();
        let store = FileHMap::open(dir.path().join("i"), dir.path().join("d"), 32, 4).unwrap();
        {
            let mut cache: CachedHMap<String, StringCodec> = CachedHMap::new(store, 4);
            for k in 0..7 {
                cache
                    .set(&format!("key-{k}"), format!("value-{k}"))
                    .unwrap();
            }
        }
        let store = FileHMap::open(dir.path().join("i"), dir.path().join("d"), 32, 4).unwrap();
        for k in 0..7 {
            assert_eq!(
                store.get(&format!("key-{k}")).unwrap(),
                format!("value-{k}").into_bytes()
            );
        }
    }
}
