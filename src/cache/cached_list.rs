//! A bounded, write-back LRU cache over [`FileList`](crate::storage::FileList),
//! keyed by integer.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::error::Result;
use crate::storage::FileList;

/// The (de)serialization contract a value type provides to be cached.
/// `decode` receives the key because some domain records (e.g. a
/// `DocumentInfo`) are cheaper to reconstruct with it in hand.
pub trait ListCodec<T> {
    fn encode(value: &T) -> Vec<u8>;
    fn decode(bytes: &[u8], key: u64) -> Result<T>;
}

struct Entry<T> {
    value: T,
    dirty: bool,
}

pub struct CachedList<T, C: ListCodec<T>> {
    store: FileList,
    cache: LruCache<u64, Entry<T>>,
    next_key: u64,
    _codec: std::marker::PhantomData<C>,
}

impl<T, C: ListCodec<T>> CachedList<T, C> {
    pub fn new(store: FileList, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        let next_key = store.next_key()?;
        Ok(Self {
            store,
            cache: LruCache::new(capacity),
            next_key,
            _codec: std::marker::PhantomData,
        })
    }

    /// The smallest key not yet assigned by this cache, accounting for
    /// entries still only held dirty in the cache (not yet flushed to
    /// the backing store).
    pub fn next_key(&self) -> u64 {
        self.next_key
    }

    /// Sets `value` under the next unassigned key and returns it.
    pub fn append_new(&mut self, value: T) -> Result<u64> {
        let key = self.next_key;
        self.set(key, value)?;
        Ok(key)
    }

    fn write_back(&self, key: u64, entry: &Entry<T>) -> Result<()> {
        if entry.dirty {
            self.store.set(key, &C::encode(&entry.value))?;
            log::trace!("cached_list: wrote back dirty entry for key {key}");
        }
        Ok(())
    }

    /// Evicts the least-recently-used entry if the cache is at
    /// capacity, writing it back first if dirty. `key` is the key
    /// about to be inserted (used only to detect the no-op case where
    /// `push` reports the very key we are re-inserting).
    fn push_and_maybe_evict(&mut self, key: u64, entry: Entry<T>) -> Result<()> {
        if let Some((evicted_key, evicted_entry)) = self.cache.push(key, entry) {
            if evicted_key != key {
                self.write_back(evicted_key, &evicted_entry)?;
            }
        }
        Ok(())
    }

    /// Fetches the value for `key`, hitting the store on a cache miss.
    pub fn get(&mut self, key: u64) -> Result<T>
    where
        T: Clone,
    {
        if let Some(entry) = self.cache.get(&key) {
            return Ok(entry.value.clone());
        }
        let bytes = self.store.get(key)?;
        let value = C::decode(&bytes, key)?;
        self.push_and_maybe_evict(
            key,
            Entry {
                value: value.clone(),
                dirty: false,
            },
        )?;
        Ok(value)
    }

    /// Sets the value for `key`, marking it dirty for later write-back.
    pub fn set(&mut self, key: u64, value: T) -> Result<()> {
        self.next_key = self.next_key.max(key + 1);
        self.push_and_maybe_evict(
            key,
            Entry {
                value,
                dirty: true,
            },
        )
    }

    /// Writes back every dirty entry currently cached, without
    /// evicting them.
    pub fn flush(&mut self) -> Result<()> {
        for (key, entry) in self.cache.iter_mut() {
            if entry.dirty {
                self.store.set(*key, &C::encode(&entry.value))?;
                entry.dirty = false;
            }
        }
        Ok(())
    }
}

impl<T, C: ListCodec<T>> Drop for CachedList<T, C> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::warn!("cached_list: flush on drop failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct StringCodec;
    impl ListCodec<String> for StringCodec {
        fn encode(value: &String) -> Vec<u8> {
            value.as_bytes().to_vec()
        }
        fn decode(bytes: &[u8], _key: u64) -> Result<String> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }

    #[test]
    fn eviction_writes_back_dirty_entries() {
        let dir = tempdir().unwrap();
        let store = FileList::open(dir.path().join("i"), dir.path().join("d"), 32).unwrap();
        {
            let mut cache: CachedList<String, StringCodec> = CachedList::new(store, 4).unwrap();
            for k in 0..7u64 {
                cache.set(k, format!("value-{k}")).unwrap();
            }
        }
        // Reopen the store directly and check every value made it to disk.
        let store = FileList::open(dir.path().join("i"), dir.path().join("d"), 32).unwrap();
        for k in 0..7u64 {
            assert_eq!(store.get(k).unwrap(), format!("value-{k}").into_bytes());
        }
    }

    #[test]
    fn get_after_set_returns_the_same_value() {
        let dir = tempdir().unwrap();
        let store = FileList::open(dir.path().join("i"), dir.path().join("d"), 32).unwrap();
        let mut cache: CachedList<String, StringCodec> = CachedList::new(store, 2).unwrap();
        cache.set(0, "hello".to_string()).unwrap();
        assert_eq!(cache.get(0).unwrap(), "hello");
    }
}
