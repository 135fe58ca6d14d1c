//! A persistent mapping from string key to an opaque byte string, built
//! atop [`FileList`] with SHA3-256 bucket assignment and per-bucket
//! chained (key, value) records. See SPEC_FULL.md §4.2.

use std::path::Path;

use sha3::{Digest, Sha3_256};

use crate::error::{EngineError, Result};
use crate::storage::file_list::FileList;

pub struct FileHMap {
    buckets: FileList,
    num_buckets: u64,
}

impl FileHMap {
    pub fn open<P: AsRef<Path>>(
        index_path: P,
        data_path: P,
        block_size: u64,
        num_buckets: u64,
    ) -> Result<Self> {
        if num_buckets == 0 {
            return Err(EngineError::configuration("num_buckets must be > 0"));
        }
        Ok(Self {
            buckets: FileList::open(index_path, data_path, block_size)?,
            num_buckets,
        })
    }

    fn bucket_id(&self, key: &str) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        let mut acc: u64 = 0;
        for byte in digest.iter() {
            acc = acc.wrapping_mul(256).wrapping_add(*byte as u64) % self.num_buckets;
        }
        acc
    }

    /// Parses one (key_len, val_len, key, value) record starting at
    /// `offset` in `bucket`. Returns (key, value, bytes_consumed).
    fn read_record(bucket: &[u8], offset: usize) -> Option<(String, Vec<u8>, usize)> {
        if offset + 16 > bucket.len() {
            return None;
        }
        let key_len = u64::from_be_bytes(bucket[offset..offset + 8].try_into().unwrap()) as usize;
        let val_len =
            u64::from_be_bytes(bucket[offset + 8..offset + 16].try_into().unwrap()) as usize;
        let key_start = offset + 16;
        let val_start = key_start + key_len;
        let val_end = val_start + val_len;
        if val_end > bucket.len() {
            return None;
        }
        let key = String::from_utf8_lossy(&bucket[key_start..val_start]).into_owned();
        let value = bucket[val_start..val_end].to_vec();
        Some((key, value, val_end - offset))
    }

    fn encode_record(key: &str, value: &[u8]) -> Vec<u8> {
        let key_bytes = key.as_bytes();
        let mut out = Vec::with_capacity(16 + key_bytes.len() + value.len());
        out.extend((key_bytes.len() as u64).to_be_bytes());
        out.extend((value.len() as u64).to_be_bytes());
        out.extend(key_bytes);
        out.extend(value);
        out
    }

    /// Returns the value stored under `key`, or an empty vector if
    /// absent (use [`contains`](Self::contains) to disambiguate from a
    /// present, empty value).
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        let bucket_id = self.bucket_id(key);
        let bucket = self.buckets.get(bucket_id)?;
        let mut offset = 0;
        while let Some((record_key, value, consumed)) = Self::read_record(&bucket, offset) {
            if record_key == key {
                return Ok(value);
            }
            offset += consumed;
        }
        Ok(Vec::new())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        let bucket_id = self.bucket_id(key);
        let bucket = self.buckets.get(bucket_id)?;
        let mut offset = 0;
        while let Some((record_key, _, consumed)) = Self::read_record(&bucket, offset) {
            if record_key == key {
                return Ok(true);
            }
            offset += consumed;
        }
        Ok(false)
    }

    /// Stores `value` under `key`. If the key is new, the record is
    /// appended to its bucket without rehashing the rest; if it
    /// already exists, the whole bucket is rewritten with the record
    /// replaced in place.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let bucket_id = self.bucket_id(key);
        let bucket = self.buckets.get(bucket_id)?;
        let mut offset = 0;
        let mut found = false;
        let mut rewritten = Vec::with_capacity(bucket.len());
        while let Some((record_key, record_value, consumed)) = Self::read_record(&bucket, offset)
        {
            if record_key == key {
                found = true;
                rewritten.extend(Self::encode_record(&record_key, value));
                log::trace!("file_hmap: rewriting bucket {bucket_id} to update key {key}");
            } else {
                rewritten.extend(Self::encode_record(&record_key, &record_value));
            }
            offset += consumed;
        }

        if found {
            self.buckets.set(bucket_id, &rewritten)?;
        } else {
            self.buckets.append(bucket_id, &Self::encode_record(key, value))?;
        }
        Ok(())
    }

    /// Deletes `key` by rewriting its bucket without the matching
    /// record, if present.
    pub fn remove(&self, key: &str) -> Result<()> {
        let bucket_id = self.bucket_id(key);
        let bucket = self.buckets.get(bucket_id)?;
        let mut offset = 0;
        let mut rewritten = Vec::with_capacity(bucket.len());
        while let Some((record_key, record_value, consumed)) = Self::read_record(&bucket, offset)
        {
            if record_key != key {
                rewritten.extend(Self::encode_record(&record_key, &record_value));
            }
            offset += consumed;
        }
        self.buckets.set(bucket_id, &rewritten)
    }
}
