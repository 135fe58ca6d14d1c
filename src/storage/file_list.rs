//! A persistent mapping from integer key to an opaque byte string.
//!
//! Backed by two files: a flat index file of fixed 16-byte slots
//! (offset, length), and a data file of fixed-size blocks chained by a
//! trailing next-offset pointer. See SPEC_FULL.md §4.1 for the exact
//! on-disk layout.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

const SLOT_SIZE: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    offset: u64,
    length: u64,
}

impl Slot {
    fn absent() -> Self {
        Slot { offset: 0, length: 0 }
    }

    fn is_absent(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}

pub struct FileList {
    index_path: PathBuf,
    data_path: PathBuf,
    block_size: u64,
    payload_size: usize,
}

impl FileList {
    /// Opens (creating if necessary) a FileList backed by the given
    /// index/data file paths. `block_size` must be at least 9 bytes
    /// (one payload byte plus the 8-byte next-offset pointer).
    pub fn open<P: AsRef<Path>>(index_path: P, data_path: P, block_size: u64) -> Result<Self> {
        if block_size < 9 {
            return Err(EngineError::configuration(format!(
                "block size {block_size} is too small; must be >= 9"
            )));
        }
        let index_path = index_path.as_ref().to_path_buf();
        let data_path = data_path.as_ref().to_path_buf();
        // Touch both files into existence.
        OpenOptions::new().create(true).append(true).open(&index_path)?;
        OpenOptions::new().create(true).append(true).open(&data_path)?;
        Ok(Self {
            index_path,
            data_path,
            block_size,
            payload_size: (block_size - 8) as usize,
        })
    }

    fn index_file(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.index_path)?)
    }

    fn data_file(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.data_path)?)
    }

    fn read_slot(&self, key: u64) -> Result<Slot> {
        let mut file = self.index_file()?;
        let pos = key * SLOT_SIZE;
        let len = file.metadata()?.len();
        if pos + SLOT_SIZE > len {
            return Ok(Slot::absent());
        }
        file.seek(SeekFrom::Start(pos))?;
        let mut buf = [0u8; 16];
        file.read_exact(&mut buf)?;
        let offset = u64::from_be_bytes(buf[0..8].try_into().unwrap());
        let length = u64::from_be_bytes(buf[8..16].try_into().unwrap());
        Ok(Slot { offset, length })
    }

    fn write_slot(&self, key: u64, offset: u64, length: u64) -> Result<()> {
        let mut file = self.index_file()?;
        let pos = key * SLOT_SIZE;
        file.seek(SeekFrom::Start(pos))?;
        let mut buf = [0u8; 16];
        buf[0..8].copy_from_slice(&offset.to_be_bytes());
        buf[8..16].copy_from_slice(&length.to_be_bytes());
        file.write_all(&buf)?;
        Ok(())
    }

    fn data_len(&self) -> Result<u64> {
        Ok(self.data_file()?.metadata()?.len())
    }

    /// Reads the full block at `offset`: (payload, next_offset).
    fn read_block(&self, offset: u64) -> Result<(Vec<u8>, u64)> {
        let mut file = self.data_file()?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; self.block_size as usize];
        file.read_exact(&mut buf).map_err(|_| {
            EngineError::corruption(format!(
                "truncated block read at offset {offset}: expected {} bytes",
                self.block_size
            ))
        })?;
        let next_offset = u64::from_be_bytes(
            buf[self.payload_size..self.payload_size + 8]
                .try_into()
                .unwrap(),
        );
        buf.truncate(self.payload_size);
        Ok((buf, next_offset))
    }

    fn read_block_next(&self, offset: u64) -> Result<u64> {
        Ok(self.read_block(offset)?.1)
    }

    /// Writes `payload` (zero-padded to the payload size) and
    /// `next_offset` at `offset`, skipping the write if the bytes on
    /// disk are already identical.
    fn write_block(&self, offset: u64, payload: &[u8], next_offset: u64) -> Result<()> {
        debug_assert!(payload.len() <= self.payload_size);
        let mut block = vec![0u8; self.block_size as usize];
        block[..payload.len()].copy_from_slice(payload);
        block[self.payload_size..].copy_from_slice(&next_offset.to_be_bytes());

        let mut file = self.data_file()?;
        let file_len = file.metadata()?.len();
        if offset + self.block_size <= file_len {
            let mut existing = vec![0u8; self.block_size as usize];
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut existing)?;
            if existing == block {
                log::trace!("file_list: skipping identical block write at offset {offset}");
                return Ok(());
            }
        }
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&block)?;
        log::trace!("file_list: wrote block at offset {offset}, next={next_offset}");
        Ok(())
    }

    /// Returns the byte string stored under `key`, or an empty vector
    /// if `key` is absent.
    pub fn get(&self, key: u64) -> Result<Vec<u8>> {
        let slot = self.read_slot(key)?;
        if slot.is_absent() {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(slot.length as usize);
        let mut offset = slot.offset;
        let mut remaining = slot.length as usize;
        while remaining > 0 {
            let (payload, next) = self.read_block(offset)?;
            let take = remaining.min(self.payload_size);
            out.extend_from_slice(&payload[..take]);
            remaining -= take;
            if remaining == 0 {
                break;
            }
            if next == 0 {
                return Err(EngineError::corruption(format!(
                    "chain for key {key} ended before its declared length was consumed"
                )));
            }
            offset = next;
        }
        Ok(out)
    }

    /// Returns a lazy, one-shot stream of the chunks making up the
    /// value stored under `key`, without buffering the whole value.
    pub fn get_stream(&self, key: u64) -> Result<BlockStream<'_>> {
        let slot = self.read_slot(key)?;
        Ok(BlockStream {
            store: self,
            next_offset: if slot.is_absent() { None } else { Some(slot.offset) },
            remaining: slot.length as usize,
        })
    }

    /// Stores `value` under `key`, reusing and extending any existing
    /// block chain in place.
    pub fn set(&self, key: u64, value: &[u8]) -> Result<()> {
        let slot = self.read_slot(key)?;
        let mut append_cursor = self.data_len()?;

        let mut in_old_chain = !slot.is_absent();
        let first_offset = if in_old_chain {
            slot.offset
        } else {
            let o = append_cursor;
            append_cursor += self.block_size;
            o
        };

        let mut offset = first_offset;
        let mut remaining = value;

        loop {
            let existing_next = if in_old_chain {
                self.read_block_next(offset)?
            } else {
                0
            };

            let take = remaining.len().min(self.payload_size);
            let chunk = &remaining[..take];
            remaining = &remaining[take..];
            let more = !remaining.is_empty();

            let next_to_write = if more {
                if in_old_chain && existing_next != 0 {
                    existing_next
                } else {
                    let o = append_cursor;
                    append_cursor += self.block_size;
                    o
                }
            } else {
                existing_next
            };

            self.write_block(offset, chunk, next_to_write)?;

            if !more {
                break;
            }
            in_old_chain = in_old_chain && existing_next != 0 && next_to_write == existing_next;
            offset = next_to_write;
        }

        self.write_slot(key, first_offset, value.len() as u64)?;
        Ok(())
    }

    /// Appends `value` to the byte string already stored under `key`
    /// (or stores it fresh if `key` is absent), overwriting the tail
    /// block's unused payload bytes before allocating new blocks.
    pub fn append(&self, key: u64, value: &[u8]) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        let slot = self.read_slot(key)?;
        if slot.is_absent() {
            return self.set(key, value);
        }

        let mut offset = slot.offset;
        let mut tail_payload;
        loop {
            let (payload, next) = self.read_block(offset)?;
            if next == 0 {
                tail_payload = payload;
                break;
            }
            offset = next;
        }

        let used_total = slot.length as usize;
        let used_in_tail = if used_total == 0 {
            0
        } else {
            let m = used_total % self.payload_size;
            if m == 0 {
                self.payload_size
            } else {
                m
            }
        };
        let free_in_tail = self.payload_size - used_in_tail;

        let mut append_cursor = self.data_len()?;
        let mut remaining = value;

        let take = remaining.len().min(free_in_tail);
        tail_payload[used_in_tail..used_in_tail + take].copy_from_slice(&remaining[..take]);
        remaining = &remaining[take..];

        let tail_next = if remaining.is_empty() {
            0
        } else {
            let o = append_cursor;
            append_cursor += self.block_size;
            o
        };
        self.write_block(offset, &tail_payload, tail_next)?;

        let mut cur_offset = tail_next;
        while !remaining.is_empty() {
            let take = remaining.len().min(self.payload_size);
            let chunk = &remaining[..take];
            remaining = &remaining[take..];
            let next = if remaining.is_empty() {
                0
            } else {
                let o = append_cursor;
                append_cursor += self.block_size;
                o
            };
            self.write_block(cur_offset, chunk, next)?;
            cur_offset = next;
        }

        self.write_slot(key, slot.offset, slot.length + value.len() as u64)?;
        Ok(())
    }

    /// The smallest key strictly greater than every key ever assigned.
    pub fn next_key(&self) -> Result<u64> {
        let index_len = self.index_file()?.metadata()?.len();
        Ok(index_len / SLOT_SIZE)
    }

    /// The smallest key for which [`get`](Self::get) would report absent.
    /// O(n) in the number of keys ever assigned.
    pub fn next_available_key(&self) -> Result<u64> {
        let bound = self.next_key()?;
        for k in 0..bound {
            if self.read_slot(k)?.is_absent() {
                return Ok(k);
            }
        }
        Ok(bound)
    }

    /// Whether `key` currently has a value (distinguishes absence from
    /// a present, empty value).
    pub fn contains(&self, key: u64) -> Result<bool> {
        Ok(!self.read_slot(key)?.is_absent())
    }
}

/// A finite, pull-based stream over the chunks of a [`FileList`] value.
pub struct BlockStream<'a> {
    store: &'a FileList,
    next_offset: Option<u64>,
    remaining: usize,
}

impl<'a> Iterator for BlockStream<'a> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let offset = self.next_offset?;
        match self.store.read_block(offset) {
            Ok((payload, next)) => {
                let take = self.remaining.min(self.store.payload_size);
                self.remaining -= take;
                self.next_offset = if self.remaining == 0 { None } else { Some(next) };
                if self.remaining > 0 && next == 0 {
                    return Some(Err(EngineError::corruption(
                        "chain ended before declared length was consumed",
                    )));
                }
                Some(Ok(payload[..take].to_vec()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_list(dir: &Path, block_size: u64) -> FileList {
        FileList::open(dir.join("index"), dir.join("data"), block_size).unwrap()
    }

    #[test]
    fn rejects_too_small_block_size() {
        let dir = tempdir().unwrap();
        let result = FileList::open(dir.path().join("i"), dir.path().join("d"), 4);
        assert!(result.is_err());
    }

    #[test]
    fn get_on_absent_key_is_empty_not_error() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 16);
        assert_eq!(list.get(7).unwrap(), Vec::<u8>::new());
        assert!(!list.contains(7).unwrap());
    }

    #[test]
    fn round_trip_with_shrink_and_grow() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 16);
        let values = [
            "pls",
            "work",
            "hello world",
            "this is a test",
            "of the file map class",
            "it should work",
            "caffettin, caffettin",
            "lo bevo, e so contento",
        ];
        for (i, v) in values.iter().enumerate() {
            list.set(i as u64, v.as_bytes()).unwrap();
        }
        for (i, v) in values.iter().enumerate() {
            assert_eq!(list.get(i as u64).unwrap(), v.as_bytes());
        }

        // Overwrite each with a longer value.
        for (i, v) in values.iter().enumerate() {
            let longer = format!("{v}-{v}-{v}-extra-long-suffix-to-force-growth");
            list.set(i as u64, longer.as_bytes()).unwrap();
            assert_eq!(list.get(i as u64).unwrap(), longer.as_bytes());
        }

        // Overwrite each with a shorter value.
        for (i, _) in values.iter().enumerate() {
            let shorter = "x";
            list.set(i as u64, shorter.as_bytes()).unwrap();
            assert_eq!(list.get(i as u64).unwrap(), shorter.as_bytes());
        }
    }

    #[test]
    fn last_write_wins() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 32);
        list.set(0, b"first").unwrap();
        list.set(0, b"second").unwrap();
        list.set(0, b"third value here").unwrap();
        assert_eq!(list.get(0).unwrap(), b"third value here");
    }

    #[test]
    fn append_extends_value_across_blocks() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 16);
        list.set(0, b"abc").unwrap();
        list.append(0, b"def").unwrap();
        list.append(0, b"ghijklmnopqrstuvwxyz").unwrap();
        assert_eq!(list.get(0).unwrap(), b"abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn append_on_absent_key_behaves_like_set() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 16);
        list.append(3, b"fresh value").unwrap();
        assert_eq!(list.get(3).unwrap(), b"fresh value");
    }

    #[test]
    fn get_stream_yields_exact_total_length() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 16);
        let value = b"this value spans several fixed-size blocks";
        list.set(0, value).unwrap();
        let mut collected = Vec::new();
        for chunk in list.get_stream(0).unwrap() {
            collected.extend(chunk.unwrap());
        }
        assert_eq!(collected, value);
    }

    #[test]
    fn next_key_and_next_available_key() {
        let dir = tempdir().unwrap();
        let list = open_list(dir.path(), 16);
        assert_eq!(list.next_key().unwrap(), 0);
        list.set(0, b"a").unwrap();
        list.set(1, b"b").unwrap();
        list.set(3, b"d").unwrap();
        assert_eq!(list.next_key().unwrap(), 4);
        assert_eq!(list.next_available_key().unwrap(), 2);
    }
}
