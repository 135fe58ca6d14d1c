//! PostingList: an ordered mapping from doc_id to Posting, strictly
//! increasing in doc_id. See SPEC_FULL.md §3, §4.5, §6.

use crate::codec::varbyte::{decode_vb_dgaps, encode_vb_dgaps};
use crate::domain::posting::{Occurrences, POSTING_ENCODED_LEN};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    /// Strictly increasing by construction; see [`push`](Self::push).
    entries: Vec<(u32, Occurrences)>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, Occurrences)> {
        self.entries.iter()
    }

    pub fn get(&self, doc_id: u32) -> Option<&Occurrences> {
        self.entries
            .binary_search_by_key(&doc_id, |(id, _)| *id)
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Appends a new trailing entry, or merges into the last entry if
    /// it already carries this doc_id. `doc_id` must be `>=` the
    /// current maximum.
    pub fn push_or_merge(&mut self, doc_id: u32, occurrences: Occurrences) {
        if let Some(last) = self.entries.last_mut() {
            if last.0 == doc_id {
                last.1.author += occurrences.author;
                last.1.title += occurrences.title;
                last.1.body += occurrences.body;
                return;
            }
            debug_assert!(doc_id > last.0, "posting list doc_ids must be strictly increasing");
        }
        self.entries.push((doc_id, occurrences));
    }

    /// Serializes as `u32(len(C)) ‖ C ‖ Posting[0..n]`, where
    /// `C = VB(d-gaps(doc_ids))`.
    pub fn serialize(&self) -> Vec<u8> {
        let doc_ids: Vec<u64> = self.entries.iter().map(|(id, _)| *id as u64).collect();
        let compressed = encode_vb_dgaps(&doc_ids);

        let mut out = Vec::with_capacity(4 + compressed.len() + self.entries.len() * POSTING_ENCODED_LEN);
        out.extend((compressed.len() as u32).to_le_bytes());
        out.extend(&compressed);
        for (_, occurrences) in &self.entries {
            out.extend(occurrences.serialize());
        }
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            if bytes.is_empty() {
                return Ok(Self::default());
            }
            return Err(EngineError::corruption("truncated posting list length prefix"));
        }
        let compressed_len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let mut offset = 4;
        if offset + compressed_len > bytes.len() {
            return Err(EngineError::corruption(
                "posting list compressed doc-id block runs past end of buffer",
            ));
        }
        let doc_ids = decode_vb_dgaps(&bytes[offset..offset + compressed_len]);
        offset += compressed_len;

        let mut entries = Vec::with_capacity(doc_ids.len());
        for doc_id in doc_ids {
            let (occurrences, consumed) = Occurrences::deserialize(&bytes[offset..])?;
            offset += consumed;
            entries.push((doc_id as u32, occurrences));
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_strictly_increasing_entries() {
        let mut list = PostingList::new();
        list.push_or_merge(1, Occurrences::new(1, 0, 2));
        list.push_or_merge(5, Occurrences::new(0, 3, 0));
        list.push_or_merge(100, Occurrences::new(2, 2, 2));

        let bytes = list.serialize();
        let decoded = PostingList::deserialize(&bytes).unwrap();
        assert_eq!(decoded, list);
        assert_eq!(decoded.get(5), Some(&Occurrences::new(0, 3, 0)));
        assert_eq!(decoded.get(42), None);
    }

    #[test]
    fn empty_list_round_trips() {
        let list = PostingList::new();
        let bytes = list.serialize();
        assert_eq!(PostingList::deserialize(&bytes).unwrap(), list);
    }

    #[test]
    fn repeated_doc_id_merges_occurrences() {
        let mut list = PostingList::new();
        list.push_or_merge(3, Occurrences::new(1, 0, 0));
        list.push_or_merge(3, Occurrences::new(0, 1, 0));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(3), Some(&Occurrences::new(1, 1, 0)));
    }
}
