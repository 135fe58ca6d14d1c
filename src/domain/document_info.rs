//! DocumentInfo: per-document token-count lengths, derived once at
//! ingestion. See SPEC_FULL.md §3, §6.

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInfo {
    pub doc_id: u32,
    /// [author_len, title_len, body_len], in tokens.
    pub lengths: [u32; 3],
}

impl DocumentInfo {
    pub fn new(doc_id: u32, author_len: u32, title_len: u32, body_len: u32) -> Self {
        Self {
            doc_id,
            lengths: [author_len, title_len, body_len],
        }
    }

    /// Four little-endian i32 fields: id, author_len, title_len, body_len.
    pub fn serialize(&self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[0..4].copy_from_slice(&(self.doc_id as i32).to_le_bytes());
        buf[4..8].copy_from_slice(&(self.lengths[0] as i32).to_le_bytes());
        buf[8..12].copy_from_slice(&(self.lengths[1] as i32).to_le_bytes());
        buf[12..16].copy_from_slice(&(self.lengths[2] as i32).to_le_bytes());
        buf
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 16 {
            return Err(EngineError::corruption(
                "truncated document info: expected 16 bytes",
            ));
        }
        let doc_id = i32::from_le_bytes(bytes[0..4].try_into().unwrap()) as u32;
        let author_len = i32::from_le_bytes(bytes[4..8].try_into().unwrap()) as u32;
        let title_len = i32::from_le_bytes(bytes[8..12].try_into().unwrap()) as u32;
        let body_len = i32::from_le_bytes(bytes[12..16].try_into().unwrap()) as u32;
        Ok(Self {
            doc_id,
            lengths: [author_len, title_len, body_len],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let info = DocumentInfo::new(7, 2, 5, 120);
        let bytes = info.serialize();
        assert_eq!(DocumentInfo::deserialize(&bytes).unwrap(), info);
    }
}
