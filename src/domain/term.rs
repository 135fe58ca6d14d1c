//! Term: the lexicon entry for one distinct token text. See
//! SPEC_FULL.md §3, §6.

use crate::error::{EngineError, Result};

/// Metadata that rides along with a term but is not part of its
/// on-disk record (`posting_list_len` is reconstructed from the
/// posting list, per §6's note on the wire format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermInfo {
    pub posting_list_len: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub term_id: u32,
    pub text: String,
    pub info: TermInfo,
}

impl Term {
    pub fn new(term_id: u32, text: impl Into<String>, posting_list_len: u32) -> Self {
        Self {
            term_id,
            text: text.into(),
            info: TermInfo { posting_list_len },
        }
    }

    /// `i32 idf_placeholder ‖ i32 term_len ‖ term_bytes`. The
    /// placeholder is reserved and always written as 0; the canonical
    /// document frequency lives in `info.posting_list_len`, kept
    /// in-memory by the index rather than duplicated on disk.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.text.len());
        out.extend(0i32.to_le_bytes());
        out.extend((self.text.len() as i32).to_le_bytes());
        out.extend(self.text.as_bytes());
        out
    }

    /// Reconstructs a `Term` from its on-disk bytes, with
    /// `posting_list_len` supplied by the caller (the index tracks it
    /// separately; see SPEC_FULL.md §6).
    pub fn deserialize(bytes: &[u8], term_id: u32, posting_list_len: u32) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(EngineError::corruption(
                "truncated term record: missing length prefixes",
            ));
        }
        let term_len = i32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        if 8 + term_len > bytes.len() {
            return Err(EngineError::corruption(
                "truncated term record: text runs past end of buffer",
            ));
        }
        let text = String::from_utf8(bytes[8..8 + term_len].to_vec())
            .map_err(|e| EngineError::corruption(format!("invalid utf-8 in term record: {e}")))?;
        Ok(Self {
            term_id,
            text,
            info: TermInfo { posting_list_len },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text() {
        let term = Term::new(3, "caffettin", 5);
        let bytes = term.serialize();
        let decoded = Term::deserialize(&bytes, 3, 5).unwrap();
        assert_eq!(decoded, term);
    }
}
