//! Posting: a per-(term, document) record of field-wise term-frequency
//! counts. See SPEC_FULL.md §4.5, §6.

use crate::domain::location::Location;
use crate::error::{EngineError, Result};

pub const POSTING_ENCODED_LEN: usize = 12;

/// Per-field term-frequency counts for one (term, document) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occurrences {
    pub author: u32,
    pub title: u32,
    pub body: u32,
}

impl Occurrences {
    pub fn new(author: u32, title: u32, body: u32) -> Self {
        Self { author, title, body }
    }

    pub fn get(&self, field: Location) -> u32 {
        match field {
            Location::Author => self.author,
            Location::Title => self.title,
            Location::Body => self.body,
            Location::Query => 0,
        }
    }

    pub fn increment(&mut self, field: Location, by: u32) {
        match field {
            Location::Author => self.author += by,
            Location::Title => self.title += by,
            Location::Body => self.body += by,
            Location::Query => {}
        }
    }

    pub fn is_zero(&self) -> bool {
        self.author == 0 && self.title == 0 && self.body == 0
    }

    /// Three little-endian u32 counts: author, title, body.
    pub fn serialize(&self) -> [u8; POSTING_ENCODED_LEN] {
        let mut buf = [0u8; POSTING_ENCODED_LEN];
        buf[0..4].copy_from_slice(&self.author.to_le_bytes());
        buf[4..8].copy_from_slice(&self.title.to_le_bytes());
        buf[8..12].copy_from_slice(&self.body.to_le_bytes());
        buf
    }

    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < POSTING_ENCODED_LEN {
            return Err(EngineError::corruption(
                "truncated posting: expected 12 bytes of occurrence counts",
            ));
        }
        let author = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let title = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let body = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        Ok((Self { author, title, body }, POSTING_ENCODED_LEN))
    }
}

/// A fully-qualified posting, as handed to the scorer: which document,
/// which term, and the per-field occurrence counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: u32,
    pub term_id: u32,
    pub occurrences: Occurrences,
}

impl Posting {
    pub fn new(doc_id: u32, term_id: u32, occurrences: Occurrences) -> Self {
        Self {
            doc_id,
            term_id,
            occurrences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrences_round_trip() {
        let occ = Occurrences::new(3, 7, 19);
        let bytes = occ.serialize();
        let (decoded, consumed) = Occurrences::deserialize(&bytes).unwrap();
        assert_eq!(decoded, occ);
        assert_eq!(consumed, POSTING_ENCODED_LEN);
    }

    #[test]
    fn increment_routes_to_the_right_field() {
        let mut occ = Occurrences::default();
        occ.increment(Location::Title, 2);
        occ.increment(Location::Body, 5);
        assert_eq!(occ, Occurrences::new(0, 2, 5));
    }
}
