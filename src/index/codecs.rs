//! `ListCodec`/`HMapCodec` glue wiring the domain entities' own binary
//! formats into the generic write-back caches.

use crate::cache::{HMapCodec, ListCodec};
use crate::domain::{DocumentContents, DocumentInfo, PostingList, Term};
use crate::error::{EngineError, Result};

pub struct PostingListCodec;
impl ListCodec<PostingList> for PostingListCodec {
    fn encode(value: &PostingList) -> Vec<u8> {
        value.serialize()
    }
    fn decode(bytes: &[u8], _key: u64) -> Result<PostingList> {
        PostingList::deserialize(bytes)
    }
}

pub struct DocumentInfoCodec;
impl ListCodec<DocumentInfo> for DocumentInfoCodec {
    fn encode(value: &DocumentInfo) -> Vec<u8> {
        value.serialize().to_vec()
    }
    fn decode(bytes: &[u8], _key: u64) -> Result<DocumentInfo> {
        DocumentInfo::deserialize(bytes)
    }
}

pub struct DocumentContentsCodec;
impl ListCodec<DocumentContents> for DocumentContentsCodec {
    fn encode(value: &DocumentContents) -> Vec<u8> {
        value.serialize()
    }
    fn decode(bytes: &[u8], _key: u64) -> Result<DocumentContents> {
        DocumentContents::deserialize(bytes)
    }
}

/// `posting_list_len` is not part of the on-disk record (SPEC_FULL.md
/// §6); decode leaves it at 0 and the index fills it in from the
/// postings store.
pub struct TermCodec;
impl ListCodec<Term> for TermCodec {
    fn encode(value: &Term) -> Vec<u8> {
        value.serialize()
    }
    fn decode(bytes: &[u8], key: u64) -> Result<Term> {
        Term::deserialize(bytes, key as u32, 0)
    }
}

pub struct TermIdCodec;
impl HMapCodec<u32> for TermIdCodec {
    fn encode(value: &u32) -> Vec<u8> {
        value.to_le_bytes().to_vec()
    }
    fn decode(bytes: &[u8], key: &str) -> Result<u32> {
        let bytes: [u8; 4] = bytes
            .try_into()
            .map_err(|_| EngineError::corruption(format!("malformed term_id record for {key:?}")))?;
        Ok(u32::from_le_bytes(bytes))
    }
}
