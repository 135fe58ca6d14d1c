//! The Index core (SPEC_FULL.md §4.6): composes the on-disk stores and
//! their caches into an inverted index, a forward store, and a
//! lexicon, and tracks the global aggregates BM25F needs.

mod codecs;

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cache::{CachedHMap, CachedList};
use crate::config::EngineConfig;
use crate::domain::{DocumentContents, DocumentInfo, Location, Occurrences, Posting, PostingList, Term};
use crate::error::Result;
use crate::scoring::GlobalInfo;
use crate::storage::{FileHMap, FileList};
use crate::tokenizer::{Token, Tokenizer};

use codecs::{DocumentContentsCodec, DocumentInfoCodec, PostingListCodec, TermCodec, TermIdCodec};

/// How often `bulk_index_documents` logs progress when `verbose` is set.
const PROGRESS_LOG_INTERVAL: usize = 1000;

#[derive(Serialize, Deserialize)]
struct FieldLengthsJson {
    author: u64,
    title: u64,
    body: u64,
}

#[derive(Serialize, Deserialize)]
struct GlobalInfoJson {
    field_lengths: FieldLengthsJson,
    num_docs: u64,
}

impl From<&GlobalInfo> for GlobalInfoJson {
    fn from(g: &GlobalInfo) -> Self {
        Self {
            field_lengths: FieldLengthsJson {
                author: g.field_lengths[0],
                title: g.field_lengths[1],
                body: g.field_lengths[2],
            },
            num_docs: g.num_docs,
        }
    }
}

impl From<GlobalInfoJson> for GlobalInfo {
    fn from(j: GlobalInfoJson) -> Self {
        Self {
            field_lengths: [j.field_lengths.author, j.field_lengths.title, j.field_lengths.body],
            num_docs: j.num_docs,
        }
    }
}

/// The persistent inverted index: postings, a forward store of
/// document info/contents, a lexicon, and global aggregates.
pub struct Index {
    postings: CachedList<PostingList, PostingListCodec>,
    document_info: CachedList<DocumentInfo, DocumentInfoCodec>,
    document_contents: CachedList<DocumentContents, DocumentContentsCodec>,
    terms: CachedList<Term, TermCodec>,
    term_lookup: CachedHMap<u32, TermIdCodec>,
    global_info: GlobalInfo,
    global_info_path: PathBuf,
}

impl Index {
    /// Opens (creating if necessary) an index rooted at `dir`,
    /// reloading `global_info.json` if it already exists.
    pub fn open<P: AsRef<Path>>(dir: P, config: &EngineConfig) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let block_size = config.storage.block_size;

        let postings_store = FileList::open(dir.join("postings.index"), dir.join("postings.data"), block_size)?;
        let postings = CachedList::new(postings_store, config.storage.posting_cache_capacity)?;

        let document_info_store = FileList::open(
            dir.join("document_info.index"),
            dir.join("document_info.data"),
            block_size,
        )?;
        let document_info = CachedList::new(document_info_store, config.storage.document_cache_capacity)?;

        let document_contents_store = FileList::open(
            dir.join("document_contents.index"),
            dir.join("document_contents.data"),
            block_size,
        )?;
        let document_contents = CachedList::new(document_contents_store, config.storage.document_cache_capacity)?;

        let terms_store = FileList::open(dir.join("terms.index"), dir.join("terms.data"), block_size)?;
        let terms = CachedList::new(terms_store, config.storage.term_cache_capacity)?;

        let term_lookup_store = FileHMap::open(
            dir.join("term_lookup.index"),
            dir.join("term_lookup.data"),
            block_size,
            config.storage.hmap_buckets,
        )?;
        let term_lookup = CachedHMap::new(term_lookup_store, config.storage.term_cache_capacity);

        let global_info_path = dir.join("global_info.json");
        let global_info = match fs::read(&global_info_path) {
            Ok(bytes) => serde_json::from_slice::<GlobalInfoJson>(&bytes)?.into(),
            Err(_) => GlobalInfo::default(),
        };

        Ok(Self {
            postings,
            document_info,
            document_contents,
            terms,
            term_lookup,
            global_info,
            global_info_path,
        })
    }

    fn term_id_for(&mut self, text: &str) -> Result<u32> {
        if self.term_lookup.contains(text)? {
            return self.term_lookup.get(text);
        }
        let term_id = self.terms.next_key() as u32;
        self.terms.set(term_id as u64, Term::new(term_id, text, 0))?;
        self.term_lookup.set(text, term_id)?;
        log::debug!("index: allocated term_id {term_id} for {text:?}");
        Ok(term_id)
    }

    fn map_terms_to_ids(&mut self, tokens: &[Token]) -> Result<Vec<u32>> {
        tokens.iter().map(|t| self.term_id_for(&t.text)).collect()
    }

    fn update_postings(&mut self, term_ids: &[u32], doc_id: u32, location: Location) -> Result<()> {
        for &term_id in term_ids {
            let mut list = self.postings.get(term_id as u64)?;
            let mut delta = Occurrences::default();
            delta.increment(location, 1);
            list.push_or_merge(doc_id, delta);
            self.postings.set(term_id as u64, list)?;
        }
        Ok(())
    }

    /// Tokenizes and indexes one document. Returns the assigned
    /// `doc_id`, or `None` if an `external_doc_id` less than the next
    /// allocated id made this an idempotent re-ingestion (silently
    /// skipped, not an error).
    pub fn index_document(
        &mut self,
        doc: &DocumentContents,
        tokenizer: &dyn Tokenizer,
        external_doc_id: Option<u32>,
    ) -> Result<Option<u32>> {
        let next_id = self.document_info.next_key() as u32;
        if let Some(external_id) = external_doc_id {
            if external_id < next_id {
                log::debug!("index: skipping re-ingested doc_id {external_id} (next is {next_id})");
                return Ok(None);
            }
        }
        let doc_id = next_id;

        let tokens = tokenizer.tokenize_document(doc)?;
        if tokens.is_empty() {
            log::warn!("index: document {doc_id} tokenized to zero tokens");
        }

        let author_tokens: Vec<Token> = tokens.iter().filter(|t| t.location == Location::Author).cloned().collect();
        let title_tokens: Vec<Token> = tokens.iter().filter(|t| t.location == Location::Title).cloned().collect();
        let body_tokens: Vec<Token> = tokens.iter().filter(|t| t.location == Location::Body).cloned().collect();

        let lengths = [
            author_tokens.len() as u32,
            title_tokens.len() as u32,
            body_tokens.len() as u32,
        ];
        self.global_info.add_document(lengths);

        let author_ids = self.map_terms_to_ids(&author_tokens)?;
        let title_ids = self.map_terms_to_ids(&title_tokens)?;
        let body_ids = self.map_terms_to_ids(&body_tokens)?;

        self.document_info
            .set(doc_id as u64, DocumentInfo::new(doc_id, lengths[0], lengths[1], lengths[2]))?;
        self.document_contents.set(doc_id as u64, doc.clone())?;

        self.update_postings(&author_ids, doc_id, Location::Author)?;
        self.update_postings(&title_ids, doc_id, Location::Title)?;
        self.update_postings(&body_ids, doc_id, Location::Body)?;

        log::debug!("index: indexed document {doc_id}");
        Ok(Some(doc_id))
    }

    /// Indexes `docs` in order, then persists. `verbose` logs progress
    /// at a coarse interval rather than printing directly.
    pub fn bulk_index_documents<I>(&mut self, docs: I, tokenizer: &dyn Tokenizer, verbose: bool) -> Result<()>
    where
        I: IntoIterator<Item = DocumentContents>,
    {
        let mut count = 0usize;
        for doc in docs {
            self.index_document(&doc, tokenizer, None)?;
            count += 1;
            if verbose && count.is_multiple_of(PROGRESS_LOG_INTERVAL) {
                log::info!("bulk_index_documents: indexed {count} documents so far");
            }
        }
        log::info!("bulk_index_documents: indexed {count} documents total");
        self.save()?;
        Ok(())
    }

    pub fn get_postings(&mut self, term_id: u32) -> Result<PostingList> {
        self.postings.get(term_id as u64)
    }

    /// The postings for `term_id`, keyed by `doc_id`, for the
    /// candidate-gathering step of DAAT retrieval.
    pub fn get_postings_by_doc(&mut self, term_id: u32) -> Result<FxHashMap<u32, Posting>> {
        Ok(self
            .get_postings(term_id)?
            .iter()
            .map(|(doc_id, occurrences)| (*doc_id, Posting::new(*doc_id, term_id, *occurrences)))
            .collect())
    }

    pub fn get_document_info(&mut self, doc_id: u32) -> Result<DocumentInfo> {
        self.document_info.get(doc_id as u64)
    }

    pub fn get_document_contents(&mut self, doc_id: u32) -> Result<DocumentContents> {
        self.document_contents.get(doc_id as u64)
    }

    /// Term metadata for `term_id`, with `posting_list_len`
    /// reconstructed from the postings store (it is not itself
    /// persisted; see SPEC_FULL.md §6).
    pub fn get_term(&mut self, term_id: u32) -> Result<Term> {
        let mut term = self.terms.get(term_id as u64)?;
        term.info.posting_list_len = self.postings.get(term_id as u64)?.len() as u32;
        Ok(term)
    }

    pub fn get_term_id(&mut self, term: &str) -> Result<Option<u32>> {
        if self.term_lookup.contains(term)? {
            Ok(Some(self.term_lookup.get(term)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_global_info(&self) -> GlobalInfo {
        self.global_info
    }

    pub fn num_docs(&self) -> u64 {
        self.global_info.num_docs
    }

    pub fn len(&self) -> u64 {
        self.num_docs()
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs() == 0
    }

    /// Persists `global_info.json` and flushes every cache.
    pub fn save(&mut self) -> Result<()> {
        let json = GlobalInfoJson::from(&self.global_info);
        fs::write(&self.global_info_path, serde_json::to_vec(&json)?)?;
        self.postings.flush()?;
        self.document_info.flush()?;
        self.document_contents.flush()?;
        self.terms.flush()?;
        self.term_lookup.flush()?;
        log::info!("index: saved global_info and flushed caches");
        Ok(())
    }
}
