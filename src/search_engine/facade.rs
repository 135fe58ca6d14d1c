//! Top-level façade composing an [`Index`], a [`Tokenizer`], and a
//! [`RetrievalEngine`] into the entry point an embedding application
//! uses, mirroring the teacher's own `SearchEngine` (index directory
//! + tokenizer + query pipeline).

use std::path::Path;

use crate::config::EngineConfig;
use crate::domain::DocumentContents;
use crate::error::Result;
use crate::index::Index;
use crate::retrieval::{CascadeStage, RankedDocument, RetrievalEngine};
use crate::scoring::bm25f::Bm25f;
use crate::tokenizer::{SimpleTokenizer, Tokenizer};

/// Bundles a persistent [`Index`] with a tokenizer and a retrieval
/// pipeline. Constructed once per index directory; `build_index` runs
/// ingestion, `search` runs a query end to end.
pub struct SearchEngine {
    index: Index,
    tokenizer: Box<dyn Tokenizer>,
    engine: RetrievalEngine,
}

impl SearchEngine {
    /// Opens (creating if necessary) the index rooted at `index_dir`,
    /// using the default [`SimpleTokenizer`] and a single-stage BM25F
    /// cascade with the given top-k.
    pub fn open<P: AsRef<Path>>(index_dir: P, config: EngineConfig, top_k: usize) -> Result<Self> {
        let index = Index::open(index_dir, &config)?;
        let engine = RetrievalEngine::new(vec![CascadeStage::new(top_k, Box::new(Bm25f::new(config.bm25f)))]);
        Ok(Self {
            index,
            tokenizer: Box::new(SimpleTokenizer::new()),
            engine,
        })
    }

    /// Opens an index with an explicit cascade (e.g. BM25F followed by
    /// an external batched rescorer) and a caller-supplied tokenizer.
    pub fn with_pipeline<P: AsRef<Path>>(
        index_dir: P,
        config: EngineConfig,
        tokenizer: Box<dyn Tokenizer>,
        stages: Vec<CascadeStage>,
    ) -> Result<Self> {
        let index = Index::open(index_dir, &config)?;
        Ok(Self {
            index,
            tokenizer,
            engine: RetrievalEngine::new(stages),
        })
    }

    /// Indexes `docs` and persists the result.
    pub fn build_index<I>(&mut self, docs: I, verbose: bool) -> Result<()>
    where
        I: IntoIterator<Item = DocumentContents>,
    {
        self.index.bulk_index_documents(docs, self.tokenizer.as_ref(), verbose)
    }

    /// Indexes a single document, returning its assigned doc_id (or
    /// `None` for a silently-skipped idempotent re-ingestion).
    pub fn index_document(&mut self, doc: &DocumentContents, external_doc_id: Option<u32>) -> Result<Option<u32>> {
        self.index.index_document(doc, self.tokenizer.as_ref(), external_doc_id)
    }

    /// Runs `query` through the DAAT merge and cascade, returning
    /// results in descending-score rank order.
    pub fn search(&mut self, query: &str) -> Result<Vec<RankedDocument>> {
        self.engine.search(&mut self.index, self.tokenizer.as_ref(), query)
    }

    pub fn num_docs(&self) -> u64 {
        self.index.num_docs()
    }

    pub fn save(&mut self) -> Result<()> {
        self.index.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(author: &str, title: &str, body: &str) -> DocumentContents {
        DocumentContents::new(author, title, body)
    }

    /// Scenario 4 (SPEC_FULL.md §8), exercised end to end through the
    /// public façade rather than the engine/index directly.
    #[test]
    fn scenario_4_end_to_end_ranking() {
        let dir = tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.storage.block_size = 64;
        config.storage.hmap_buckets = 16;

        let mut engine = SearchEngine::open(dir.path(), config, 10).unwrap();
        engine
            .build_index(
                vec![
                    doc("a1", "t1", "token1 token2 token3"),
                    doc("a2", "t2", "token4 token5 token6"),
                    doc("a3", "t3", "token2 token4 token6"),
                ],
                false,
            )
            .unwrap();

        let results = engine.search("token2 token4").unwrap();
        let doc_ids: Vec<u32> = results.iter().map(|r| r.doc_id).collect();
        assert_eq!(doc_ids[0], 2, "doc 2 matches both query terms and should rank first");
        assert!(doc_ids.contains(&0));
        assert!(doc_ids.contains(&1));
    }

    #[test]
    fn reopening_an_index_preserves_prior_documents() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::default();
        {
            let mut engine = SearchEngine::open(dir.path(), config.clone(), 10).unwrap();
            engine.build_index(vec![doc("a", "t", "hello world")], false).unwrap();
        }
        let mut engine = SearchEngine::open(dir.path(), config, 10).unwrap();
        assert_eq!(engine.num_docs(), 1);
        let results = engine.search("hello").unwrap();
        assert_eq!(results.len(), 1);
    }
}
