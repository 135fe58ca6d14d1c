//! Document-at-a-time posting merge plus multi-stage cascade
//! rescoring, grounded in the teacher's `TermIterator`/`max_score`
//! min-doc-id merge and bounded-heap pattern.

use rustc_hash::FxHashMap;

use crate::domain::{DocumentContents, Posting, Term};
use crate::error::Result;
use crate::index::Index;
use crate::retrieval::priority_queue::{BoundedTopK, PushOutcome};
use crate::scoring::{ScoringContext, ScoringFunction};
use crate::tokenizer::Tokenizer;

/// One cascade stage: rescore the surviving candidates and keep the
/// top `k`. Stage k's must be non-increasing across the cascade.
pub struct CascadeStage {
    pub k: usize,
    pub scorer: Box<dyn ScoringFunction>,
}

impl CascadeStage {
    pub fn new(k: usize, scorer: Box<dyn ScoringFunction>) -> Self {
        Self { k, scorer }
    }
}

pub struct RankedDocument {
    pub doc_id: u32,
    pub score: f64,
    pub contents: DocumentContents,
}

/// Postings gathered for each surviving candidate during the DAAT
/// merge, cached by doc_id for reuse in later cascade stages.
type CachedPostings = FxHashMap<u32, FxHashMap<u32, Posting>>;

/// A per-term cursor over a posting list, sorted ascending by doc_id.
struct TermCursor {
    term_id: u32,
    entries: Vec<(u32, crate::domain::Occurrences)>,
    pos: usize,
}

impl TermCursor {
    fn peek_doc_id(&self) -> Option<u32> {
        self.entries.get(self.pos).map(|(doc_id, _)| *doc_id)
    }

    fn take_if(&mut self, doc_id: u32) -> Option<crate::domain::Occurrences> {
        if self.peek_doc_id() == Some(doc_id) {
            let occurrences = self.entries[self.pos].1;
            self.pos += 1;
            Some(occurrences)
        } else {
            None
        }
    }
}

pub struct RetrievalEngine {
    stages: Vec<CascadeStage>,
}

impl RetrievalEngine {
    pub fn new(stages: Vec<CascadeStage>) -> Self {
        assert!(!stages.is_empty(), "a retrieval engine needs at least one cascade stage");
        for window in stages.windows(2) {
            debug_assert!(
                window[0].k >= window[1].k,
                "cascade stage k values must be non-increasing"
            );
        }
        Self { stages }
    }

    fn query_terms(&self, index: &mut Index, tokenizer: &dyn Tokenizer, query: &str) -> Result<Vec<Term>> {
        let query_tokens = tokenizer.tokenize_query(query)?;
        let mut terms = Vec::new();
        for token in &query_tokens {
            if let Some(term_id) = index.get_term_id(&token.text)? {
                terms.push(index.get_term(term_id)?);
            }
        }
        Ok(terms)
    }

    /// Stage 1: DAAT merge across one posting iterator per query term,
    /// scored with `stages[0]`'s scorer and kept in a bounded top-k.
    fn first_stage(
        &self,
        index: &mut Index,
        query_terms: &[Term],
    ) -> Result<(Vec<(u32, f64)>, CachedPostings)> {
        let stage = &self.stages[0];
        let mut cursors = Vec::with_capacity(query_terms.len());
        for term in query_terms {
            let list = index.get_postings(term.term_id)?;
            cursors.push(TermCursor {
                term_id: term.term_id,
                entries: list.iter().copied().collect(),
                pos: 0,
            });
        }

        let mut topk = BoundedTopK::new(stage.k);
        let mut cached_postings: CachedPostings = FxHashMap::default();

        loop {
            let min_doc_id = cursors.iter().filter_map(|c| c.peek_doc_id()).min();
            let Some(doc_id) = min_doc_id else { break };

            let mut postings_by_term = FxHashMap::default();
            for cursor in cursors.iter_mut() {
                if let Some(occurrences) = cursor.take_if(doc_id) {
                    postings_by_term.insert(cursor.term_id, Posting::new(doc_id, cursor.term_id, occurrences));
                }
            }

            let doc_info = index.get_document_info(doc_id)?;
            let global_info = index.get_global_info();
            let score = stage.scorer.score(&ScoringContext {
                query_terms,
                doc_info: &doc_info,
                postings_by_term: &postings_by_term,
                global_info: &global_info,
            });

            match topk.push(doc_id, score) {
                PushOutcome::Inserted => {
                    cached_postings.insert(doc_id, postings_by_term);
                }
                PushOutcome::Evicted { evicted_doc_id } => {
                    cached_postings.remove(&evicted_doc_id);
                    cached_postings.insert(doc_id, postings_by_term);
                    log::debug!("retrieval: stage 1 evicted doc {evicted_doc_id} for doc {doc_id}");
                }
                PushOutcome::Rejected => {}
            }
        }

        topk.finalise();
        let candidates: Vec<(u32, f64)> = topk.iter().map(|d| (d.doc_id, d.score)).collect();
        log::info!("retrieval: stage 1 kept {} candidates (k={})", candidates.len(), stage.k);
        Ok((candidates, cached_postings))
    }

    /// Stages 2..m: rescore the surviving candidates, add to the
    /// running score (preserves monotonicity), and truncate to k_i.
    fn cascade_stages(
        &self,
        index: &mut Index,
        query: &str,
        query_terms: &[Term],
        mut candidates: Vec<(u32, f64)>,
        cached_postings: &CachedPostings,
    ) -> Result<Vec<(u32, f64)>> {
        for stage in &self.stages[1..] {
            let doc_ids: Vec<u32> = candidates.iter().map(|(id, _)| *id).collect();
            let mut bodies = Vec::with_capacity(doc_ids.len());
            for &doc_id in &doc_ids {
                bodies.push(index.get_document_contents(doc_id)?.body);
            }
            let body_refs: Vec<&str> = bodies.iter().map(|s| s.as_str()).collect();

            let new_scores: Vec<f64> = match stage.scorer.score_batch(query, &body_refs) {
                Some(scores) => scores,
                None => {
                    let mut scores = Vec::with_capacity(doc_ids.len());
                    let empty = FxHashMap::default();
                    for &doc_id in &doc_ids {
                        let postings_by_term = cached_postings.get(&doc_id).unwrap_or(&empty);
                        let doc_info = index.get_document_info(doc_id)?;
                        let global_info = index.get_global_info();
                        scores.push(stage.scorer.score(&ScoringContext {
                            query_terms,
                            doc_info: &doc_info,
                            postings_by_term,
                            global_info: &global_info,
                        }));
                    }
                    scores
                }
            };

            let mut next = BoundedTopK::new(stage.k);
            for ((doc_id, prior_score), new_score) in candidates.iter().zip(new_scores) {
                next.push(*doc_id, prior_score + new_score);
            }
            next.finalise();
            candidates = next.iter().map(|d| (d.doc_id, d.score)).collect();
            log::info!("retrieval: cascade stage kept {} candidates (k={})", candidates.len(), stage.k);
        }
        Ok(candidates)
    }

    /// Tokenizes `query`, runs the DAAT merge and cascade, and returns
    /// the surviving documents in descending-score rank order.
    pub fn search(&self, index: &mut Index, tokenizer: &dyn Tokenizer, query: &str) -> Result<Vec<RankedDocument>> {
        let query_terms = self.query_terms(index, tokenizer, query)?;
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let (candidates, cached_postings) = self.first_stage(index, &query_terms)?;
        let ranked = self.cascade_stages(index, query, &query_terms, candidates, &cached_postings)?;

        let mut out = Vec::with_capacity(ranked.len());
        for (doc_id, score) in ranked {
            let contents = index.get_document_contents(doc_id)?;
            out.push(RankedDocument { doc_id, score, contents });
        }
        Ok(out)
    }
}
