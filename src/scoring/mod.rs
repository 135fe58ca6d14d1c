//! Scoring functions (SPEC_FULL.md §4.7, §4.8, §9): a uniform contract
//! with a per-document call shape and an optional batched one, so a
//! cascade stage can swap in a BM25F pass or an opaque batched
//! rescorer without the retrieval engine knowing which.

pub mod bm25f;

use rustc_hash::FxHashMap;

use crate::domain::{DocumentInfo, Posting, Term};

/// Cumulative field lengths and document count, as persisted in
/// `global_info.json`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobalInfo {
    /// [author, title, body] cumulative token counts across all docs.
    pub field_lengths: [u64; 3],
    pub num_docs: u64,
}

impl GlobalInfo {
    pub fn add_document(&mut self, lengths: [u32; 3]) {
        for (total, added) in self.field_lengths.iter_mut().zip(lengths) {
            *total += added as u64;
        }
        self.num_docs += 1;
    }

    /// Average length per field, or 0 for an empty index.
    pub fn avg_field_lengths(&self) -> [f64; 3] {
        if self.num_docs == 0 {
            return [0.0; 3];
        }
        let n = self.num_docs as f64;
        [
            self.field_lengths[0] as f64 / n,
            self.field_lengths[1] as f64 / n,
            self.field_lengths[2] as f64 / n,
        ]
    }
}

/// Everything a scorer needs to rate one candidate document against a
/// query: the query's terms, the candidate's DocumentInfo, the
/// postings gathered for it during the DAAT merge (keyed by term_id),
/// and the index-wide aggregates.
pub struct ScoringContext<'a> {
    pub query_terms: &'a [Term],
    pub doc_info: &'a DocumentInfo,
    pub postings_by_term: &'a FxHashMap<u32, Posting>,
    pub global_info: &'a GlobalInfo,
}

/// A scoring function rescores one document at a time by default.
/// Scorers backed by a batched model (e.g. a neural rescorer) can
/// override `score_batch` to amortise inference cost; a cascade stage
/// calls it once per batch instead of once per document when it
/// returns `Some`.
pub trait ScoringFunction {
    fn score(&self, ctx: &ScoringContext) -> f64;

    /// `query` paired with each candidate's body text, in the same
    /// order as `doc_bodies`. Returns `None` when this scorer has no
    /// batched path, in which case callers fall back to `score`.
    fn score_batch(&self, _query: &str, _doc_bodies: &[&str]) -> Option<Vec<f64>> {
        None
    }
}
