//! The DAAT + cascade retrieval engine (SPEC_FULL.md §4.8) and its
//! bounded priority queue (§4.9).

pub mod engine;
pub mod priority_queue;
pub mod trec_run;

pub use engine::{CascadeStage, RankedDocument, RetrievalEngine};
pub use priority_queue::{BoundedTopK, PushOutcome, ScoredDoc};
