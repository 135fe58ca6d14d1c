//! The top-level façade (SPEC_FULL.md §4.6, §4.8): an [`Index`](crate::index::Index)
//! plus tokenizer plus retrieval pipeline, wired together for an
//! embedding application.

mod facade;

pub use facade::SearchEngine;
