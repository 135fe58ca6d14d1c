//! Domain entities and their binary codecs (SPEC_FULL.md §3, §4.5, §6).

pub mod document_contents;
pub mod document_info;
pub mod location;
pub mod posting;
pub mod posting_list;
pub mod term;

pub use document_contents::DocumentContents;
pub use document_info::DocumentInfo;
pub use location::Location;
pub use posting::{Occurrences, Posting};
pub use posting_list::PostingList;
pub use term::{Term, TermInfo};
