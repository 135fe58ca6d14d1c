//! Tokenizer contract (SPEC_FULL.md §4.10) plus a default,
//! dependency-light implementation.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::{DocumentContents, Location};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub location: Location,
}

impl Token {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

/// The external tokenizer contract the retrieval core consumes.
/// Concrete tokenizers own their own normalisation policy
/// (lowercasing, folding, stemming, stop-word removal); the core only
/// relies on the (text, location) shape of the tokens produced.
pub trait Tokenizer {
    fn tokenize_document(&self, doc: &DocumentContents) -> Result<Vec<Token>>;
    fn tokenize_query(&self, query: &str) -> Result<Vec<Token>>;
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "this", "but", "they", "have",
    "had", "what", "when", "where", "who", "which", "why", "how", "all", "each", "every", "both",
    "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same",
    "so", "than", "too", "very", "can", "just", "should", "now",
];

fn word_boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9]+").unwrap())
}

/// A minimal tokenizer: lowercases, splits on non-alphanumeric
/// boundaries, and removes a fixed English stop-word list from BODY
/// tokens only (AUTHOR and TITLE are short, high-signal fields kept
/// verbatim). Sufficient to run the pipeline end to end without an
/// external NLP dependency; production embedders supply their own.
pub struct SimpleTokenizer {
    stop_words: HashSet<&'static str>,
}

impl Default for SimpleTokenizer {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl SimpleTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn split_field(&self, text: &str, location: Location, strip_stop_words: bool) -> Vec<Token> {
        word_boundary_regex()
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| !strip_stop_words || !self.stop_words.contains(w.as_str()))
            .map(|w| Token::new(w, location))
            .collect()
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize_document(&self, doc: &DocumentContents) -> Result<Vec<Token>> {
        let mut tokens = self.split_field(&doc.author, Location::Author, false);
        tokens.extend(self.split_field(&doc.title, Location::Title, false));
        tokens.extend(self.split_field(&doc.body, Location::Body, true));
        Ok(tokens)
    }

    fn tokenize_query(&self, query: &str) -> Result<Vec<Token>> {
        Ok(self.split_field(query, Location::Query, false))
    }
}
