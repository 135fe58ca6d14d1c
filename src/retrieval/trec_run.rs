//! Formats already-ranked `(doc_id, score)` results into the two
//! conventional IR run-file shapes (SPEC_FULL.md §6). Pure
//! presentation: it does not participate in retrieval itself.

use std::fmt::Write as _;

use crate::retrieval::RankedDocument;

/// One row of a formatted run: a query's rank position, resolved
/// doc_id/external id, and score.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub query_id: String,
    pub doc_id: u32,
    pub rank: u32,
    pub score: f64,
}

/// Builds run rows from a query's ranked results, in the native
/// (1-based rank) numbering.
pub fn native_rows(query_id: &str, ranked: &[RankedDocument]) -> Vec<RunRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, doc)| RunRow {
            query_id: query_id.to_string(),
            doc_id: doc.doc_id,
            rank: i as u32 + 1,
            score: doc.score,
        })
        .collect()
}

/// Builds run rows from a query's ranked results, in the alternative
/// (0-based rank) numbering.
pub fn alternative_rows(query_id: &str, ranked: &[RankedDocument]) -> Vec<RunRow> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, doc)| RunRow {
            query_id: query_id.to_string(),
            doc_id: doc.doc_id,
            rank: i as u32,
            score: doc.score,
        })
        .collect()
}

/// Writes `query_id Q0 doc_id rank score run_id` lines, one per row,
/// in the native TREC-style run format.
pub fn format_native(rows: &[RunRow], run_id: &str) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{} Q0 {} {} {} {}",
            row.query_id, row.doc_id, row.rank, row.score, run_id
        );
    }
    out
}

/// Writes `qid,docid,docno,rank,score,query` CSV lines, in the
/// alternative run format used by some evaluation harnesses.
pub fn format_alternative(rows: &[RunRow], query_text: &str) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            row.query_id, row.doc_id, row.doc_id, row.rank, row.score, query_text
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentContents;

    fn ranked(doc_id: u32, score: f64) -> RankedDocument {
        RankedDocument {
            doc_id,
            score,
            contents: DocumentContents::default(),
        }
    }

    #[test]
    fn native_rows_are_one_indexed() {
        let docs = vec![ranked(7, 3.5), ranked(2, 1.0)];
        let rows = native_rows("q1", &docs);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn alternative_rows_are_zero_indexed() {
        let docs = vec![ranked(7, 3.5), ranked(2, 1.0)];
        let rows = alternative_rows("q1", &docs);
        assert_eq!(rows[0].rank, 0);
        assert_eq!(rows[1].rank, 1);
    }

    #[test]
    fn native_format_has_six_space_separated_fields() {
        let docs = vec![ranked(7, 3.5)];
        let rows = native_rows("q1", &docs);
        let text = format_native(&rows, "run-0");
        let fields: Vec<&str> = text.trim_end().split(' ').collect();
        assert_eq!(fields, vec!["q1", "Q0", "7", "1", "3.5", "run-0"]);
    }

    #[test]
    fn alternative_format_has_six_csv_fields() {
        let docs = vec![ranked(7, 3.5)];
        let rows = alternative_rows("q1", &docs);
        let text = format_alternative(&rows, "token2 token4");
        let fields: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(fields, vec!["q1", "7", "7", "0", "3.5", "token2 token4"]);
    }
}
