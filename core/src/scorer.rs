//! BM25 Okapi scoring.
//!
//! `idf = ln((N - df + 0.5) / (df + 0.5) + 1)` and
//! `tf_part = tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))`,
//! where `tf` is the field-weighted frequency and `dl` the unweighted length.

use crate::config::Bm25Params;
use crate::{DocId, IndexSnapshot};

#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25Scorer {
    params: Bm25Params,
}

impl Bm25Scorer {
    pub fn new(params: Bm25Params) -> Self {
        Self { params }
    }

    /// Sum of per-term contributions. Terms missing from the index add
    /// nothing; a document without a recorded length scores 0.
    pub fn score<S: AsRef<str>>(&self, terms: &[S], doc_id: DocId, index: &IndexSnapshot) -> f64 {
        let doc_len = index.doc_len(doc_id);
        if doc_len == 0 {
            return 0.0;
        }
        let Bm25Params { k1, b } = self.params;
        let n = f64::from(index.total_docs);
        let norm = 1.0 - b + b * f64::from(doc_len) / index.avg_doc_length;

        let mut score = 0.0;
        for term in terms {
            let Some(postings) = index.postings(term.as_ref()) else { continue };
            let tf = f64::from(postings.get(&doc_id).copied().unwrap_or(0));
            let df = f64::from(index.doc_freq(term.as_ref()));
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
            score += idf * (tf * (k1 + 1.0)) / (tf + k1 * norm);
        }
        score
    }
}
