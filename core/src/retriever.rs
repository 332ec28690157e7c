use crate::scorer::Bm25Scorer;
use crate::tokenizer::{tokenize, Stopwords};
use crate::{DocId, IndexSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
}

/// Query-time side of the engine: tokenizes with the same stopwords the
/// index was built with, gathers candidates and ranks them.
#[derive(Debug, Clone)]
pub struct Retriever {
    stopwords: Arc<Stopwords>,
    scorer: Bm25Scorer,
}

impl Retriever {
    pub fn new(stopwords: Arc<Stopwords>, scorer: Bm25Scorer) -> Self {
        Self { stopwords, scorer }
    }

    /// At most `top_n` hits with positive score, best first; equal scores
    /// are ordered by ascending doc id.
    pub fn retrieve(&self, query: &str, index: &IndexSnapshot, top_n: usize) -> Vec<Hit> {
        if top_n == 0 {
            return Vec::new();
        }
        let terms = tokenize(query, &self.stopwords);
        if terms.is_empty() {
            return Vec::new();
        }

        let candidates: BTreeSet<DocId> = terms
            .iter()
            .filter_map(|t| index.postings(t))
            .flat_map(|postings| postings.keys().copied())
            .collect();

        let mut hits: Vec<Hit> = candidates
            .into_iter()
            .map(|doc_id| Hit { doc_id, score: self.scorer.score(terms.as_slice(), doc_id, index) })
            .filter(|hit| hit.score > 0.0)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        hits.truncate(top_n);
        tracing::debug!(query, terms = terms.len(), hits = hits.len(), "retrieved");
        hits
    }

    /// Documents similar to one titled `title`: the top `top_n` hits for the
    /// title as a query, minus `doc_id` itself.
    pub fn related(&self, doc_id: DocId, title: &str, index: &IndexSnapshot, top_n: usize) -> Vec<Hit> {
        let mut hits = self.retrieve(title, index, top_n);
        hits.retain(|hit| hit.doc_id != doc_id);
        hits
    }
}
