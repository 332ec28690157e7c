use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// doc_id -> weighted term frequency
pub type PostingMap = HashMap<DocId, u32>;

/// Immutable product of one build pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// term -> posting map; a term is present iff some document contains it.
    pub inverted_index: HashMap<String, PostingMap>,
    /// term -> number of distinct documents containing it
    pub doc_freq: HashMap<String, u32>,
    /// doc_id -> unweighted token count (title + body)
    pub doc_lengths: HashMap<DocId, u32>,
    pub total_docs: u32,
    pub avg_doc_length: f64,
}

impl IndexSnapshot {
    pub fn postings(&self, term: &str) -> Option<&PostingMap> {
        self.inverted_index.get(term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.inverted_index.contains_key(term)
    }

    pub fn doc_freq(&self, term: &str) -> u32 {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    /// 0 for documents that were never indexed.
    pub fn doc_len(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(&doc_id).copied().unwrap_or(0)
    }

    pub fn num_terms(&self) -> usize { self.inverted_index.len() }
}
