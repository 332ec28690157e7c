//! Batch index construction.
//!
//! Each document contributes `title_weight * title_count + body_weight * body_count`
//! per term. Lengths stay unweighted and only feed BM25 length normalization.

use crate::config::FieldWeights;
use crate::error::Result;
use crate::extract::DocumentSource;
use crate::tokenizer::{tokenize, StopwordCache, StopwordPolicy, Stopwords};
use crate::{DocId, IndexSnapshot};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexBuilder {
    weights: FieldWeights,
}

impl IndexBuilder {
    pub fn new(weights: FieldWeights) -> Self {
        Self { weights }
    }

    /// Loads the stopword list strictly (a missing file aborts the build)
    /// and indexes every document in `ids`.
    pub fn build(
        &self,
        source: &dyn DocumentSource,
        ids: RangeInclusive<DocId>,
        stopwords_path: &Path,
        cache: &StopwordCache,
    ) -> Result<IndexSnapshot> {
        let stopwords = cache.load(stopwords_path, StopwordPolicy::Strict)?;
        Ok(self.build_with(source, ids, &stopwords))
    }

    /// Missing documents are skipped silently, unreadable ones with a warning.
    pub fn build_with(
        &self,
        source: &dyn DocumentSource,
        ids: RangeInclusive<DocId>,
        stopwords: &Stopwords,
    ) -> IndexSnapshot {
        let last = *ids.end();
        let mut acc = Accumulator::default();
        for doc_id in ids {
            let doc = match source.extract(doc_id) {
                Ok(Some(doc)) => doc,
                Ok(None) => {
                    tracing::debug!(doc_id, "skipping missing document");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(doc_id, error = %err, "skipping unreadable document");
                    continue;
                }
            };
            let title = tokenize(&doc.title, stopwords);
            let body = tokenize(&doc.body, stopwords);
            if acc.add(doc_id, &title, &body, self.weights) {
                tracing::debug!(doc_id, last, "indexed document");
            }
        }
        let snapshot = acc.finish();
        tracing::info!(
            num_docs = snapshot.total_docs,
            num_terms = snapshot.num_terms(),
            avg_doc_length = snapshot.avg_doc_length,
            "index build complete"
        );
        snapshot
    }
}

#[derive(Default)]
struct Accumulator {
    snapshot: IndexSnapshot,
    length_sum: u64,
}

impl Accumulator {
    /// Returns false when the document has no weighted terms and was left out.
    fn add(&mut self, doc_id: DocId, title: &[String], body: &[String], weights: FieldWeights) -> bool {
        let mut weighted_tf: HashMap<&str, u32> = HashMap::new();
        for term in title {
            let tf = weighted_tf.entry(term.as_str()).or_insert(0);
            *tf = tf.saturating_add(weights.title);
        }
        for term in body {
            let tf = weighted_tf.entry(term.as_str()).or_insert(0);
            *tf = tf.saturating_add(weights.body);
        }
        weighted_tf.retain(|_, tf| *tf > 0);
        if weighted_tf.is_empty() {
            return false;
        }

        let s = &mut self.snapshot;
        let len = u32::try_from(title.len() + body.len()).unwrap_or(u32::MAX);
        s.doc_lengths.insert(doc_id, len);
        self.length_sum += u64::from(len);
        s.total_docs += 1;
        for (term, tf) in weighted_tf {
            s.inverted_index.entry(term.to_string()).or_default().insert(doc_id, tf);
            *s.doc_freq.entry(term.to_string()).or_insert(0) += 1;
        }
        true
    }

    fn finish(mut self) -> IndexSnapshot {
        let s = &mut self.snapshot;
        s.avg_doc_length = if s.total_docs > 0 {
            self.length_sum as f64 / f64::from(s.total_docs)
        } else {
            0.0
        };
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::extract::{ExtractedDoc, MemoryCorpus};

    /// Fails to extract one id and delegates the rest.
    struct Unreadable {
        inner: MemoryCorpus,
        broken: DocId,
    }

    impl DocumentSource for Unreadable {
        fn extract(&self, doc_id: DocId) -> Result<Option<ExtractedDoc>> {
            if doc_id == self.broken {
                return Err(SearchError::Extraction { doc_id, reason: "invalid byte sequence".into() });
            }
            self.inner.extract(doc_id)
        }
    }

    fn no_stops() -> Stopwords { Stopwords::new() }

    #[test]
    fn weights_title_over_body() {
        let corpus = MemoryCorpus::new().with_doc(1, "apple", "apple pie");
        let idx = IndexBuilder::default().build_with(&corpus, 1..=1, &no_stops());
        assert_eq!(idx.postings("apple").unwrap()[&1], 21);
        assert_eq!(idx.postings("pie").unwrap()[&1], 1);
        assert_eq!(idx.doc_len(1), 3);
        assert_eq!(idx.doc_freq("apple"), 1);
    }

    #[test]
    fn custom_weights() {
        let corpus = MemoryCorpus::new().with_doc(1, "apple", "apple pie");
        let idx = IndexBuilder::new(FieldWeights { title: 3, body: 2 }).build_with(&corpus, 1..=1, &no_stops());
        assert_eq!(idx.postings("apple").unwrap()[&1], 5);
        assert_eq!(idx.postings("pie").unwrap()[&1], 2);
    }

    #[test]
    fn zero_weight_field_terms_are_not_posted() {
        let corpus = MemoryCorpus::new().with_doc(1, "apple", "pie");
        let idx = IndexBuilder::new(FieldWeights { title: 1, body: 0 }).build_with(&corpus, 1..=1, &no_stops());
        assert!(idx.contains_term("apple"));
        assert!(!idx.contains_term("pie"));
        assert_eq!(idx.doc_len(1), 2);
    }

    #[test]
    fn empty_documents_are_excluded() {
        let stops: Stopwords = ["the".to_string()].into_iter().collect();
        let corpus = MemoryCorpus::new()
            .with_doc(1, "the", "the the")
            .with_doc(2, "", "")
            .with_doc(3, "pear", "");
        let idx = IndexBuilder::default().build_with(&corpus, 1..=5, &stops);
        assert_eq!(idx.total_docs, 1);
        assert_eq!(idx.doc_lengths.len(), 1);
        assert_eq!(idx.doc_len(1), 0);
        assert_eq!(idx.avg_doc_length, 1.0);
    }

    #[test]
    fn unreadable_document_is_skipped_and_build_continues() {
        let source = Unreadable {
            inner: MemoryCorpus::new()
                .with_doc(1, "apple", "")
                .with_doc(2, "banana", "")
                .with_doc(3, "cherry", ""),
            broken: 2,
        };
        let idx = IndexBuilder::default().build_with(&source, 1..=3, &no_stops());
        assert_eq!(idx.total_docs, 2);
        assert!(idx.doc_lengths.contains_key(&1));
        assert!(idx.doc_lengths.contains_key(&3));
        assert!(!idx.doc_lengths.contains_key(&2));
        assert!(!idx.contains_term("banana"));
    }

    #[test]
    fn huge_weights_saturate_instead_of_wrapping() {
        let corpus = MemoryCorpus::new().with_doc(1, "apple apple", "apple");
        let weights = FieldWeights { title: u32::MAX, body: 1 };
        let idx = IndexBuilder::new(weights).build_with(&corpus, 1..=1, &no_stops());
        assert_eq!(idx.postings("apple").unwrap()[&1], u32::MAX);
        assert_eq!(idx.doc_len(1), 3);
    }

    #[test]
    fn empty_corpus_is_legal() {
        let idx = IndexBuilder::default().build_with(&MemoryCorpus::new(), 1..=10, &no_stops());
        assert_eq!(idx, IndexSnapshot::default());
    }
}
