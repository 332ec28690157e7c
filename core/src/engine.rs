//! Wires configuration, document source and caches together.
//!
//! Build paths load stopwords strictly; query paths load them leniently.

use crate::builder::IndexBuilder;
use crate::config::{EngineConfig, RELATED_TOP_K};
use crate::error::{Result, SearchError};
use crate::extract::{DocumentSource, HtmlDirectory};
use crate::persist::{save_index, IndexCache};
use crate::retriever::{Hit, Retriever};
use crate::scorer::Bm25Scorer;
use crate::tokenizer::{StopwordCache, StopwordPolicy};
use crate::{DocId, IndexSnapshot};
use serde::Serialize;
use std::fs;
use std::sync::Arc;

const DESC_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedDoc {
    pub doc_id: DocId,
    pub title: String,
    pub desc: String,
}

pub struct SearchEngine {
    config: EngineConfig,
    source: Box<dyn DocumentSource>,
    stopwords: StopwordCache,
    indexes: IndexCache,
}

impl SearchEngine {
    /// Engine over `{corpus_dir}/{doc_id}.html`.
    pub fn new(config: EngineConfig) -> Self {
        let source = HtmlDirectory::new(&config.corpus_dir);
        Self::with_source(config, source)
    }

    pub fn with_source<S: DocumentSource + 'static>(config: EngineConfig, source: S) -> Self {
        Self { config, source: Box::new(source), stopwords: StopwordCache::new(), indexes: IndexCache::new() }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn build_index(&self) -> Result<IndexSnapshot> {
        IndexBuilder::new(self.config.weights).build(
            self.source.as_ref(),
            self.config.doc_range(),
            &self.config.stopwords_path,
            &self.stopwords,
        )
    }

    pub fn build_and_save(&self) -> Result<IndexSnapshot> {
        let snapshot = self.build_index()?;
        save_index(&snapshot, &self.config.index_path)?;
        Ok(snapshot)
    }

    /// The snapshot at the configured index path, loaded at most once.
    pub fn index(&self) -> Result<Arc<IndexSnapshot>> {
        self.indexes.load(&self.config.index_path)
    }

    pub fn retriever(&self) -> Result<Retriever> {
        let stopwords = self.stopwords.load(&self.config.stopwords_path, StopwordPolicy::Lenient)?;
        Ok(Retriever::new(stopwords, Bm25Scorer::new(self.config.bm25)))
    }

    /// Blank queries are rejected; queries that tokenize to nothing return no hits.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<Hit>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let retriever = self.retriever()?;
        let index = self.index()?;
        Ok(retriever.retrieve(query, &index, limit.unwrap_or(self.config.top_k)))
    }

    /// Display title, or `Document {id}` when the document is gone or untitled.
    pub fn title_of(&self, doc_id: DocId) -> String {
        match self.source.extract(doc_id) {
            Ok(Some(doc)) if !doc.title.is_empty() => doc.title,
            _ => format!("Document {doc_id}"),
        }
    }

    pub fn related(&self, doc_id: DocId) -> Result<Vec<RelatedDoc>> {
        let doc = self.source.extract(doc_id)?.ok_or(SearchError::UnknownDocument(doc_id))?;
        if doc.title.is_empty() {
            return Ok(Vec::new());
        }
        let retriever = self.retriever()?;
        let index = self.index()?;
        let mut related = Vec::new();
        for hit in retriever.related(doc_id, &doc.title, &index, RELATED_TOP_K) {
            let Ok(Some(other)) = self.source.extract(hit.doc_id) else { continue };
            let title = if other.title.is_empty() { format!("Document {}", hit.doc_id) } else { other.title };
            let desc = match other.paragraphs.first() {
                Some(first) => format!("{}...", first.chars().take(DESC_CHARS).collect::<String>()),
                None => String::new(),
            };
            related.push(RelatedDoc { doc_id: hit.doc_id, title, desc });
        }
        Ok(related)
    }

    /// Creates a missing corpus directory and warns about a missing index
    /// or stopword file.
    pub fn check_resources(&self) {
        let cfg = &self.config;
        if !cfg.corpus_dir.exists() {
            tracing::warn!(path = %cfg.corpus_dir.display(), "corpus directory does not exist, creating it");
            if let Err(err) = fs::create_dir_all(&cfg.corpus_dir) {
                tracing::warn!(path = %cfg.corpus_dir.display(), error = %err, "failed to create corpus directory");
            }
        }
        if !cfg.index_path.exists() {
            tracing::warn!(path = %cfg.index_path.display(), "index file does not exist; build the BM25 index first");
        }
        if !cfg.stopwords_path.exists() {
            tracing::warn!(path = %cfg.stopwords_path.display(), "stopword file does not exist");
        }
    }
}
