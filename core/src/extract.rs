//! Document sources.
//!
//! The builder only sees `(title, body)` pairs. [`HtmlDirectory`] pulls them
//! out of `{doc_id}.html` files; [`MemoryCorpus`] holds them directly.

use crate::error::{Result, SearchError};
use crate::DocId;
use encoding_rs::GBK;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref SEL_TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref SEL_P: Selector = Selector::parse("p").expect("valid selector");
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDoc {
    pub title: String,
    /// Non-empty paragraph texts joined by a single space.
    pub body: String,
    /// Every `<p>` text in document order, trimmed, empty ones included.
    pub paragraphs: Vec<String>,
}

impl ExtractedDoc {
    pub fn from_paragraphs(title: impl Into<String>, paragraphs: Vec<String>) -> Self {
        let body = paragraphs
            .iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        Self { title: title.into(), body, paragraphs }
    }
}

pub trait DocumentSource: Send + Sync {
    /// Returns `Ok(None)` when no document exists under `doc_id`, and
    /// [`SearchError::Extraction`] when it exists but cannot be read.
    fn extract(&self, doc_id: DocId) -> Result<Option<ExtractedDoc>>;
}

pub struct HtmlDirectory {
    root: PathBuf,
}

impl HtmlDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, doc_id: DocId) -> PathBuf {
        self.root.join(format!("{doc_id}.html"))
    }
}

impl DocumentSource for HtmlDirectory {
    fn extract(&self, doc_id: DocId) -> Result<Option<ExtractedDoc>> {
        let path = self.path_for(doc_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SearchError::Extraction { doc_id, reason: e.to_string() }),
        };
        Ok(Some(parse_html(&decode(&bytes))))
    }
}

/// Strict UTF-8 first, then GBK with undecodable bytes dropped.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, had_errors) = GBK.decode_without_bom_handling(bytes);
            if had_errors {
                tracing::debug!("dropping undecodable bytes after GBK fallback");
                text.replace('\u{FFFD}', "")
            } else {
                text.into_owned()
            }
        }
    }
}

/// `<title>` text and the `<p>` texts, each trimmed.
pub fn parse_html(html: &str) -> ExtractedDoc {
    let doc = Html::parse_document(html);
    let title = doc
        .select(&SEL_TITLE)
        .next()
        .map(|n| n.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let paragraphs: Vec<String> = doc
        .select(&SEL_P)
        .map(|n| n.text().collect::<String>().trim().to_string())
        .collect();
    ExtractedDoc::from_paragraphs(title, paragraphs)
}

/// Documents held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    docs: BTreeMap<DocId, ExtractedDoc>,
}

impl MemoryCorpus {
    pub fn new() -> Self { Self::default() }

    /// Stores `body` as a single paragraph.
    pub fn insert(&mut self, doc_id: DocId, title: impl Into<String>, body: impl Into<String>) {
        let body = body.into();
        let paragraphs = if body.is_empty() { Vec::new() } else { vec![body] };
        self.docs.insert(doc_id, ExtractedDoc::from_paragraphs(title, paragraphs));
    }

    pub fn with_doc(mut self, doc_id: DocId, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(doc_id, title, body);
        self
    }
}

impl DocumentSource for MemoryCorpus {
    fn extract(&self, doc_id: DocId) -> Result<Option<ExtractedDoc>> {
        Ok(self.docs.get(&doc_id).cloned())
    }
}
