//! Engine configuration.
//!
//! Tuning defaults live here as constants. Runtime overrides come from the
//! environment via [`EngineConfig::from_env`] and from CLI flags in the
//! binaries.

use crate::error::{Result, SearchError};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

/// Weight applied to each title occurrence of a term.
pub const DEFAULT_TITLE_WEIGHT: u32 = 20;

/// Weight applied to each body occurrence of a term.
pub const DEFAULT_BODY_WEIGHT: u32 = 1;

/// BM25 term frequency saturation parameter.
pub const BM25_K1: f64 = 1.2;

/// BM25 document length normalization parameter. 0.0 disables length
/// normalization, 1.0 applies it fully.
pub const BM25_B: f64 = 0.75;

/// Number of results returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 10;

/// Number of hits requested when looking up documents related to a title.
pub const RELATED_TOP_K: usize = 5;

pub const DEFAULT_FIRST_DOC: DocId = 1;
pub const DEFAULT_LAST_DOC: DocId = 107;

pub const DEFAULT_CORPUS_DIR: &str = "./htmls";
pub const DEFAULT_STOPWORDS_PATH: &str = "./data/stopwords.txt";
pub const DEFAULT_INDEX_PATH: &str = "./bm25_index.bin";

/// Per-field multipliers used when accumulating weighted term frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub title: u32,
    pub body: u32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self { title: DEFAULT_TITLE_WEIGHT, body: DEFAULT_BODY_WEIGHT }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: BM25_K1, b: BM25_B }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory holding `{doc_id}.html` files.
    pub corpus_dir: PathBuf,
    pub stopwords_path: PathBuf,
    pub index_path: PathBuf,
    pub top_k: usize,
    pub first_doc: DocId,
    pub last_doc: DocId,
    pub weights: FieldWeights,
    pub bm25: Bm25Params,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            stopwords_path: PathBuf::from(DEFAULT_STOPWORDS_PATH),
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            top_k: DEFAULT_TOP_K,
            first_doc: DEFAULT_FIRST_DOC,
            last_doc: DEFAULT_LAST_DOC,
            weights: FieldWeights::default(),
            bm25: Bm25Params::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `HTMLS_DIR`, `STOPWORDS_PATH`, `INDEX_PATH`,
    /// `TOP_K`, `TITLE_WEIGHT`, `BODY_WEIGHT`, `BM25_K1` and `BM25_B`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("HTMLS_DIR") { cfg.corpus_dir = PathBuf::from(v); }
        if let Some(v) = lookup("STOPWORDS_PATH") { cfg.stopwords_path = PathBuf::from(v); }
        if let Some(v) = lookup("INDEX_PATH") { cfg.index_path = PathBuf::from(v); }
        if let Some(v) = parse_var(&lookup, "TOP_K")? { cfg.top_k = v; }
        if let Some(v) = parse_var(&lookup, "TITLE_WEIGHT")? { cfg.weights.title = v; }
        if let Some(v) = parse_var(&lookup, "BODY_WEIGHT")? { cfg.weights.body = v; }
        if let Some(v) = parse_var(&lookup, "BM25_K1")? { cfg.bm25.k1 = v; }
        if let Some(v) = parse_var(&lookup, "BM25_B")? { cfg.bm25.b = v; }
        Ok(cfg)
    }

    pub fn doc_range(&self) -> RangeInclusive<DocId> {
        self.first_doc..=self.last_doc
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SearchError::InvalidConfig { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let cfg = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.weights, FieldWeights { title: 20, body: 1 });
        assert_eq!(cfg.doc_range(), 1..=107);
    }

    #[test]
    fn environment_overrides_paths_and_weights() {
        let cfg = EngineConfig::from_lookup(lookup_from(&[
            ("INDEX_PATH", "/tmp/idx.bin"),
            ("TITLE_WEIGHT", "5"),
            ("TOP_K", " 3 "),
            ("BM25_B", "0.5"),
        ]))
        .unwrap();
        assert_eq!(cfg.index_path, PathBuf::from("/tmp/idx.bin"));
        assert_eq!(cfg.weights.title, 5);
        assert_eq!(cfg.weights.body, 1);
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.bm25.b, 0.5);
    }

    #[test]
    fn unparseable_override_is_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("TOP_K", "many")])).unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig { key: "TOP_K", .. }));
    }
}
