use crate::error::{Result, SearchError};
use jieba_rs::Jieba;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Han runs go to the dictionary segmenter; other letter/digit runs are whole words;
    // any remaining visible character stands alone.
    static ref RE: Regex =
        Regex::new(r"(?u)(\p{Han}+)|([[\p{L}\p{N}_']&&[^\p{Han}]]+|\S)").expect("valid regex");
    static ref JIEBA: Jieba = Jieba::new();
}

pub type Stopwords = HashSet<String>;

/// NFKC normalization followed by lowercasing. Applied to document text,
/// queries and stopword entries alike.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Segment `text` into normalized tokens, dropping blanks and stopwords.
pub fn tokenize(text: &str, stopwords: &Stopwords) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let normalized = normalize(text);
    let mut tokens = Vec::new();
    for caps in RE.captures_iter(&normalized) {
        if let Some(han) = caps.get(1) {
            for word in JIEBA.cut(han.as_str(), true) {
                keep(word, stopwords, &mut tokens);
            }
        } else if let Some(word) = caps.get(2) {
            keep(word.as_str(), stopwords, &mut tokens);
        }
    }
    tokens
}

fn keep(word: &str, stopwords: &Stopwords, out: &mut Vec<String>) {
    let word = word.trim();
    if !word.is_empty() && !stopwords.contains(word) {
        out.push(word.to_string());
    }
}

/// How a caller reacts to a stopword file that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwordPolicy {
    /// Fail with [`SearchError::Configuration`]. Used when building an index.
    Strict,
    /// Log a warning and continue with an empty set. Used when serving queries.
    Lenient,
}

/// Stopword sets keyed by source path. Entries live as long as the cache and
/// are never re-read or evicted.
#[derive(Default)]
pub struct StopwordCache {
    sets: RwLock<HashMap<PathBuf, Arc<Stopwords>>>,
}

impl StopwordCache {
    pub fn new() -> Self { Self::default() }

    pub fn load(&self, path: &Path, policy: StopwordPolicy) -> Result<Arc<Stopwords>> {
        if let Some(set) = self.sets.read().get(path) {
            return Ok(set.clone());
        }
        let mut sets = self.sets.write();
        if let Some(set) = sets.get(path) {
            return Ok(set.clone());
        }
        match read_stopwords(path) {
            Ok(set) => {
                let set = Arc::new(set);
                tracing::debug!(path = %path.display(), count = set.len(), "loaded stopwords");
                sets.insert(path.to_path_buf(), set.clone());
                Ok(set)
            }
            Err(SearchError::Configuration { path }) if policy == StopwordPolicy::Lenient => {
                tracing::warn!(path = %path.display(), "stopword file missing, continuing without stopwords");
                Ok(Arc::new(Stopwords::new()))
            }
            Err(err) => Err(err),
        }
    }

    pub fn is_empty(&self) -> bool { self.sets.read().is_empty() }
}

fn read_stopwords(path: &Path) -> Result<Stopwords> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SearchError::Configuration { path: path.to_path_buf() },
        _ => SearchError::Io(e),
    })?;
    Ok(text
        .lines()
        .map(|line| normalize(line.trim()))
        .filter(|word| !word.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops(words: &[&str]) -> Stopwords {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Apple pie, and APPLE!", &stops(&["and"]));
        assert_eq!(t, vec!["apple", "pie", ",", "apple", "!"]);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(tokenize("", &Stopwords::new()).is_empty());
        assert!(tokenize(" \t\n ", &Stopwords::new()).is_empty());
    }

    #[test]
    fn segments_chinese_with_dictionary() {
        let t = tokenize("我来到北京清华大学", &Stopwords::new());
        assert!(t.contains(&"清华大学".to_string()), "got {t:?}");
        assert_eq!(t.concat(), "我来到北京清华大学");
    }

    #[test]
    fn cache_returns_same_set_without_rereading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "the\n\nOf\n").unwrap();
        let cache = StopwordCache::new();
        let first = cache.load(&path, StopwordPolicy::Strict).unwrap();
        assert_eq!(*first, stops(&["the", "of"]));
        fs::remove_file(&path).unwrap();
        let second = cache.load(&path, StopwordPolicy::Strict).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_strict_vs_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let cache = StopwordCache::new();
        let err = cache.load(&path, StopwordPolicy::Strict).unwrap_err();
        assert!(matches!(err, SearchError::Configuration { .. }));
        let set = cache.load(&path, StopwordPolicy::Lenient).unwrap();
        assert!(set.is_empty());
        assert!(cache.is_empty(), "fallback set must not be cached");
    }
}
