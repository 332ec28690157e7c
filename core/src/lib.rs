//! BM25 retrieval over a fixed corpus of titled documents.
//!
//! Build time: [`extract`] → [`tokenizer`] → [`builder`] → [`persist::save_index`].
//! Query time: [`persist::IndexCache`] → [`retriever`] → [`scorer`].

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod index;
pub mod persist;
pub mod retriever;
pub mod scorer;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use config::{Bm25Params, EngineConfig, FieldWeights};
pub use engine::{RelatedDoc, SearchEngine};
pub use error::{Result, SearchError};
pub use extract::{DocumentSource, ExtractedDoc, HtmlDirectory, MemoryCorpus};
pub use index::{DocId, IndexSnapshot, PostingMap};
pub use persist::{load_index, save_index, IndexCache};
pub use retriever::{Hit, Retriever};
pub use scorer::Bm25Scorer;
pub use tokenizer::{tokenize, StopwordCache, StopwordPolicy, Stopwords};
