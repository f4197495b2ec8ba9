//! Multilingual (Chinese/English) document search: tokenization, boolean
//! retrieval over an inverted index, BM25 ranking and query preprocessing.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod language;
pub mod persist;
pub mod query;
pub mod rank;
pub mod retrieve;
pub mod segment;
pub mod snippet;
pub mod spellcheck;
pub mod synonyms;
pub mod tokenizer;

pub use config::SearchConfig;
pub use engine::{ProcessedQuery, SearchEngine, SearchResult};
pub use error::{Result, SearchError};
pub use index::{CorpusStats, DocId, IndexSnapshot, InvertedIndex, StoredDocument};
pub use language::{Language, LanguageHeuristic};
