use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub url: String,
    pub title: String,
    pub content: String,
    pub language: Language,
    /// Token count before stopword filtering.
    pub length: usize,
    /// Annotations written later by the topic-modeling job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
}

/// term -> (doc id -> term frequency). Stored frequencies are always >= 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: HashMap<String, HashMap<DocId, u32>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tf` occurrences of `term` in `doc_id`; zero counts are ignored.
    pub fn insert(&mut self, term: impl Into<String>, doc_id: DocId, tf: u32) {
        if tf == 0 {
            return;
        }
        self.terms.entry(term.into()).or_default().insert(doc_id, tf);
    }

    pub fn postings(&self, term: &str) -> Option<&HashMap<DocId, u32>> {
        self.terms.get(term)
    }

    /// Ids of documents containing `term`; empty for unknown terms.
    pub fn doc_ids(&self, term: &str) -> BTreeSet<DocId> {
        self.terms
            .get(term)
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, HashMap::len)
    }

    pub fn term_freq(&self, term: &str, doc_id: DocId) -> Option<u32> {
        self.terms.get(term).and_then(|p| p.get(&doc_id)).copied()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }
}

/// Per-document lengths and corpus-wide averages used by BM25.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub doc_lengths: HashMap<DocId, usize>,
    pub avg_doc_length: f64,
    pub total_docs: usize,
}

impl CorpusStats {
    pub fn from_documents(documents: &HashMap<DocId, StoredDocument>) -> Self {
        let doc_lengths: HashMap<DocId, usize> =
            documents.iter().map(|(id, d)| (*id, d.length)).collect();
        let total_docs = doc_lengths.len();
        let total: usize = doc_lengths.values().sum();
        let avg_doc_length = if total_docs > 0 { total as f64 / total_docs as f64 } else { 0.0 };
        Self { doc_lengths, avg_doc_length, total_docs }
    }
}

/// Everything a search engine reads. Built once and never mutated; a new
/// index means loading a new snapshot and swapping it in.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    pub index: InvertedIndex,
    pub stats: CorpusStats,
    pub documents: HashMap<DocId, StoredDocument>,
}

impl IndexSnapshot {
    pub fn new(index: InvertedIndex, stats: CorpusStats, documents: HashMap<DocId, StoredDocument>) -> Self {
        Self { index, stats, documents }
    }
}
