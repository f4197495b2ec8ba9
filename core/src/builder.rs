use crate::error::{Result, SearchError};
use crate::index::{CorpusStats, DocId, IndexSnapshot, InvertedIndex, StoredDocument};
use crate::language::LanguageHeuristic;
use crate::tokenizer::Tokenizer;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One crawled page as written by the crawler. Only `url`, `title` and
/// `content` are required; the crawler's own `language` guess is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    pub url: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Outcome of adding one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// Stored with this many tokens.
    Indexed(usize),
    /// Tokenized to nothing; not stored.
    Empty,
}

/// Accumulates documents into an in-memory inverted index.
pub struct IndexBuilder {
    tokenizer: Arc<Tokenizer>,
    detector: LanguageHeuristic,
    index: InvertedIndex,
    documents: HashMap<DocId, StoredDocument>,
}

impl IndexBuilder {
    pub fn new(tokenizer: Arc<Tokenizer>) -> Self {
        Self {
            tokenizer,
            detector: LanguageHeuristic::for_documents(),
            index: InvertedIndex::new(),
            documents: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn num_terms(&self) -> usize {
        self.index.num_terms()
    }

    /// Tokenize and index `doc` under `doc_id`.
    ///
    /// `name` only labels the error for a document missing required fields.
    pub fn add(&mut self, doc_id: DocId, name: &str, doc: RawDocument) -> Result<Ingested> {
        let (Some(url), Some(title), Some(content)) = (doc.url, doc.title, doc.content) else {
            return Err(SearchError::MalformedDocument {
                name: name.to_string(),
                reason: "missing one of title, content, url".into(),
            });
        };

        let text = format!("{title} {content}");
        let language = self.detector.detect(&text);
        let tokens = self.tokenizer.tokenize(&text, language);
        if tokens.is_empty() {
            return Ok(Ingested::Empty);
        }

        let stopwords = self.tokenizer.stopwords();
        let mut tf: HashMap<&str, u32> = HashMap::new();
        for token in &tokens {
            if token.chars().count() > 1 && !stopwords.contains(language, token) {
                *tf.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        for (term, count) in tf {
            self.index.insert(term, doc_id, count);
        }

        let length = tokens.len();
        self.documents.insert(
            doc_id,
            StoredDocument { url, title, content, language, length, topic: None, topic_name: None },
        );
        Ok(Ingested::Indexed(length))
    }

    pub fn finish(self) -> IndexSnapshot {
        let stats = CorpusStats::from_documents(&self.documents);
        IndexSnapshot::new(self.index, stats, self.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::MaxMatchSegmenter;
    use crate::tokenizer::Stopwords;
    use crate::Language;

    fn builder() -> IndexBuilder {
        let seg = MaxMatchSegmenter::new(["人工智能", "发展"]);
        IndexBuilder::new(Arc::new(Tokenizer::new(Arc::new(seg), Stopwords::builtin())))
    }

    fn raw(title: &str, content: &str) -> RawDocument {
        RawDocument {
            url: Some(format!("https://example.com/{title}")),
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    #[test]
    fn counts_term_frequencies() {
        let mut b = builder();
        let got = b.add(0, "a.json", raw("Rust", "rust compilers love rust")).unwrap();
        assert_eq!(got, Ingested::Indexed(5));
        let snap = b.finish();
        assert_eq!(snap.index.term_freq("rust", 0), Some(3));
        assert_eq!(snap.index.term_freq("love", 0), Some(1));
        assert_eq!(snap.stats.total_docs, 1);
        assert!((snap.stats.avg_doc_length - 5.0).abs() < 1e-9);
    }

    #[test]
    fn any_ideograph_marks_a_document_chinese() {
        let mut b = builder();
        b.add(4, "zh.json", raw("AI news", "人工智能发展 today")).unwrap();
        let snap = b.finish();
        assert_eq!(snap.documents[&4].language, Language::Zh);
        assert_eq!(snap.index.term_freq("人工智能", 4), Some(1));
    }

    #[test]
    fn missing_fields_and_empty_documents_are_not_stored() {
        let mut b = builder();
        let err = b.add(0, "bad.json", RawDocument { title: Some("x".into()), ..Default::default() }).unwrap_err();
        assert_eq!(err.kind(), "MalformedDocument");
        assert_eq!(b.add(1, "empty.json", raw("a", "of the")).unwrap(), Ingested::Empty);
        b.add(2, "ok.json", raw("falcon", "falcon flight")).unwrap();
        let snap = b.finish();
        assert_eq!(snap.documents.len(), 1);
        assert_eq!(snap.stats.doc_lengths.keys().copied().collect::<Vec<_>>(), vec![2]);
    }
}
