use crate::index::{CorpusStats, DocId, InvertedIndex};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Okapi BM25 with a +1 shifted idf.
#[derive(Debug, Clone, Copy)]
pub struct Bm25 {
    pub k1: f64, // term frequency saturation
    pub b: f64,  // length normalization strength
}

impl Default for Bm25 {
    fn default() -> Self {
        Bm25 { k1: 1.5, b: 0.75 }
    }
}

impl Bm25 {
    /// `ln((N - df + 0.5) / (df + 0.5)) + 1`
    pub fn idf(&self, total_docs: usize, doc_freq: usize) -> f64 {
        let n = total_docs as f64;
        let df = doc_freq as f64;
        ((n - df + 0.5) / (df + 0.5)).ln() + 1.0
    }

    pub fn term_score(&self, idf: f64, tf: u32, doc_length: f64, avg_doc_length: f64) -> f64 {
        let tf = tf as f64;
        let avg = if avg_doc_length > 0.0 { avg_doc_length } else { 1.0 };
        let numerator = tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (doc_length / avg));
        idf * numerator / denominator
    }

    /// Score `candidates` against `terms` and order them by descending score,
    /// breaking ties by ascending doc id. Terms missing from the index add
    /// nothing; a repeated query term counts once per occurrence.
    pub fn rank(
        &self,
        terms: &[String],
        candidates: &[DocId],
        index: &InvertedIndex,
        stats: &CorpusStats,
    ) -> Vec<(DocId, f64)> {
        let mut scores: HashMap<DocId, f64> = candidates.iter().map(|d| (*d, 0.0)).collect();
        for term in terms {
            let Some(postings) = index.postings(term) else { continue };
            let idf = self.idf(stats.total_docs, postings.len());
            for (doc_id, score) in scores.iter_mut() {
                let Some(&tf) = postings.get(doc_id) else { continue };
                let doc_length = stats
                    .doc_lengths
                    .get(doc_id)
                    .map(|l| *l as f64)
                    .unwrap_or(stats.avg_doc_length);
                *score += self.term_score(idf, tf, doc_length, stats.avg_doc_length);
            }
        }

        let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        ranked
    }
}
