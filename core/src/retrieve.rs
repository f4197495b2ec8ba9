use crate::index::{DocId, InvertedIndex};
use crate::query::{Operator, ParsedQuery};
use std::collections::BTreeSet;

/// Evaluates a [`ParsedQuery`] against posting sets.
pub struct BooleanRetriever<'a> {
    index: &'a InvertedIndex,
}

impl<'a> BooleanRetriever<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index }
    }

    /// Left fold over the terms: AND intersects, OR unions, NOT subtracts.
    /// Returns ids in ascending order.
    pub fn retrieve(&self, query: &ParsedQuery) -> Vec<DocId> {
        let mut terms = query.terms().iter();
        let Some(seed) = terms.next() else {
            return Vec::new();
        };
        let mut result: BTreeSet<DocId> = self.index.doc_ids(&seed.term);
        for t in terms {
            let docs = self.index.doc_ids(&t.term);
            result = match t.operator {
                Some(Operator::And) => result.intersection(&docs).copied().collect(),
                Some(Operator::Or) => result.union(&docs).copied().collect(),
                Some(Operator::Not) => result.difference(&docs).copied().collect(),
                // Later words of the first segment have no operator and leave
                // the set as is; they still count towards ranking.
                None => result,
            };
        }
        result.into_iter().collect()
    }
}
