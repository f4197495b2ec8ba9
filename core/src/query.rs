//! Flat boolean query language: terms separated by `AND`, `OR`, `NOT`,
//! evaluated strictly left to right with no precedence or grouping.

use crate::error::{Result, SearchError};
use crate::language::Language;
use crate::tokenizer::Tokenizer;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    /// Case-insensitive keyword match.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("AND") {
            Some(Operator::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(Operator::Or)
        } else if word.eq_ignore_ascii_case("NOT") {
            Some(Operator::Not)
        } else {
            None
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTerm {
    pub term: String,
    /// Operator joining this term to everything before it; `None` only for the seed.
    pub operator: Option<Operator>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedQuery {
    terms: Vec<QueryTerm>,
}

impl ParsedQuery {
    /// Build from raw `(term, operator)` pairs; the first operator is cleared.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Operator>)>,
        S: Into<String>,
    {
        let mut terms: Vec<QueryTerm> = terms
            .into_iter()
            .map(|(term, operator)| QueryTerm { term: term.into(), operator })
            .collect();
        if let Some(first) = terms.first_mut() {
            first.operator = None;
        }
        Self { terms }
    }

    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

/// Parse `query` into `(term, operator)` pairs.
///
/// Operator keywords must stand alone between whitespace. Words between
/// keywords form one segment, which is run through the language tokenizer;
/// every token of a segment carries the operator pending before it. When
/// keywords repeat (`AND NOT`) the last one wins.
pub fn parse(query: &str, language: Language, tokenizer: &Tokenizer) -> Result<ParsedQuery> {
    let mut words = query.split_whitespace().peekable();
    if let Some(first) = words.peek() {
        if Operator::from_keyword(first).is_some() {
            return Err(SearchError::LeadingOperator(query.trim().to_string()));
        }
    }

    let mut terms: Vec<(String, Option<Operator>)> = Vec::new();
    let mut pending: Option<Operator> = None;
    let mut segment: Vec<&str> = Vec::new();

    for word in words {
        match Operator::from_keyword(word) {
            Some(op) => {
                flush_segment(&mut segment, pending, language, tokenizer, &mut terms);
                pending = Some(op);
            }
            None => segment.push(word),
        }
    }
    flush_segment(&mut segment, pending, language, tokenizer, &mut terms);

    Ok(ParsedQuery::from_terms(terms))
}

fn flush_segment(
    segment: &mut Vec<&str>,
    operator: Option<Operator>,
    language: Language,
    tokenizer: &Tokenizer,
    terms: &mut Vec<(String, Option<Operator>)>,
) {
    if segment.is_empty() {
        return;
    }
    for token in tokenizer.tokenize(&segment.join(" "), language) {
        terms.push((token, operator));
    }
    segment.clear();
}
