use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraction of CJK characters above which a query counts as Chinese.
pub const QUERY_CJK_RATIO: f64 = 0.3;

/// Strategies for deciding whether text is Chinese or English.
///
/// The indexer and the query path deliberately use different rules: a
/// document is Chinese as soon as it contains any ideograph, while a query
/// must be at least [`QUERY_CJK_RATIO`] ideographs. Mixed documents with a
/// few Chinese words therefore index as Chinese but a query made of the same
/// text can be treated as English.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LanguageHeuristic {
    /// Any char in U+4E00..=U+9FFF.
    CjkPresence,
    /// Share of chars in U+4E00..=U+9FA5 strictly above the threshold.
    CjkRatio(f64),
}

impl LanguageHeuristic {
    pub fn for_documents() -> Self {
        LanguageHeuristic::CjkPresence
    }

    pub fn for_queries() -> Self {
        LanguageHeuristic::CjkRatio(QUERY_CJK_RATIO)
    }

    pub fn detect(&self, text: &str) -> Language {
        match *self {
            LanguageHeuristic::CjkPresence => {
                if text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)) {
                    Language::Zh
                } else {
                    Language::En
                }
            }
            LanguageHeuristic::CjkRatio(threshold) => {
                let total = text.chars().count().max(1);
                let zh = text.chars().filter(|c| ('\u{4e00}'..='\u{9fa5}').contains(c)).count();
                if zh as f64 / total as f64 > threshold {
                    Language::Zh
                } else {
                    Language::En
                }
            }
        }
    }
}

/// True for CJK unified ideographs, the range the tokenizer keeps for Chinese.
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}
