use crate::language::{Language, LanguageHeuristic};
use crate::query::Operator;
use crate::tokenizer::Tokenizer;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Synonyms added per query word during expansion.
pub const EXPANSION_WIDTH: usize = 2;
pub const MAX_SUGGESTIONS: usize = 3;

/// word -> ordered synonym candidates, for one language.
#[derive(Debug, Clone, Default)]
pub struct Thesaurus {
    entries: HashMap<String, Vec<String>>,
}

impl Thesaurus {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    /// Parse `word:syn1,syn2,...` lines; lines without a colon are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let Some((word, synonyms)) = line.trim().split_once(':') else { continue };
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            let synonyms: Vec<String> = synonyms
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            entries.insert(word.to_string(), synonyms);
        }
        Self { entries }
    }

    /// A missing file is an empty thesaurus.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "thesaurus missing, synonym expansion disabled");
            return Ok(Self::default());
        }
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn synonyms(&self, word: &str) -> &[String] {
        self.entries.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrites each query word into `word OR syn1 OR syn2`, leaving boolean
/// operators in place.
///
/// The groups are spliced into the flat operator stream without grouping,
/// so `a AND b` with a synonym for `b` evaluates as `(a AND b) OR syn`.
pub struct SynonymExpander {
    en: Thesaurus,
    zh: Thesaurus,
    tokenizer: Arc<Tokenizer>,
    detector: LanguageHeuristic,
}

impl SynonymExpander {
    pub fn new(en: Thesaurus, zh: Thesaurus, tokenizer: Arc<Tokenizer>) -> Self {
        Self { en, zh, tokenizer, detector: LanguageHeuristic::for_queries() }
    }

    fn thesaurus(&self, language: Language) -> &Thesaurus {
        match language {
            Language::En => &self.en,
            Language::Zh => &self.zh,
        }
    }

    fn lookup<'a>(&'a self, word: &str, language: Language) -> &'a [String] {
        match language {
            Language::En => self.thesaurus(language).synonyms(&word.to_lowercase()),
            Language::Zh => self.thesaurus(language).synonyms(word),
        }
    }

    pub fn expand(&self, query: &str) -> String {
        let language = self.detector.detect(query);
        let groups: Vec<String> = self
            .tokenizer
            .split_terms(query, language)
            .into_iter()
            .map(|word| {
                if let Some(op) = Operator::from_keyword(&word) {
                    return op.keyword().to_string();
                }
                let mut group = vec![word.as_str()];
                group.extend(
                    self.lookup(&word, language)
                        .iter()
                        .take(EXPANSION_WIDTH)
                        .map(String::as_str),
                );
                group.join(" OR ")
            })
            .collect();
        match language {
            Language::En => groups.join(" "),
            Language::Zh => groups.concat(),
        }
    }

    /// Up to three synonyms for a single word.
    pub fn suggest(&self, word: &str, language: Language) -> Vec<String> {
        self.lookup(word, language).iter().take(MAX_SUGGESTIONS).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::MaxMatchSegmenter;
    use crate::tokenizer::Stopwords;

    fn expander() -> SynonymExpander {
        let en = Thesaurus::parse("car:automobile,vehicle,auto\nfast: quick , rapid\nbroken line\n");
        let zh = Thesaurus::parse("电脑:计算机,微机,PC\n");
        let seg = MaxMatchSegmenter::new(["电脑", "维修"]);
        let tokenizer = Arc::new(Tokenizer::new(Arc::new(seg), Stopwords::builtin()));
        SynonymExpander::new(en, zh, tokenizer)
    }

    #[test]
    fn parses_thesaurus_lines() {
        let t = Thesaurus::parse("fast: quick , rapid\nno colon here\n:orphan\n");
        assert_eq!(t.synonyms("fast"), ["quick", "rapid"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn english_groups_take_two_synonyms_and_keep_operators() {
        let out = expander().expand("Car and fast");
        assert_eq!(out, "Car OR automobile OR vehicle AND fast OR quick OR rapid");
    }

    #[test]
    fn chinese_groups_are_joined_without_spaces() {
        let out = expander().expand("电脑维修");
        assert_eq!(out, "电脑 OR 计算机 OR 微机维修");
    }

    #[test]
    fn unknown_words_pass_through() {
        assert_eq!(expander().expand("plain words"), "plain words");
    }

    #[test]
    fn suggestions_come_from_the_detected_language() {
        let e = expander();
        assert_eq!(e.suggest("car", Language::En), vec!["automobile", "vehicle", "auto"]);
        assert!(e.suggest("电脑", Language::En).is_empty());
        assert_eq!(e.suggest("电脑", Language::Zh).len(), 3);
    }
}
