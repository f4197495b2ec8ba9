//! Query spelling correction.
//!
//! English words are matched against the vocabulary by bounded Levenshtein
//! distance. Chinese words are matched by pinyin first (homophones and
//! near-homophones are the usual typing mistake with pinyin IMEs), then by
//! positional character overlap.

use crate::language::{is_cjk, Language, LanguageHeuristic};
use crate::query::Operator;
use crate::segment::Segmenter;
use crate::tokenizer::load_word_set;
use pinyin::ToPinyin;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

pub const MAX_EDIT_DISTANCE: usize = 2;
pub const MAX_SUGGESTIONS: usize = 3;
const MIN_SIMILARITY: f64 = 0.5;

/// Immutable word list for one language.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).filter(|w: &String| !w.is_empty()).collect() }
    }

    /// A missing file is an empty vocabulary.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "spellcheck dictionary missing, corrections disabled");
            return Ok(Self::default());
        }
        Ok(Self { words: load_word_set(path)?.into_iter().collect() })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Levenshtein distance over chars where swapping two adjacent chars also
/// costs one edit (optimal string alignment). Full DP table, O(len1 * len2).
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut d = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        d[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1).min(d[i][j - 1] + 1).min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }
    d[a.len()][b.len()]
}

/// Size of the multiset difference between the chars of `a` and `b`
/// (the larger of the two one-sided differences).
fn bag_distance(a: &str, b: &str) -> usize {
    let mut counts: HashMap<char, isize> = HashMap::new();
    for c in a.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    for c in b.chars() {
        *counts.entry(c).or_insert(0) -= 1;
    }
    let surplus: isize = counts.values().filter(|v| **v > 0).sum();
    let deficit: isize = -counts.values().filter(|v| **v < 0).sum::<isize>();
    surplus.max(deficit) as usize
}

/// Pinyin syllables without tones; non-Chinese chars stand for themselves.
fn pronunciation(word: &str) -> Vec<String> {
    word.chars()
        .map(|c| match c.to_pinyin() {
            Some(p) => p.plain().to_string(),
            None => c.to_string(),
        })
        .collect()
}

fn positional_overlap<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
    same as f64 / a.len() as f64
}

pub struct SpellChecker {
    en: Vocabulary,
    zh: Vocabulary,
    segmenter: Arc<dyn Segmenter>,
    detector: LanguageHeuristic,
    scan_limit: usize,
}

impl SpellChecker {
    pub fn new(en: Vocabulary, zh: Vocabulary, segmenter: Arc<dyn Segmenter>) -> Self {
        Self { en, zh, segmenter, detector: LanguageHeuristic::for_queries(), scan_limit: usize::MAX }
    }

    /// Cap on vocabulary entries examined per misspelled word.
    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit.max(1);
        self
    }

    /// Correct every word of `text`, language chosen from the whole text.
    pub fn correct(&self, text: &str) -> String {
        match self.detector.detect(text) {
            Language::Zh => self.correct_chinese(text),
            Language::En => self.correct_english(text),
        }
    }

    /// Up to three ranked replacements for a single word.
    pub fn suggest(&self, word: &str, language: Language) -> Vec<String> {
        match language {
            Language::En => self.english_suggestions(word),
            Language::Zh => self.chinese_suggestions(word),
        }
    }

    fn correct_english(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                if self.en.contains(&word.to_lowercase()) || Operator::from_keyword(word).is_some() {
                    return word.to_string();
                }
                self.english_suggestions(word)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| word.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn correct_chinese(&self, text: &str) -> String {
        self.segmenter
            .segment(text)
            .into_iter()
            .map(|word| {
                if self.zh.contains(&word) || !word.chars().any(is_cjk) || word.chars().count() < 2 {
                    return word;
                }
                self.chinese_suggestions(&word).into_iter().next().unwrap_or(word)
            })
            .collect()
    }

    fn english_suggestions(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        let len = word.chars().count();
        // (distance, bag distance, candidate)
        let mut found: Vec<(usize, usize, &str)> = self
            .en
            .iter()
            .filter(|v| v.chars().count().abs_diff(len) <= MAX_EDIT_DISTANCE)
            .take(self.scan_limit)
            .filter_map(|v| {
                let lower = v.to_lowercase();
                // A correction must never introduce a boolean operator.
                if Operator::from_keyword(&lower).is_some() {
                    return None;
                }
                let d = edit_distance(&word, &lower);
                (d <= MAX_EDIT_DISTANCE).then(|| (d, bag_distance(&word, &lower), v))
            })
            .collect();
        found.sort();
        found.into_iter().take(MAX_SUGGESTIONS).map(|(_, _, v)| v.to_string()).collect()
    }

    fn chinese_suggestions(&self, word: &str) -> Vec<String> {
        let mut found = self.phonetic_candidates(word);
        if found.is_empty() {
            found = self.overlap_candidates(word);
        }
        found.sort_by(|a, b| {
            (1.0 - a.0)
                .partial_cmp(&(1.0 - b.0))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        found.into_iter().take(MAX_SUGGESTIONS).map(|(_, v)| v.to_string()).collect()
    }

    /// Vocabulary words within one char of `word` whose pinyin matches
    /// position by position at least half the time.
    fn phonetic_candidates(&self, word: &str) -> Vec<(f64, &str)> {
        let len = word.chars().count();
        let sound = pronunciation(word);
        self.zh
            .iter()
            .filter(|v| v.chars().count().abs_diff(len) <= 1)
            .take(self.scan_limit)
            .filter_map(|v| {
                let similarity = positional_overlap(&sound, &pronunciation(v));
                (similarity >= MIN_SIMILARITY).then_some((similarity, v))
            })
            .collect()
    }

    /// Same-length vocabulary words sharing at least half of the chars in place.
    fn overlap_candidates(&self, word: &str) -> Vec<(f64, &str)> {
        let chars: Vec<char> = word.chars().collect();
        self.zh
            .iter()
            .filter(|v| v.chars().count() == chars.len())
            .take(self.scan_limit)
            .filter_map(|v| {
                let other: Vec<char> = v.chars().collect();
                let similarity = positional_overlap(&chars, &other);
                (similarity >= MIN_SIMILARITY).then_some((similarity, v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::MaxMatchSegmenter;

    fn checker(en: &[&str], zh: &[&str], segment_words: &[&str]) -> SpellChecker {
        let seg = MaxMatchSegmenter::new(segment_words.iter().copied());
        SpellChecker::new(Vocabulary::new(en.iter().copied()), Vocabulary::new(zh.iter().copied()), Arc::new(seg))
    }

    #[test]
    fn edit_distance_counts_substitutions_and_swaps() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("teh", "the"), 1);
        assert_eq!(edit_distance("学习", "学系"), 1);
    }

    #[test]
    fn misspelling_prefers_the_anagram() {
        let sc = checker(&["the", "ten", "cat"], &[], &[]);
        let suggestions = sc.suggest("teh", Language::En);
        assert_eq!(suggestions, vec!["the", "ten"]);
    }

    #[test]
    fn english_correction_keeps_known_and_hopeless_words() {
        let sc = checker(&["search", "engine"], &[], &[]);
        assert_eq!(sc.correct("Search engnie xyzzyq"), "Search engine xyzzyq");
        assert_eq!(sc.correct("serch AND engine"), "search AND engine");
    }

    #[test]
    fn corrections_never_become_operators() {
        let sc = checker(&["and", "not", "or", "falcon", "rock", "roll"], &[], &[]);
        assert_eq!(sc.correct("adn falcon"), "adn falcon");
        assert_eq!(sc.correct("rock nto roll"), "rock nto roll");
        assert!(sc.suggest("adn", Language::En).is_empty());
    }

    #[test]
    fn mixed_case_entries_rank_like_lowercase_ones() {
        let sc = checker(&["ABDC", "abce"], &[], &[]);
        assert_eq!(sc.suggest("abcd", Language::En), vec!["ABDC", "abce"]);
    }

    #[test]
    fn chinese_homophone_is_corrected() {
        let sc = checker(&[], &["机器", "学习", "学者"], &["机器", "学系"]);
        assert_eq!(sc.suggest("学系", Language::Zh), vec!["学习", "学者"]);
        assert_eq!(sc.correct("机器学系"), "机器学习");
    }

    #[test]
    fn character_overlap_finds_same_length_words() {
        let sc = checker(&[], &["数据库", "数据"], &[]);
        let found: Vec<&str> = sc.overlap_candidates("数据湖").into_iter().map(|(_, w)| w).collect();
        assert_eq!(found, vec!["数据库"]);
    }

    #[test]
    fn empty_vocabularies_suggest_nothing() {
        let sc = checker(&[], &[], &[]);
        assert!(sc.suggest("anything", Language::En).is_empty());
        assert!(sc.suggest("任何", Language::Zh).is_empty());
        assert_eq!(sc.correct("hello world"), "hello world");
    }

    #[test]
    fn scan_limit_bounds_the_search() {
        let sc = checker(&["aaa", "abc"], &[], &[]).with_scan_limit(1);
        // only "aaa" is examined
        assert!(sc.suggest("xbc", Language::En).is_empty());
        assert_eq!(checker(&["aaa", "abc"], &[], &[]).suggest("xbc", Language::En), vec!["abc"]);
    }
}
