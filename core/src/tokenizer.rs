use crate::language::Language;
use crate::segment::Segmenter;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    static ref NON_WORD_OR_CJK: Regex = Regex::new(r"[^\w\s\x{4e00}-\x{9fa5}]").expect("valid regex");
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
    static ref EN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    static ref ZH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "的","了","和","是","在","我","有","就","不","人","都","一","一个","上","也","很","到","说","要","去",
            "你","会","着","没有","看","好","自己","这","那","这个","那个","我们","你们","他们","她们","它们",
            "以及","而且","但是","因为","所以","如果","或者","还是","并且","可以","这些","那些","什么","怎么",
        ];
        words.iter().copied().collect()
    };
}

/// Per-language stopword sets, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    en: HashSet<String>,
    zh: HashSet<String>,
}

impl Stopwords {
    pub fn builtin() -> Self {
        Self {
            en: EN_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            zh: ZH_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Load both lists; a language whose file is absent keeps the built-in list.
    pub fn load(en_path: Option<&Path>, zh_path: Option<&Path>) -> crate::Result<Self> {
        let builtin = Self::builtin();
        let en = match en_path {
            Some(p) if p.exists() => load_word_set(p)?,
            Some(p) => {
                tracing::warn!(path = %p.display(), "english stopword file missing, using built-in list");
                builtin.en
            }
            None => builtin.en,
        };
        let zh = match zh_path {
            Some(p) if p.exists() => load_word_set(p)?,
            Some(p) => {
                tracing::warn!(path = %p.display(), "chinese stopword file missing, using built-in list");
                builtin.zh
            }
            None => builtin.zh,
        };
        Ok(Self { en, zh })
    }

    pub fn contains(&self, language: Language, word: &str) -> bool {
        match language {
            Language::En => self.en.contains(word),
            Language::Zh => self.zh.contains(word),
        }
    }
}

/// One trimmed, non-empty word per line.
pub fn load_word_set(path: &Path) -> crate::Result<HashSet<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut set = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            set.insert(word.to_string());
        }
    }
    Ok(set)
}

/// Shortest token kept, in chars, per language.
pub fn min_token_len(language: Language) -> usize {
    match language {
        Language::Zh => 2,
        Language::En => 3,
    }
}

/// Language-aware tokenizer shared by indexing and querying.
pub struct Tokenizer {
    segmenter: Arc<dyn Segmenter>,
    stopwords: Stopwords,
}

impl Tokenizer {
    pub fn new(segmenter: Arc<dyn Segmenter>, stopwords: Stopwords) -> Self {
        Self { segmenter, stopwords }
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Lowercased tokens with stopwords and short tokens removed.
    pub fn tokenize(&self, text: &str, language: Language) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let min_len = min_token_len(language);
        self.raw_tokens(text, language)
            .into_iter()
            .filter(|t| t.chars().count() >= min_len && !self.stopwords.contains(language, t))
            .collect()
    }

    /// Terms without any filtering or lowercasing: whitespace-split words
    /// for English, segmenter pieces (minus whitespace) for Chinese. Boolean
    /// operator keywords survive intact.
    pub fn split_terms(&self, text: &str, language: Language) -> Vec<String> {
        match language {
            Language::En => text.split_whitespace().map(str::to_string).collect(),
            Language::Zh => self
                .segmenter
                .segment(text)
                .into_iter()
                .filter(|w| !w.trim().is_empty())
                .collect(),
        }
    }

    fn raw_tokens(&self, text: &str, language: Language) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        match language {
            Language::Zh => {
                let cleaned = NON_WORD_OR_CJK.replace_all(&normalized, "");
                self.segmenter
                    .segment(&cleaned)
                    .into_iter()
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect()
            }
            Language::En => {
                let cleaned = NON_WORD.replace_all(&normalized, " ");
                WORD.find_iter(&cleaned).map(|m| m.as_str().to_string()).collect()
            }
        }
    }
}
