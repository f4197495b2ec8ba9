//! Chinese word segmentation behind a swappable [`Segmenter`] capability.
//!
//! Both segmenters return pieces that concatenate back to the input: runs of
//! whitespace, punctuation and Latin words come back as their own pieces so
//! callers can rebuild the original text after rewriting individual words.

use crate::language::is_cjk;
use jieba_rs::Jieba;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmenterKind {
    /// Dictionary DAG with HMM for unknown words (jieba).
    #[default]
    Jieba,
    /// Forward maximum match over a plain word list.
    MaxMatch,
}

/// Forward maximum-match segmenter over a word dictionary.
pub struct MaxMatchSegmenter {
    words: HashSet<String>,
    max_word_len: usize,
}

impl MaxMatchSegmenter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w| !w.is_empty())
            .collect();
        let max_word_len = words.iter().map(|w| w.chars().count()).max().unwrap_or(1);
        Self { words, max_word_len }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Longest dictionary word starting at `start`, falling back to one char.
    fn longest_match(&self, chars: &[char], start: usize) -> usize {
        let cjk_run = chars[start..].iter().take_while(|c| is_cjk(**c)).count();
        let upper = cjk_run.min(self.max_word_len);
        for len in (2..=upper).rev() {
            let candidate: String = chars[start..start + len].iter().collect();
            if self.words.contains(&candidate) {
                return len;
            }
        }
        1
    }
}

impl Segmenter for MaxMatchSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let len = if is_cjk(c) {
                self.longest_match(&chars, i)
            } else if c.is_whitespace() {
                chars[i..].iter().take_while(|c| c.is_whitespace()).count()
            } else if c.is_alphanumeric() || c == '_' {
                chars[i..]
                    .iter()
                    .take_while(|c| (c.is_alphanumeric() || **c == '_') && !is_cjk(**c))
                    .count()
            } else {
                1
            };
            pieces.push(chars[i..i + len].iter().collect());
            i += len;
        }
        pieces
    }

    fn name(&self) -> &str {
        "max_match"
    }
}

pub struct JiebaSegmenter {
    jieba: Jieba,
}

impl JiebaSegmenter {
    pub fn new() -> Self {
        Self { jieba: Jieba::new() }
    }

    /// Default jieba dictionary extended with a user word list
    /// (`word [freq] [tag]` per line).
    pub fn with_user_dictionary(path: &Path) -> crate::Result<Self> {
        let mut jieba = Jieba::new();
        let mut reader = BufReader::new(File::open(path)?);
        jieba
            .load_dict(&mut reader)
            .map_err(|e| crate::SearchError::Config(format!("user dictionary {}: {e}", path.display())))?;
        Ok(Self { jieba })
    }
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.jieba.cut(text, true).into_iter().map(str::to_string).collect()
    }

    fn name(&self) -> &str {
        "jieba"
    }
}

/// Read a one-word-per-line list; only the first whitespace field is used so
/// jieba-style `word freq tag` files work too.
pub fn read_word_list(path: &Path) -> crate::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(word) = line.split_whitespace().next() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}
