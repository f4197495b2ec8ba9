//! Configuration: built-in defaults, then an optional TOML file, then
//! `POLYSEARCH_*` environment variables (`__` separates nested keys, e.g.
//! `POLYSEARCH_SEARCH__DEFAULT_RESULTS=20`).

use crate::error::Result;
use crate::persist::IndexPaths;
use crate::segment::SegmenterKind;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "POLYSEARCH_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub index: IndexConfig,
    pub resources: ResourceConfig,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding `inverted_index.json` and `meta.json`.
    pub dir: PathBuf,
    /// Document store; defaults to `<dir>/documents.json`.
    pub documents: Option<PathBuf>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("data/index"), documents: None }
    }
}

impl IndexConfig {
    pub fn paths(&self) -> IndexPaths {
        match &self.documents {
            Some(docs) => IndexPaths::with_documents(&self.dir, docs),
            None => IndexPaths::new(&self.dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub en_stopwords: Option<PathBuf>,
    pub zh_stopwords: Option<PathBuf>,
    pub en_dictionary: PathBuf,
    pub zh_dictionary: PathBuf,
    pub en_thesaurus: PathBuf,
    pub zh_thesaurus: PathBuf,
    pub segmenter: SegmenterKind,
    /// Extra words for the Chinese segmenter.
    pub user_dictionary: Option<PathBuf>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            en_stopwords: Some(PathBuf::from("config/stopwords/en_stopwords.txt")),
            zh_stopwords: Some(PathBuf::from("config/stopwords/zh_stopwords.txt")),
            en_dictionary: PathBuf::from("config/spellcheck/en_dict.txt"),
            zh_dictionary: PathBuf::from("config/spellcheck/zh_dict.txt"),
            en_thesaurus: PathBuf::from("config/synonyms/en_thesaurus.txt"),
            zh_thesaurus: PathBuf::from("config/synonyms/zh_thesaurus.txt"),
            segmenter: SegmenterKind::default(),
            user_dictionary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_results: usize,
    pub max_snippet_length: usize,
    /// Run synonym expansion on the search path, not only as a diagnostic.
    pub expand_synonyms: bool,
    /// Vocabulary entries examined per misspelled word.
    pub spell_scan_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_results: 100, max_snippet_length: 200, expand_synonyms: false, spell_scan_limit: 50_000 }
    }
}

impl SearchConfig {
    /// Defaults merged with `path` (when it exists) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(SearchConfig::default()));
        if let Some(p) = path {
            if p.exists() {
                figment = figment.merge(Toml::file(p));
            } else {
                tracing::warn!(path = %p.display(), "config file not found, using defaults");
            }
        }
        let config: SearchConfig = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.search.default_results == 0 {
            return Err(crate::SearchError::Config("search.default_results must be positive".into()));
        }
        if self.search.max_snippet_length == 0 {
            return Err(crate::SearchError::Config("search.max_snippet_length must be positive".into()));
        }
        Ok(())
    }
}
