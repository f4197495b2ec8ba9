use crate::config::{SearchConfig, SearchSettings};
use crate::error::Result;
use crate::index::{DocId, IndexSnapshot, StoredDocument};
use crate::language::{Language, LanguageHeuristic};
use crate::persist::load_snapshot;
use crate::query;
use crate::rank::Bm25;
use crate::retrieve::BooleanRetriever;
use crate::segment::{read_word_list, JiebaSegmenter, MaxMatchSegmenter, Segmenter, SegmenterKind};
use crate::snippet::snippet;
use crate::spellcheck::{SpellChecker, Vocabulary};
use crate::synonyms::{SynonymExpander, Thesaurus};
use crate::tokenizer::{Stopwords, Tokenizer};
use serde::Serialize;
use std::sync::Arc;

pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub language: Language,
    pub score: f64,
    pub category: String,
}

/// What preprocessing did to a query; `None` means that stage left it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessedQuery {
    pub corrected: Option<String>,
    pub expanded: Option<String>,
}

/// Language-specific resources shared by indexing and serving.
pub struct Resources {
    pub tokenizer: Arc<Tokenizer>,
    pub spellchecker: SpellChecker,
    pub expander: SynonymExpander,
}

impl Resources {
    pub fn load(config: &SearchConfig) -> Result<Self> {
        let res = &config.resources;
        let en_vocab = Vocabulary::load(&res.en_dictionary)?;
        let zh_vocab = Vocabulary::load(&res.zh_dictionary)?;
        let segmenter = build_segmenter(config, &zh_vocab)?;
        let stopwords = Stopwords::load(res.en_stopwords.as_deref(), res.zh_stopwords.as_deref())?;
        let tokenizer = Arc::new(Tokenizer::new(segmenter.clone(), stopwords));
        let spellchecker = SpellChecker::new(en_vocab, zh_vocab, segmenter)
            .with_scan_limit(config.search.spell_scan_limit);
        let expander = SynonymExpander::new(
            Thesaurus::load(&res.en_thesaurus)?,
            Thesaurus::load(&res.zh_thesaurus)?,
            tokenizer.clone(),
        );
        Ok(Self { tokenizer, spellchecker, expander })
    }
}

/// Segmenter picked by config. The max-match variant uses the Chinese
/// spellcheck vocabulary plus the optional user dictionary as its word list.
pub fn build_segmenter(config: &SearchConfig, zh_vocab: &Vocabulary) -> Result<Arc<dyn Segmenter>> {
    let user_dict = config.resources.user_dictionary.as_deref();
    let segmenter: Arc<dyn Segmenter> = match config.resources.segmenter {
        SegmenterKind::Jieba => match user_dict {
            Some(path) => Arc::new(JiebaSegmenter::with_user_dictionary(path)?),
            None => Arc::new(JiebaSegmenter::new()),
        },
        SegmenterKind::MaxMatch => {
            let mut words: Vec<String> = zh_vocab.iter().map(str::to_string).collect();
            if let Some(path) = user_dict {
                words.extend(read_word_list(path)?);
            }
            Arc::new(MaxMatchSegmenter::new(words))
        }
    };
    tracing::debug!(segmenter = segmenter.name(), "chinese segmenter ready");
    Ok(segmenter)
}

/// Read-only query service over one immutable [`IndexSnapshot`].
///
/// Nothing here mutates after construction, so a single engine can serve
/// concurrent queries from many threads. Picking up a rebuilt index means
/// constructing a new engine and swapping it in.
pub struct SearchEngine {
    snapshot: Arc<IndexSnapshot>,
    resources: Resources,
    settings: SearchSettings,
    detector: LanguageHeuristic,
    bm25: Bm25,
}

impl SearchEngine {
    pub fn new(snapshot: Arc<IndexSnapshot>, resources: Resources, settings: SearchSettings) -> Self {
        Self { snapshot, resources, settings, detector: LanguageHeuristic::for_queries(), bm25: Bm25::default() }
    }

    /// Load resources and index artifacts named by `config`. Fails with
    /// `IndexNotBuilt` when any artifact is missing.
    pub fn open(config: &SearchConfig) -> Result<Self> {
        let snapshot = load_snapshot(&config.index.paths())?;
        let resources = Resources::load(config)?;
        Ok(Self::new(Arc::new(snapshot), resources, config.search.clone()))
    }

    pub fn snapshot(&self) -> &Arc<IndexSnapshot> {
        &self.snapshot
    }

    /// Spell-correct, optionally expand, retrieve, rank and render results.
    ///
    /// A blank query returns no results. A query starting with an operator
    /// is reported as `SearchError::LeadingOperator`.
    pub fn search(&self, query: &str, top_n: Option<usize>) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let top_n = top_n.unwrap_or(self.settings.default_results);
        let language = self.detector.detect(query);

        let corrected = self.resources.spellchecker.correct(query);
        let effective = if self.settings.expand_synonyms {
            self.resources.expander.expand(&corrected)
        } else {
            corrected
        };

        let parsed = query::parse(&effective, language, &self.resources.tokenizer)?;
        let candidates = BooleanRetriever::new(&self.snapshot.index).retrieve(&parsed);
        if candidates.is_empty() {
            tracing::debug!(query, effective, "no candidates");
            return Ok(Vec::new());
        }

        let terms = self.resources.tokenizer.tokenize(&effective, language);
        let ranked = self.bm25.rank(&terms, &candidates, &self.snapshot.index, &self.snapshot.stats);

        let results = ranked
            .into_iter()
            .take(top_n)
            .filter_map(|(doc_id, score)| {
                let doc = self.snapshot.documents.get(&doc_id)?;
                Some(self.render(doc_id, doc, score, &terms, language))
            })
            .collect();
        Ok(results)
    }

    fn render(&self, doc_id: DocId, doc: &StoredDocument, score: f64, terms: &[String], language: Language) -> SearchResult {
        SearchResult {
            doc_id,
            title: doc.title.clone(),
            url: doc.url.clone(),
            snippet: snippet(&doc.content, terms, language, self.settings.max_snippet_length),
            language: doc.language,
            score,
            category: doc.topic_name.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()),
        }
    }

    /// Report whether spelling correction or synonym expansion would change `query`.
    pub fn processed_query(&self, query: &str) -> ProcessedQuery {
        let corrected = self.resources.spellchecker.correct(query);
        let expanded = self.resources.expander.expand(&corrected);
        ProcessedQuery {
            expanded: (expanded != corrected).then_some(expanded),
            corrected: (corrected != query).then_some(corrected),
        }
    }

    pub fn suggest_spelling(&self, word: &str) -> Vec<String> {
        self.resources.spellchecker.suggest(word, self.detector.detect(word))
    }

    pub fn suggest_synonyms(&self, word: &str) -> Vec<String> {
        self.resources.expander.suggest(word, self.detector.detect(word))
    }

    pub fn document(&self, doc_id: DocId) -> Option<&StoredDocument> {
        self.snapshot.documents.get(&doc_id)
    }
}
