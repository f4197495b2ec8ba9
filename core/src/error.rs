use std::path::PathBuf;
use thiserror::Error;

/// Every failure the search core reports. Callers match on the variant (or
/// on [`SearchError::kind`]) rather than on message text.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query cannot start with an operator: {0}")]
    LeadingOperator(String),

    #[error("index artifact missing at {}; run the indexer first", .0.display())]
    IndexNotBuilt(PathBuf),

    #[error("malformed document {name}: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("input directory not found: {}", .0.display())]
    InputDirMissing(PathBuf),

    #[error("no *.json documents found in {}", .0.display())]
    NoInputDocuments(PathBuf),

    #[error("none of the {0} input files produced an indexable document")]
    NoIndexableDocuments(usize),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    /// Stable identifier for the error kind, suitable for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::LeadingOperator(_) => "LeadingOperatorError",
            SearchError::IndexNotBuilt(_) => "IndexNotBuilt",
            SearchError::MalformedDocument { .. } => "MalformedDocument",
            SearchError::InputDirMissing(_) => "InputDirMissing",
            SearchError::NoInputDocuments(_) => "NoInputDocuments",
            SearchError::NoIndexableDocuments(_) => "NoIndexableDocuments",
            SearchError::Config(_) => "ConfigError",
            SearchError::Io(_) => "IoError",
            SearchError::Json(_) => "JsonError",
        }
    }
}

impl From<figment::Error> for SearchError {
    fn from(err: figment::Error) -> Self {
        SearchError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
