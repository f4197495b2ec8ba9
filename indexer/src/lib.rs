//! Offline index build: a directory of crawled `*.json` documents in, the
//! three index artifacts out. Bad documents are skipped, never fatal.

use indicatif::{ProgressBar, ProgressStyle};
use polysearch_core::builder::{IndexBuilder, Ingested, RawDocument};
use polysearch_core::persist::{save_snapshot, IndexPaths};
use polysearch_core::tokenizer::Tokenizer;
use polysearch_core::{DocId, SearchError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub files: usize,
    pub indexed: usize,
    /// Parsed fine but produced no tokens.
    pub empty: usize,
    /// Unreadable, not JSON, or missing required fields.
    pub failed: usize,
    pub terms: usize,
    pub avg_doc_length: f64,
}

/// `*.json` files directly inside `input`, sorted by name so doc ids are
/// stable across rebuilds of the same directory.
pub fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>, SearchError> {
    if !input.is_dir() {
        return Err(SearchError::InputDirMissing(input.to_path_buf()));
    }
    let files: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    if files.is_empty() {
        return Err(SearchError::NoInputDocuments(input.to_path_buf()));
    }
    Ok(files)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner} building index [{bar:40}] {pos}/{len} {msg} [{elapsed}<{eta}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Index every document under `input` and write the artifacts to `output`.
///
/// Each file's position in name order is its doc id; ids of skipped files
/// are left unused.
pub fn build_index(
    input: &Path,
    output: &IndexPaths,
    tokenizer: Arc<Tokenizer>,
    show_progress: bool,
) -> Result<BuildReport, SearchError> {
    let files = collect_input_files(input)?;
    let mut builder = IndexBuilder::new(tokenizer);
    let mut report = BuildReport { files: files.len(), ..Default::default() };
    let pb = progress_bar(files.len(), show_progress);

    for (position, path) in files.iter().enumerate() {
        let doc_id = position as DocId;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match ingest_file(&mut builder, doc_id, &name, path) {
            Ok(Ingested::Indexed(_)) => report.indexed += 1,
            Ok(Ingested::Empty) => {
                report.empty += 1;
                pb.suspend(|| tracing::debug!(file = %name, "no tokens, skipped"));
            }
            Err(e) => {
                report.failed += 1;
                pb.suspend(|| tracing::warn!(file = %name, error = %e, "skipping document"));
            }
        }
        pb.inc(1);
        pb.set_message(format!("terms={}", builder.num_terms()));
    }
    pb.finish_and_clear();

    if builder.is_empty() {
        return Err(SearchError::NoIndexableDocuments(report.files));
    }

    let snapshot = builder.finish();
    report.terms = snapshot.index.num_terms();
    report.avg_doc_length = snapshot.stats.avg_doc_length;
    save_snapshot(output, &snapshot)?;

    tracing::info!(
        files = report.files,
        indexed = report.indexed,
        empty = report.empty,
        failed = report.failed,
        terms = report.terms,
        avg_doc_length = report.avg_doc_length,
        output = %output.root.display(),
        "index build complete"
    );
    Ok(report)
}

fn ingest_file(builder: &mut IndexBuilder, doc_id: DocId, name: &str, path: &Path) -> Result<Ingested, SearchError> {
    let text = fs::read_to_string(path)?;
    let doc: RawDocument = serde_json::from_str(&text).map_err(|e| SearchError::MalformedDocument {
        name: name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    builder.add(doc_id, name, doc)
}
