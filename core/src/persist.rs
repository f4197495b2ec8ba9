use crate::error::{Result, SearchError};
use crate::{CorpusStats, DocId, IndexSnapshot, InvertedIndex, StoredDocument};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{create_dir_all, remove_file, rename, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Locations of the three index artifacts. The document store may live
/// outside the index directory.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
    pub documents: PathBuf,
}

impl IndexPaths {
    /// All artifacts under `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let documents = root.join("documents.json");
        Self { root, documents }
    }

    pub fn with_documents<P: AsRef<Path>, D: AsRef<Path>>(root: P, documents: D) -> Self {
        Self { root: root.as_ref().to_path_buf(), documents: documents.as_ref().to_path_buf() }
    }

    pub fn inverted_index(&self) -> PathBuf { self.root.join("inverted_index.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = staging_path(path);
    if let Err(e) = write_json(&tmp, value) {
        let _ = remove_file(&tmp);
        return Err(e);
    }
    rename(&tmp, path)?;
    Ok(())
}

/// `<path>.tmp`, next to the final file so the rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SearchError::IndexNotBuilt(path.to_path_buf()),
        _ => SearchError::Io(e),
    })?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

pub fn save_inverted_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    save_json(&paths.inverted_index(), index)
}

pub fn load_inverted_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    load_json(&paths.inverted_index())
}

pub fn save_meta(paths: &IndexPaths, stats: &CorpusStats) -> Result<()> {
    save_json(&paths.meta(), stats)
}

pub fn load_meta(paths: &IndexPaths) -> Result<CorpusStats> {
    load_json(&paths.meta())
}

pub fn save_documents(paths: &IndexPaths, docs: &HashMap<DocId, StoredDocument>) -> Result<()> {
    save_json(&paths.documents, docs)
}

pub fn load_documents(paths: &IndexPaths) -> Result<HashMap<DocId, StoredDocument>> {
    load_json(&paths.documents)
}

/// Write all three artifacts. Every file is staged first and renamed into
/// place only once all of them are on disk, so a failed write leaves the
/// previous snapshot untouched.
pub fn save_snapshot(paths: &IndexPaths, snapshot: &IndexSnapshot) -> Result<()> {
    let targets = [paths.inverted_index(), paths.meta(), paths.documents.clone()];
    let staged: Vec<PathBuf> = targets.iter().map(|p| staging_path(p)).collect();

    let written = write_json(&staged[0], &snapshot.index)
        .and_then(|_| write_json(&staged[1], &snapshot.stats))
        .and_then(|_| write_json(&staged[2], &snapshot.documents));
    if let Err(e) = written {
        for tmp in &staged {
            let _ = remove_file(tmp);
        }
        return Err(e);
    }

    for (tmp, target) in staged.iter().zip(&targets) {
        rename(tmp, target)?;
    }
    Ok(())
}

/// Load all three artifacts. Any missing file is [`SearchError::IndexNotBuilt`].
pub fn load_snapshot(paths: &IndexPaths) -> Result<IndexSnapshot> {
    let index = load_inverted_index(paths)?;
    let stats = load_meta(paths)?;
    let documents = load_documents(paths)?;
    tracing::info!(
        terms = index.num_terms(),
        docs = documents.len(),
        avg_doc_length = stats.avg_doc_length,
        "loaded index snapshot"
    );
    Ok(IndexSnapshot::new(index, stats, documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Language;
    use tempfile::tempdir;

    #[test]
    fn missing_artifacts_fail_fast() {
        let dir = tempdir().unwrap();
        let err = load_snapshot(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, SearchError::IndexNotBuilt(_)));
    }

    #[test]
    fn topic_annotations_are_optional() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        std::fs::write(
            &paths.documents,
            r#"{"0": {"url": "u", "title": "t", "content": "c", "language": "zh", "length": 3, "topic": 2, "topic_name": "机器学习"},
                "1": {"url": "v", "title": "s", "content": "d", "language": "en", "length": 5}}"#,
        )
        .unwrap();
        let docs = load_documents(&paths).unwrap();
        assert_eq!(docs[&0].topic_name.as_deref(), Some("机器学习"));
        assert_eq!(docs[&0].language, Language::Zh);
        assert_eq!(docs[&1].topic_name, None);
    }
}
