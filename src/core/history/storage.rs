//! Directory-backed history store (index.json, proof_*.json).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::paths;

use super::index;
use super::{HistoryKey, HistoryStore, ProofMeta, Version, now_secs};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct IndexFile {
    pub(super) proofs: Vec<ProofMeta>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProofFile {
    theorem: String,
    formality: String,
    versions: Vec<Version>,
}

/// Stores each history entry as `proof_<id>.json` next to an `index.json`
/// mapping (theorem, formality) to file ids. Writes go through a temp file
/// and a rename so a crash never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory (or `PROOF_PAGER_DATA_DIR`).
    pub fn open_default() -> io::Result<Self> {
        let dir = paths::data_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No data directory"))?;
        Ok(Self::new(dir))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join("index.json")
    }

    fn proof_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("proof_{}.json", id))
    }

    /// Load the index. Returns an empty index when the file does not exist yet (first run).
    /// Propagates IO errors (permission, disk) and JSON parse errors.
    pub(super) fn load_index(&self) -> io::Result<IndexFile> {
        let data = match fs::read_to_string(self.index_path()) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexFile::default()),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }

    pub(super) fn save_index(&self, index: &IndexFile) -> io::Result<()> {
        let json = serde_json::to_string_pretty(index)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.write_atomic(&self.index_path(), &json)
    }

    fn read_versions(&self, id: &str) -> io::Result<Vec<Version>> {
        let data = match fs::read_to_string(self.proof_path(id)) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Index lists proof {} but its file is missing", id);
                return Ok(vec![]);
            }
            Err(e) => return Err(e),
        };
        let file: ProofFile = serde_json::from_str(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(file.versions)
    }

    fn write_versions(&self, id: &str, key: &HistoryKey, versions: &[Version]) -> io::Result<()> {
        let file = ProofFile {
            theorem: key.theorem.clone(),
            formality: key.formality.clone(),
            versions: versions.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.write_atomic(&self.proof_path(id), &json)
    }

    fn remove_proof_file(&self, id: &str) -> io::Result<()> {
        match fs::remove_file(self.proof_path(id)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(tmp, path)
    }
}

impl HistoryStore for FileStore {
    fn load_history(&self, key: &HistoryKey) -> io::Result<Vec<Version>> {
        let index = self.load_index()?;
        match index::find(&index, key) {
            Some(meta) => self.read_versions(&meta.id),
            None => Ok(vec![]),
        }
    }

    fn save_history(&self, key: &HistoryKey, versions: &[Version]) -> io::Result<()> {
        if versions.is_empty() {
            return self.delete_history(key);
        }
        let now = now_secs();
        let existing = index::find(&self.load_index()?, key).cloned();
        let meta = match existing {
            Some(meta) => ProofMeta {
                updated_at: now,
                versions: versions.len(),
                ..meta
            },
            None => ProofMeta {
                id: Uuid::new_v4().to_string(),
                theorem: key.theorem.clone(),
                formality: key.formality.clone(),
                created_at: now,
                updated_at: now,
                versions: versions.len(),
            },
        };
        self.write_versions(&meta.id, key, versions)?;
        index::add_or_update(self, meta)
    }

    /// Removes the proof file before the index entry, so a failed removal
    /// leaves the entry in place and never orphans the file.
    fn delete_history(&self, key: &HistoryKey) -> io::Result<()> {
        let Some(meta) = index::find(&self.load_index()?, key).cloned() else {
            return Ok(());
        };
        self.remove_proof_file(&meta.id)?;
        index::remove(self, key)?;
        Ok(())
    }

    fn list(&self) -> io::Result<Vec<ProofMeta>> {
        index::list(self)
    }
}
