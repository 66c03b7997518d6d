//! Proof index: metadata, listing, filtering, and index mutations.

use std::io;

use serde::{Deserialize, Serialize};

use super::HistoryKey;
use super::storage::{FileStore, IndexFile};

/// Metadata for one stored proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMeta {
    pub id: String,
    pub theorem: String,
    pub formality: String,
    pub created_at: u64,
    pub updated_at: u64,
    pub versions: usize,
}

impl ProofMeta {
    /// Case-insensitive match on theorem or formality. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let q = query.to_lowercase();
        self.theorem.to_lowercase().contains(&q) || self.formality.contains(&q)
    }
}

pub(super) fn find<'a>(index: &'a IndexFile, key: &HistoryKey) -> Option<&'a ProofMeta> {
    index
        .proofs
        .iter()
        .find(|m| m.theorem == key.theorem && m.formality == key.formality)
}

/// List all proofs, sorted by updated_at descending.
pub(super) fn list(store: &FileStore) -> io::Result<Vec<ProofMeta>> {
    let mut index = store.load_index()?;
    index.proofs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(index.proofs)
}

/// Add or update a proof in the index. Replaces any existing entry with the same id.
pub(super) fn add_or_update(store: &FileStore, meta: ProofMeta) -> io::Result<()> {
    let mut index = store.load_index()?;
    index.proofs.retain(|m| m.id != meta.id);
    index.proofs.push(meta);
    store.save_index(&index)
}

/// Remove the entry for `key`. A missing entry is not an error.
pub(super) fn remove(store: &FileStore, key: &HistoryKey) -> io::Result<()> {
    let mut index = store.load_index()?;
    let Some(pos) = index
        .proofs
        .iter()
        .position(|m| m.theorem == key.theorem && m.formality == key.formality)
    else {
        return Ok(());
    };
    index.proofs.remove(pos);
    store.save_index(&index)
}
