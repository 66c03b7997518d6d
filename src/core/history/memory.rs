//! In-process history store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use super::{HistoryKey, HistoryStore, ProofMeta, Version, now_secs};

#[derive(Debug)]
struct Entry {
    id: String,
    created_at: u64,
    updated_at: u64,
    versions: Vec<Version>,
}

/// Keeps histories in memory for the life of the value. Nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<HistoryKey, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStore {
    fn load_history(&self, key: &HistoryKey) -> io::Result<Vec<Version>> {
        Ok(self
            .entries
            .borrow()
            .get(key)
            .map(|e| e.versions.clone())
            .unwrap_or_default())
    }

    fn save_history(&self, key: &HistoryKey, versions: &[Version]) -> io::Result<()> {
        if versions.is_empty() {
            return self.delete_history(key);
        }
        let now = now_secs();
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            versions: vec![],
        });
        entry.updated_at = now;
        entry.versions = versions.to_vec();
        Ok(())
    }

    fn delete_history(&self, key: &HistoryKey) -> io::Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn list(&self) -> io::Result<Vec<ProofMeta>> {
        let mut metas: Vec<ProofMeta> = self
            .entries
            .borrow()
            .iter()
            .map(|(key, e)| ProofMeta {
                id: e.id.clone(),
                theorem: key.theorem.clone(),
                formality: key.formality.clone(),
                created_at: e.created_at,
                updated_at: e.updated_at,
                versions: e.versions.len(),
            })
            .collect();
        metas.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(metas)
    }
}
