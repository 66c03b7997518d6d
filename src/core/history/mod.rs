//! Versioned proof history: one entry per (theorem, formality), each holding
//! every saved revision of the proof, oldest first.
//!
//! [`HistoryStore`] is the persistence seam. [`FileStore`] keeps entries in
//! the data directory; `MemoryStore` (test builds) keeps them in memory.

mod index;
#[cfg(test)]
mod memory;
mod storage;

pub use index::ProofMeta;
#[cfg(test)]
pub use memory::MemoryStore;
pub use storage::FileStore;

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one history entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryKey {
    pub theorem: String,
    pub formality: String,
}

impl HistoryKey {
    /// Build a key. The theorem is trimmed and the formality lowercased so that
    /// `"Fermat "` / `"Rigorous"` and `"Fermat"` / `"rigorous"` name the same entry.
    pub fn new(theorem: &str, formality: &str) -> Self {
        Self {
            theorem: theorem.trim().to_string(),
            formality: formality.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.theorem, self.formality)
    }
}

/// Where a version came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionSource {
    Generated { model: String },
    Edited,
    Restored { from: String },
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::Generated { model } => write!(f, "generated by {}", model),
            VersionSource::Edited => write!(f, "edited"),
            VersionSource::Restored { from } => write!(f, "restored from {}", from),
        }
    }
}

/// One saved revision of a proof. `content` is always normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub content: String,
    pub created_at: u64,
    pub source: VersionSource,
}

impl Version {
    pub fn new(content: String, source: VersionSource) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            created_at: now_secs(),
            source,
        }
    }
}

/// Persistence for version histories.
///
/// Loading a key that was never saved yields an empty history, not an error.
pub trait HistoryStore {
    fn load_history(&self, key: &HistoryKey) -> io::Result<Vec<Version>>;

    /// Replace the stored history of `key`. Saving an empty history deletes the entry.
    fn save_history(&self, key: &HistoryKey, versions: &[Version]) -> io::Result<()>;

    /// Remove the entry. Deleting a missing key is not an error.
    fn delete_history(&self, key: &HistoryKey) -> io::Result<()>;

    /// All entries, most recently updated first.
    fn list(&self) -> io::Result<Vec<ProofMeta>>;
}

/// Seconds since the Unix epoch; 0 if the clock is before it.
pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_else(|e| {
            log::warn!("System time before UNIX epoch: {}", e);
            0
        })
}
