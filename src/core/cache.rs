//! Proof cache: version histories keyed by (theorem, formality), mirrored to a
//! [`HistoryStore`].
//!
//! Every write goes through [`proof::normalize`], so stored content is always
//! normalized. Pages are derived on read with [`proof::segment`] and never stored.

use std::collections::HashMap;
use std::io;

use serde_json::Value;

use crate::core::history::{HistoryKey, HistoryStore, Version, VersionSource};
use crate::core::llm::{GenerateError, TextGenerator};
use crate::core::{prompt, proof};

/// Result of storing a new version.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub version: Version,
    pub pages: usize,
    /// The stored text opens a `$$` block it never closes.
    pub unterminated_block: bool,
    /// Versions dropped to stay within the configured limit.
    pub pruned: usize,
}

pub struct ProofCache<S: HistoryStore> {
    store: S,
    entries: HashMap<HistoryKey, Vec<Version>>,
    max_versions: usize,
}

impl<S: HistoryStore> ProofCache<S> {
    /// `max_versions` of 0 keeps every version.
    pub fn new(store: S, max_versions: usize) -> Self {
        Self {
            store,
            entries: HashMap::new(),
            max_versions,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All versions of `key`, oldest first. Loads from the store on first access.
    pub fn history(&mut self, key: &HistoryKey) -> io::Result<&[Version]> {
        if !self.entries.contains_key(key) {
            let versions = self.store.load_history(key)?;
            log::debug!("Loaded {} version(s) of {}", versions.len(), key);
            self.entries.insert(key.clone(), versions);
        }
        Ok(self.entries.get(key).map(Vec::as_slice).unwrap_or_default())
    }

    /// Newest version of `key`, if any.
    pub fn current(&mut self, key: &HistoryKey) -> io::Result<Option<&Version>> {
        Ok(self.history(key)?.last())
    }

    /// Version `id` of `key`. Accepts any unique prefix of the id.
    pub fn version(&mut self, key: &HistoryKey, id: &str) -> io::Result<Option<&Version>> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        let history = self.history(key)?;
        if let Some(exact) = history.iter().find(|v| v.id == id) {
            return Ok(Some(exact));
        }
        let mut matches = history.iter().filter(|v| v.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(v), None) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Normalize `text` and store it as the newest version of `key`.
    pub fn record(
        &mut self,
        key: &HistoryKey,
        text: &str,
        source: VersionSource,
    ) -> io::Result<SaveOutcome> {
        let content = proof::normalize(text);
        if content.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot save an empty proof",
            ));
        }
        self.push(key, Version::new(content, source))
    }

    /// Ask `generator` for a proof and store the reply as the newest version of `key`.
    pub async fn generate<G: TextGenerator>(
        &mut self,
        generator: &G,
        key: &HistoryKey,
        messages: &[Value],
    ) -> Result<SaveOutcome, GenerateError> {
        let reply = generator.generate_text(messages).await?;
        let text = prompt::strip_outer_fence(&reply);
        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        let source = VersionSource::Generated {
            model: generator.model().to_string(),
        };
        Ok(self.record(key, text, source)?)
    }

    /// Store a copy of version `id` as the newest version of `key`.
    /// Earlier versions, including everything after `id`, stay in the history.
    pub fn rollback(&mut self, key: &HistoryKey, id: &str) -> io::Result<SaveOutcome> {
        let target = self.version(key, id)?.cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("No version '{}' for {}", id, key),
            )
        })?;
        let restored = Version::new(target.content, VersionSource::Restored { from: target.id });
        self.push(key, restored)
    }

    /// Remove `key` from the cache and the store.
    pub fn delete(&mut self, key: &HistoryKey) -> io::Result<()> {
        self.store.delete_history(key)?;
        self.entries.remove(key);
        log::info!("Deleted history of {}", key);
        Ok(())
    }

    /// Pages of the newest version of `key`; empty when there is none.
    pub fn pages(&mut self, key: &HistoryKey) -> io::Result<Vec<String>> {
        Ok(self
            .current(key)?
            .map(|v| proof::segment(&v.content))
            .unwrap_or_default())
    }

    /// Pages of version `id` of `key` (exact id or unique prefix).
    pub fn version_pages(
        &mut self,
        key: &HistoryKey,
        id: &str,
    ) -> io::Result<Option<Vec<String>>> {
        Ok(self.version(key, id)?.map(|v| proof::segment(&v.content)))
    }

    fn push(&mut self, key: &HistoryKey, version: Version) -> io::Result<SaveOutcome> {
        let mut versions = self.history(key)?.to_vec();
        versions.push(version.clone());

        let pruned = if self.max_versions > 0 && versions.len() > self.max_versions {
            let excess = versions.len() - self.max_versions;
            versions.drain(..excess);
            log::debug!("Pruned {} old version(s) of {}", excess, key);
            excess
        } else {
            0
        };

        self.store.save_history(key, &versions)?;
        self.entries.insert(key.clone(), versions);

        let unterminated_block = proof::has_unterminated_block(&version.content);
        if unterminated_block {
            log::warn!(
                "Version {} of {} opens a $$ block it never closes",
                version.id,
                key
            );
        }
        let pages = proof::segment(&version.content).len();
        log::info!(
            "Saved version {} of {} ({}, {} page(s))",
            version.id,
            key,
            version.source,
            pages
        );
        Ok(SaveOutcome {
            version,
            pages,
            unterminated_block,
            pruned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::MemoryStore;

    struct FixedGenerator(&'static str);

    struct OversizedGenerator;

    impl TextGenerator for OversizedGenerator {
        fn model(&self) -> &str {
            "test/oversized"
        }

        async fn generate_text(&self, _prompt: &[Value]) -> Result<String, GenerateError> {
            Err(GenerateError::ResponseTooLarge { limit: 16 })
        }
    }

    impl TextGenerator for FixedGenerator {
        fn model(&self) -> &str {
            "test/fixed"
        }

        async fn generate_text(&self, _prompt: &[Value]) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }
    }

    fn key() -> HistoryKey {
        HistoryKey::new("Infinitude of primes", "rigorous")
    }

    const PROOF: &str = "Intro\n<a id=\"step-1\"></a>### 1. Assume finitely many\nLet $$P = p_1 \\cdots p_n$$.\n<a id=\"step-2\"></a>### 2. Contradiction\nConsider $P + 1$.";

    #[test]
    fn record_stores_normalized_content() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let outcome = cache.record(&key(), PROOF, VersionSource::Edited).unwrap();
        assert_eq!(outcome.version.content, proof::normalize(PROOF));
        assert!(outcome.version.content.contains("\n\n$$\nP = p_1 \\cdots p_n\n$$\n\n"));
        assert!(!outcome.unterminated_block);
        assert_eq!(outcome.pages, 2);

        let stored = cache.store().load_history(&key()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], outcome.version);
    }

    #[test]
    fn record_rejects_blank_text() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let err = cache.record(&key(), " \n\n ", VersionSource::Edited).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(cache.history(&key()).unwrap().is_empty());
    }

    #[test]
    fn record_flags_unterminated_block() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let outcome = cache
            .record(&key(), "Let $$x = 1", VersionSource::Edited)
            .unwrap();
        assert!(outcome.unterminated_block);
        assert_eq!(outcome.version.content, "Let\n\n$$\nx = 1");
    }

    #[test]
    fn current_is_newest_version() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        cache.record(&key(), "first", VersionSource::Edited).unwrap();
        cache
            .record(
                &key(),
                "second",
                VersionSource::Generated {
                    model: "m".to_string(),
                },
            )
            .unwrap();
        let current = cache.current(&key()).unwrap().unwrap();
        assert_eq!(current.content, "second");
        assert_eq!(cache.history(&key()).unwrap().len(), 2);
    }

    #[test]
    fn record_prunes_oldest_versions() {
        let mut cache = ProofCache::new(MemoryStore::new(), 2);
        cache.record(&key(), "v1", VersionSource::Edited).unwrap();
        cache.record(&key(), "v2", VersionSource::Edited).unwrap();
        let outcome = cache.record(&key(), "v3", VersionSource::Edited).unwrap();
        assert_eq!(outcome.pruned, 1);
        let contents: Vec<_> = cache
            .history(&key())
            .unwrap()
            .iter()
            .map(|v| v.content.clone())
            .collect();
        assert_eq!(contents, vec!["v2", "v3"]);
    }

    #[test]
    fn rollback_appends_copy_of_old_version() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let first = cache.record(&key(), "old proof", VersionSource::Edited).unwrap();
        cache.record(&key(), "new proof", VersionSource::Edited).unwrap();

        let outcome = cache.rollback(&key(), &first.version.id[..8]).unwrap();
        assert_eq!(outcome.version.content, "old proof");
        assert_eq!(
            outcome.version.source,
            VersionSource::Restored {
                from: first.version.id.clone()
            }
        );
        assert_ne!(outcome.version.id, first.version.id);
        assert_eq!(cache.history(&key()).unwrap().len(), 3);
        assert_eq!(cache.current(&key()).unwrap().unwrap().content, "old proof");
    }

    #[test]
    fn rollback_unknown_version_is_not_found() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        cache.record(&key(), "proof", VersionSource::Edited).unwrap();
        let err = cache.rollback(&key(), "nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn version_ignores_empty_id() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        cache.record(&key(), "proof", VersionSource::Edited).unwrap();
        assert!(cache.version(&key(), "").unwrap().is_none());
    }

    #[test]
    fn pages_segment_current_version() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        assert!(cache.pages(&key()).unwrap().is_empty());
        cache.record(&key(), PROOF, VersionSource::Edited).unwrap();
        let pages = cache.pages(&key()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].starts_with("Intro\n\n<a id=\"step-1\"></a>### 1."));
        assert!(pages[1].starts_with("<a id=\"step-2\"></a>### 2. Contradiction"));
    }

    #[test]
    fn version_pages_segment_the_requested_version() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let first = cache.record(&key(), PROOF, VersionSource::Edited).unwrap();
        cache.record(&key(), "rewritten", VersionSource::Edited).unwrap();

        let pages = cache
            .version_pages(&key(), &first.version.id[..8])
            .unwrap()
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(cache.pages(&key()).unwrap(), vec!["rewritten".to_string()]);
        assert!(cache.version_pages(&key(), "missing").unwrap().is_none());
    }

    #[test]
    fn delete_clears_cache_and_store() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        cache.record(&key(), "proof", VersionSource::Edited).unwrap();
        cache.delete(&key()).unwrap();
        assert!(cache.current(&key()).unwrap().is_none());
        assert!(cache.store().list().unwrap().is_empty());
    }

    #[test]
    fn history_reads_through_to_existing_store_content() {
        let store = MemoryStore::new();
        let seeded = Version::new("seeded".to_string(), VersionSource::Edited);
        store.save_history(&key(), std::slice::from_ref(&seeded)).unwrap();
        let mut cache = ProofCache::new(store, 0);
        assert_eq!(cache.current(&key()).unwrap(), Some(&seeded));
    }

    #[tokio::test]
    async fn generate_stores_unfenced_normalized_reply() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let generator = FixedGenerator("```markdown\nProof: $$a=b$$ done\n```");
        let outcome = cache.generate(&generator, &key(), &[]).await.unwrap();
        assert_eq!(outcome.version.content, "Proof:\n\n$$\na=b\n$$\n\ndone");
        assert_eq!(
            outcome.version.source,
            VersionSource::Generated {
                model: "test/fixed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn generate_rejects_empty_reply() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        let err = cache
            .generate(&FixedGenerator("  \n "), &key(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
        assert!(cache.current(&key()).unwrap().is_none());
    }

    #[tokio::test]
    async fn generate_keeps_history_when_reply_is_too_large() {
        let mut cache = ProofCache::new(MemoryStore::new(), 0);
        cache.record(&key(), "kept", VersionSource::Edited).unwrap();
        let err = cache
            .generate(&OversizedGenerator, &key(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::ResponseTooLarge { .. }));
        assert_eq!(cache.history(&key()).unwrap().len(), 1);
        assert_eq!(cache.current(&key()).unwrap().unwrap().content, "kept");
    }
}
