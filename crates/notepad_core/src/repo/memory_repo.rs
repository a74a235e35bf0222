//! In-memory key-value repository.
//!
//! Mirrors browser local storage: a flat string map with an optional byte
//! quota. Per-key write counters let callers observe how many writes the
//! save debounce actually issued.

use crate::repo::kv_repo::{validate_key, KvRepository, RepoError, RepoResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryKvRepository {
    entries: HashMap<String, String>,
    writes: HashMap<String, usize>,
    quota_bytes: Option<usize>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value without counting it as a write.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Limits total stored bytes (keys plus values).
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    /// Number of successful writes to `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.get(key).copied().unwrap_or(0)
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        validate_key(key)?;
        if let Some(quota_bytes) = self.quota_bytes {
            let required_bytes = self.used_bytes_without(key) + key.len() + value.len();
            if required_bytes > quota_bytes {
                return Err(RepoError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        *self.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvRepository;
    use crate::repo::kv_repo::{KvRepository, RepoError};

    #[test]
    fn seeded_entries_are_not_counted_as_writes() {
        let mut repo = MemoryKvRepository::new().with_entry("a", "1");
        assert_eq!(repo.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(repo.write_count("a"), 0);
        repo.set("a", "2").unwrap();
        assert_eq!(repo.write_count("a"), 1);
    }

    #[test]
    fn quota_rejects_oversized_writes_and_keeps_old_value() {
        let mut repo = MemoryKvRepository::new().with_quota(8);
        repo.set("k", "1234").unwrap();
        let err = repo.set("k", "123456789").unwrap_err();
        assert!(matches!(err, RepoError::QuotaExceeded { quota_bytes: 8, .. }));
        assert_eq!(repo.raw("k"), Some("1234"));
        assert_eq!(repo.write_count("k"), 1);
    }
}
