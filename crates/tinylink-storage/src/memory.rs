use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};
use tinylink_core::repository::{NewUrlMapping, ReadRepository, Repository, Result, UrlMapping};
use tinylink_core::{ShortCode, StorageError};

/// In-memory implementation of the repository contract using DashMap.
///
/// Records are keyed by the lowercase form of their short code, so lookups
/// and the uniqueness check are case-insensitive. DashMap's sharded locks
/// keep the check-and-insert in `save` and the click increment atomic per
/// code without serializing unrelated codes.
#[derive(Debug)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlMapping>,
    next_id: AtomicI64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored mappings, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self.storage.get(&code.key()).map(|entry| entry.clone()))
    }

    async fn exists_by_code(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(&code.key()))
    }

    async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        let mut mappings: Vec<UrlMapping> = self
            .storage
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        mappings.sort_by_key(|mapping| mapping.id);
        Ok(mappings)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, mapping: NewUrlMapping) -> Result<UrlMapping> {
        match self.storage.entry(mapping.short_code.key()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(mapping.short_code.to_string())),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let stored = mapping.into_mapping(id);
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.remove(&code.key()).is_some())
    }

    async fn delete_expired_before(&self, before: Timestamp) -> Result<u64> {
        let is_expired = |mapping: &UrlMapping| mapping.expiry_at.is_some_and(|at| at < before);

        // Collect first: removing while iterating would deadlock on the shard lock.
        let candidates: Vec<String> = self
            .storage
            .iter()
            .filter(|entry| is_expired(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in candidates {
            if self
                .storage
                .remove_if(&key, |_, mapping| is_expired(mapping))
                .is_some()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn increment_clicks(&self, code: &ShortCode, at: Timestamp) -> Result<u64> {
        let Some(mut mapping) = self.storage.get_mut(&code.key()) else {
            return Ok(0);
        };
        mapping.click_count += 1;
        mapping.last_clicked_at = Some(at);
        Ok(1)
    }
}
