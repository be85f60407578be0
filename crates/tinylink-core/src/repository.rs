use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A persisted URL mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// Surrogate identifier assigned by the store.
    pub id: i64,
    pub short_code: ShortCode,
    /// The redirect target. Never mutated after creation.
    pub long_url: String,
    pub created_at: Timestamp,
    /// When the mapping stops resolving, if ever.
    pub expiry_at: Option<Timestamp>,
    pub click_count: u64,
    pub last_clicked_at: Option<Timestamp>,
}

impl UrlMapping {
    /// Returns `true` if the business expiry has passed at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiry_at.is_some_and(|expiry_at| now >= expiry_at)
    }
}

/// A mapping that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUrlMapping {
    pub short_code: ShortCode,
    pub long_url: String,
    pub created_at: Timestamp,
    pub expiry_at: Option<Timestamp>,
}

impl NewUrlMapping {
    /// Builds the stored record once the store has assigned an id.
    pub fn into_mapping(self, id: i64) -> UrlMapping {
        UrlMapping {
            id,
            short_code: self.short_code,
            long_url: self.long_url,
            created_at: self.created_at,
            expiry_at: self.expiry_at,
            click_count: 0,
            last_clicked_at: None,
        }
    }
}

/// A read-only view of a repository.
///
/// All lookups are case-insensitive on the short code.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code, expired or not.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Checks whether a short code is taken, by a live or an expired mapping.
    async fn exists_by_code(&self, code: &ShortCode) -> Result<bool>;

    /// Returns every stored mapping, including expired ones not yet swept.
    async fn list_all(&self) -> Result<Vec<UrlMapping>>;

    /// Cheap round trip proving the store is reachable.
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a new mapping and returns it with its assigned id.
    ///
    /// Returns `Err(StorageError::Conflict)` if the code is already taken,
    /// regardless of any existence check the caller made beforehand.
    async fn save(&self, mapping: NewUrlMapping) -> Result<UrlMapping>;

    /// Deletes the mapping for a given short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool>;

    /// Deletes every mapping whose expiry is strictly before `before`.
    /// Returns the number of removed mappings.
    async fn delete_expired_before(&self, before: Timestamp) -> Result<u64>;

    /// Atomically adds one click and sets the last-click time.
    /// Returns the number of affected mappings (0 or 1).
    async fn increment_clicks(&self, code: &ShortCode, at: Timestamp) -> Result<u64>;
}
