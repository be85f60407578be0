use thiserror::Error;

/// Errors raised by a resolution cache backend.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors raised by a durable store adapter.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The short code is already taken (uniqueness constraint violated).
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Outcomes the shortener surfaces to its callers.
///
/// Every variant is a distinct, named failure so the HTTP layer can branch
/// on it without inspecting messages.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("alias already exists: {0}")]
    AliasConflict(String),
    #[error("no free short code found after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("short code was taken concurrently: {0}")]
    DuplicateCode(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code expired: {0}")]
    Expired(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ShortenerError {
    /// Returns `true` for failures an end user should see as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Expired(_))
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::DuplicateCode(code),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}
