use crate::repository::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Longest long URL accepted for shortening, in bytes.
pub const MAX_LONG_URL_LENGTH: usize = 2048;

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExpirationPolicy {
    /// Use the service's configured default lifetime.
    #[default]
    Default,
    /// The shortened URL never expires.
    Never,
    /// The shortened URL expires after a certain duration from now.
    AfterDuration(SignedDuration),
    /// The shortened URL expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// The original URL to be shortened.
    pub long_url: String,
    /// Optional custom alias for the shortened URL.
    pub custom_alias: Option<ShortCode>,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
}

impl CreateRequest {
    /// A request with a generated code and the default expiry.
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            custom_alias: None,
            expiration: ExpirationPolicy::Default,
        }
    }

    pub fn with_alias(mut self, alias: ShortCode) -> Self {
        self.custom_alias = Some(alias);
        self
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }
}

/// The short-code allocation and resolution engine.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a mapping and returns it as persisted.
    async fn create(&self, request: CreateRequest) -> Result<UrlMapping>;

    /// Resolves a short code to its long URL, recording a click.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Deletes a mapping by its short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool>;

    /// Returns a snapshot of every persisted mapping.
    async fn list_all(&self) -> Result<Vec<UrlMapping>>;

    /// Removes mappings whose expiry is before `now`.
    /// Returns the number of removed mappings.
    async fn cleanup_expired(&self, now: Timestamp) -> Result<u64>;

    /// Checks that the durable store answers.
    async fn check_store(&self) -> Result<()>;
}
