use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use tinylink_core::{
    CreateRequest, ExpirationPolicy, NewUrlMapping, Repository, ShortCode, Shortener,
    ShortenerError, UrlCache, UrlMapping, MAX_LONG_URL_LENGTH,
};
use tinylink_generator::Generator;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Lifetime applied when a request asks for the default expiration.
pub const DEFAULT_EXPIRY: SignedDuration = SignedDuration::from_hours(30 * 24);

/// Number of generated candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    #[builder(default = DEFAULT_EXPIRY)]
    pub default_expiry: SignedDuration,
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The resolution service: creates mappings, resolves codes cache-first and
/// records click analytics.
///
/// The store is the system of record. The cache is a best-effort projection:
/// cache failures are logged and never fail a request. Cache entries are
/// written with the cache's standard TTL, capped at the mapping's remaining
/// lifetime, so a cached code stops resolving no later than its expiry.
#[derive(Debug)]
pub struct ShortenerService<R, C, G> {
    repository: Arc<R>,
    cache: Arc<C>,
    generator: Arc<G>,
    settings: ShortenerSettings,
}

impl<R, C, G> Clone for ShortenerService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, C: UrlCache, G: Generator> ShortenerService<R, C, G> {
    pub fn new(repository: R, cache: C, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    fn validate_long_url(long_url: &str) -> Result<()> {
        if long_url.trim().is_empty() {
            return Err(ShortenerError::InvalidInput(
                "long URL must not be blank".to_string(),
            ));
        }
        if long_url.len() > MAX_LONG_URL_LENGTH {
            return Err(ShortenerError::InvalidInput(format!(
                "long URL must be at most {MAX_LONG_URL_LENGTH} characters"
            )));
        }
        Ok(())
    }

    /// Turns an expiration policy into an absolute expiry, relative to `now`.
    fn expiry_at(&self, policy: ExpirationPolicy, now: Timestamp) -> Result<Option<Timestamp>> {
        let after = |duration: SignedDuration| {
            now.checked_add(duration)
                .map_err(|e| ShortenerError::InvalidInput(format!("invalid expiry: {e}")))
        };

        let expiry_at = match policy {
            ExpirationPolicy::Never => return Ok(None),
            ExpirationPolicy::Default => after(self.settings.default_expiry)?,
            ExpirationPolicy::AfterDuration(duration) => after(duration)?,
            ExpirationPolicy::AtTimestamp(timestamp) => timestamp,
        };

        if expiry_at <= now {
            return Err(ShortenerError::InvalidInput(format!(
                "expiry {expiry_at} is not in the future"
            )));
        }
        Ok(Some(expiry_at))
    }

    /// Draws candidates until one is not taken in the store.
    async fn allocate_code(&self) -> Result<ShortCode> {
        let attempts = self.settings.max_attempts;

        for attempt in 1..=attempts {
            let candidate: ShortCode = self.generator.generate().into();
            if !self.repository.exists_by_code(&candidate).await? {
                return Ok(candidate);
            }
            debug!(code = %candidate, attempt, "generated code already taken");
        }

        warn!(attempts, "short code generation exhausted");
        Err(ShortenerError::GenerationExhausted { attempts })
    }

    async fn populate_cache(&self, mapping: &UrlMapping, now: Timestamp) {
        let Some(ttl) = capped_ttl(self.cache.ttl(), mapping.expiry_at, now) else {
            return;
        };

        if let Err(err) = self
            .cache
            .put(&mapping.short_code, &mapping.long_url, ttl)
            .await
        {
            warn!(code = %mapping.short_code, error = %err, "failed to populate cache");
        }
    }

    /// Caches `mapping`, then re-reads its row and drops the entry again if
    /// the row was deleted or replaced in between. A delete that lands while
    /// a resolve or create is between its store call and its cache write
    /// therefore never leaves the removed mapping cached.
    async fn cache_confirmed(&self, mapping: &UrlMapping, now: Timestamp) {
        self.populate_cache(mapping, now).await;

        let unchanged = match self.repository.find_by_code(&mapping.short_code).await {
            Ok(Some(current)) => current.id == mapping.id,
            Ok(None) => false,
            Err(err) => {
                warn!(code = %mapping.short_code, error = %err, "failed to confirm cached mapping");
                false
            }
        };

        if !unchanged {
            debug!(code = %mapping.short_code, "mapping changed while caching, dropping entry");
            self.invalidate_cache(&mapping.short_code).await;
        }
    }

    async fn invalidate_cache(&self, code: &ShortCode) {
        if let Err(err) = self.cache.invalidate(code).await {
            warn!(code = %code, error = %err, "failed to invalidate cache entry");
        }
    }

    /// Best-effort analytics update; never fails the caller.
    async fn record_click(&self, code: &ShortCode) {
        match self.repository.increment_clicks(code, Timestamp::now()).await {
            Ok(0) => debug!(code = %code, "click not recorded, mapping no longer stored"),
            Ok(_) => {}
            Err(err) => warn!(code = %code, error = %err, "failed to record click"),
        }
    }
}

/// TTL for a cache entry: the standard TTL, shortened to the time left
/// before `expiry_at`. `None` when nothing is left.
fn capped_ttl(standard: Duration, expiry_at: Option<Timestamp>, now: Timestamp) -> Option<Duration> {
    let Some(expiry_at) = expiry_at else {
        return Some(standard);
    };

    Duration::try_from(now.duration_until(expiry_at))
        .ok()
        .filter(|remaining| !remaining.is_zero())
        .map(|remaining| remaining.min(standard))
}

#[async_trait]
impl<R: Repository, C: UrlCache, G: Generator> Shortener for ShortenerService<R, C, G> {
    async fn create(&self, request: CreateRequest) -> Result<UrlMapping> {
        Self::validate_long_url(&request.long_url)?;

        let now = Timestamp::now();
        let expiry_at = self.expiry_at(request.expiration, now)?;

        let short_code = match request.custom_alias {
            Some(alias) => {
                if self.repository.exists_by_code(&alias).await? {
                    return Err(ShortenerError::AliasConflict(alias.to_string()));
                }
                alias
            }
            None => self.allocate_code().await?,
        };

        let mapping = self
            .repository
            .save(NewUrlMapping {
                short_code,
                long_url: request.long_url,
                created_at: now,
                expiry_at,
            })
            .await?;

        self.cache_confirmed(&mapping, now).await;

        info!(
            code = %mapping.short_code,
            id = mapping.id,
            expiry_at = ?mapping.expiry_at,
            "created short url"
        );
        Ok(mapping)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        match self.cache.get(code).await {
            Ok(Some(long_url)) => {
                self.record_click(code).await;
                return Ok(long_url);
            }
            Ok(None) => {}
            Err(err) => warn!(code = %code, error = %err, "cache read failed, using store"),
        }

        let now = Timestamp::now();
        let Some(mapping) = self.repository.find_by_code(code).await? else {
            debug!(code = %code, "short code not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        };

        if mapping.is_expired_at(now) {
            debug!(code = %code, expiry_at = ?mapping.expiry_at, "short code expired");
            return Err(ShortenerError::Expired(code.to_string()));
        }

        self.cache_confirmed(&mapping, now).await;
        self.record_click(code).await;
        Ok(mapping.long_url)
    }

    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool> {
        let removed = self.repository.delete_by_code(code).await?;
        self.invalidate_cache(code).await;

        if removed {
            info!(code = %code, "deleted short url");
        }
        Ok(removed)
    }

    async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        Ok(self.repository.list_all().await?)
    }

    async fn cleanup_expired(&self, now: Timestamp) -> Result<u64> {
        Ok(self.repository.delete_expired_before(now).await?)
    }

    async fn check_store(&self) -> Result<()> {
        Ok(self.repository.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::sync::Notify;
    use tinylink_cache::SweepingUrlCache;
    use tinylink_core::cache::Result as CacheResult;
    use tinylink_core::repository::{ReadRepository, Result as StorageResult};
    use tinylink_core::{CacheError, StorageError};
    use tinylink_generator::{RandomGenerator, RandomGeneratorSettings, SeqGenerator};
    use tinylink_storage::InMemoryRepository;

    type Service<R = InMemoryRepository, C = SweepingUrlCache, G = SeqGenerator> =
        ShortenerService<R, C, G>;

    fn code(s: &str) -> ShortCode {
        ShortCode::new(s).unwrap()
    }

    fn test_service() -> Service {
        ShortenerService::new(
            InMemoryRepository::new(),
            SweepingUrlCache::default(),
            SeqGenerator::with_prefix("tl"),
            ShortenerSettings::default(),
        )
    }

    fn with_repository<R: Repository>(repository: R) -> Service<R> {
        ShortenerService::new(
            repository,
            SweepingUrlCache::default(),
            SeqGenerator::with_prefix("tl"),
            ShortenerSettings::default(),
        )
    }

    async fn seed_expired(service: &Service, alias: &str) {
        let now = Timestamp::now();
        service
            .repository()
            .save(NewUrlMapping {
                short_code: code(alias),
                long_url: "https://example.com/old".to_string(),
                created_at: now - SignedDuration::from_hours(2),
                expiry_at: Some(now - SignedDuration::from_hours(1)),
            })
            .await
            .unwrap();
    }

    /// Delegates to an in-memory store but fails every click update.
    struct BrokenClicks(InMemoryRepository);

    #[async_trait]
    impl ReadRepository for BrokenClicks {
        async fn find_by_code(&self, code: &ShortCode) -> StorageResult<Option<UrlMapping>> {
            self.0.find_by_code(code).await
        }

        async fn exists_by_code(&self, code: &ShortCode) -> StorageResult<bool> {
            self.0.exists_by_code(code).await
        }

        async fn list_all(&self) -> StorageResult<Vec<UrlMapping>> {
            self.0.list_all().await
        }

        async fn ping(&self) -> StorageResult<()> {
            self.0.ping().await
        }
    }

    #[async_trait]
    impl Repository for BrokenClicks {
        async fn save(&self, mapping: NewUrlMapping) -> StorageResult<UrlMapping> {
            self.0.save(mapping).await
        }

        async fn delete_by_code(&self, code: &ShortCode) -> StorageResult<bool> {
            self.0.delete_by_code(code).await
        }

        async fn delete_expired_before(&self, before: Timestamp) -> StorageResult<u64> {
            self.0.delete_expired_before(before).await
        }

        async fn increment_clicks(&self, _code: &ShortCode, _at: Timestamp) -> StorageResult<u64> {
            Err(StorageError::Timeout("increment_clicks exceeded 2s".to_string()))
        }
    }

    /// Claims every code is free, so only `save` can detect a collision.
    struct BlindExists(InMemoryRepository);

    #[async_trait]
    impl ReadRepository for BlindExists {
        async fn find_by_code(&self, code: &ShortCode) -> StorageResult<Option<UrlMapping>> {
            self.0.find_by_code(code).await
        }

        async fn exists_by_code(&self, _code: &ShortCode) -> StorageResult<bool> {
            Ok(false)
        }

        async fn list_all(&self) -> StorageResult<Vec<UrlMapping>> {
            self.0.list_all().await
        }

        async fn ping(&self) -> StorageResult<()> {
            self.0.ping().await
        }
    }

    #[async_trait]
    impl Repository for BlindExists {
        async fn save(&self, mapping: NewUrlMapping) -> StorageResult<UrlMapping> {
            self.0.save(mapping).await
        }

        async fn delete_by_code(&self, code: &ShortCode) -> StorageResult<bool> {
            self.0.delete_by_code(code).await
        }

        async fn delete_expired_before(&self, before: Timestamp) -> StorageResult<u64> {
            self.0.delete_expired_before(before).await
        }

        async fn increment_clicks(&self, code: &ShortCode, at: Timestamp) -> StorageResult<u64> {
            self.0.increment_clicks(code, at).await
        }
    }

    /// A store that is down.
    struct DownRepository;

    #[async_trait]
    impl ReadRepository for DownRepository {
        async fn find_by_code(&self, _code: &ShortCode) -> StorageResult<Option<UrlMapping>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn exists_by_code(&self, _code: &ShortCode) -> StorageResult<bool> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn list_all(&self) -> StorageResult<Vec<UrlMapping>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn ping(&self) -> StorageResult<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl Repository for DownRepository {
        async fn save(&self, _mapping: NewUrlMapping) -> StorageResult<UrlMapping> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn delete_by_code(&self, _code: &ShortCode) -> StorageResult<bool> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn delete_expired_before(&self, _before: Timestamp) -> StorageResult<u64> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn increment_clicks(&self, _code: &ShortCode, _at: Timestamp) -> StorageResult<u64> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    /// Parks the next `find_by_code` after it has read the row, until
    /// released.
    #[derive(Default)]
    struct ParkingFind {
        inner: InMemoryRepository,
        armed: AtomicBool,
        parked: Notify,
        release: Notify,
    }

    impl ParkingFind {
        fn park_next_find(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ReadRepository for ParkingFind {
        async fn find_by_code(&self, code: &ShortCode) -> StorageResult<Option<UrlMapping>> {
            let found = self.inner.find_by_code(code).await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.parked.notify_one();
                self.release.notified().await;
            }
            found
        }

        async fn exists_by_code(&self, code: &ShortCode) -> StorageResult<bool> {
            self.inner.exists_by_code(code).await
        }

        async fn list_all(&self) -> StorageResult<Vec<UrlMapping>> {
            self.inner.list_all().await
        }

        async fn ping(&self) -> StorageResult<()> {
            self.inner.ping().await
        }
    }

    #[async_trait]
    impl Repository for ParkingFind {
        async fn save(&self, mapping: NewUrlMapping) -> StorageResult<UrlMapping> {
            self.inner.save(mapping).await
        }

        async fn delete_by_code(&self, code: &ShortCode) -> StorageResult<bool> {
            self.inner.delete_by_code(code).await
        }

        async fn delete_expired_before(&self, before: Timestamp) -> StorageResult<u64> {
            self.inner.delete_expired_before(before).await
        }

        async fn increment_clicks(&self, code: &ShortCode, at: Timestamp) -> StorageResult<u64> {
            self.inner.increment_clicks(code, at).await
        }
    }

    /// A cache whose every operation fails.
    struct DownCache;

    #[async_trait]
    impl UrlCache for DownCache {
        async fn get(&self, _code: &ShortCode) -> CacheResult<Option<String>> {
            Err(CacheError::Unavailable("cache offline".to_string()))
        }

        async fn put(&self, _code: &ShortCode, _long_url: &str, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("cache offline".to_string()))
        }

        async fn invalidate(&self, _code: &ShortCode) -> CacheResult<()> {
            Err(CacheError::Unavailable("cache offline".to_string()))
        }

        fn ttl(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    /// Always produces the same code and counts how often it was asked.
    #[derive(Default)]
    struct FixedGenerator {
        calls: AtomicU32,
    }

    impl Generator for FixedGenerator {
        type Output = ShortCode;

        fn generate(&self) -> ShortCode {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ShortCode::new_unchecked("taken1")
        }
    }

    #[tokio::test]
    async fn create_with_generated_code_resolves_immediately() {
        let service = ShortenerService::new(
            InMemoryRepository::new(),
            SweepingUrlCache::default(),
            RandomGenerator::new(RandomGeneratorSettings::builder().build()).unwrap(),
            ShortenerSettings::default(),
        );

        let mapping = service
            .create(CreateRequest::new("https://example.com/page"))
            .await
            .unwrap();

        assert_eq!(mapping.short_code.as_str().len(), 7);
        assert!(mapping
            .short_code
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(mapping.click_count, 0);
        assert_eq!(
            service.resolve(&mapping.short_code).await.unwrap(),
            "https://example.com/page"
        );
    }

    #[tokio::test]
    async fn generated_codes_are_unique() {
        let service = test_service();
        let mut codes = std::collections::HashSet::new();

        for i in 0..20 {
            let mapping = service
                .create(CreateRequest::new(format!("https://example.com/{i}")))
                .await
                .unwrap();
            assert!(codes.insert(mapping.short_code.key()));
        }
    }

    #[tokio::test]
    async fn clicks_are_counted_per_resolve() {
        let service = test_service();
        let mapping = service
            .create(CreateRequest::new("https://example.com/page"))
            .await
            .unwrap();

        service.resolve(&mapping.short_code).await.unwrap();
        let after_one = service
            .repository()
            .find_by_code(&mapping.short_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after_one.click_count, 1);
        assert!(after_one.last_clicked_at.is_some());

        service.resolve(&mapping.short_code).await.unwrap();
        let after_two = service
            .repository()
            .find_by_code(&mapping.short_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after_two.click_count, 2);
    }

    #[tokio::test]
    async fn custom_alias_resolves_case_insensitively() {
        let service = test_service();

        let mapping = service
            .create(CreateRequest::new("https://example.com/sale").with_alias(code("promo1")))
            .await
            .unwrap();
        assert_eq!(mapping.short_code.as_str(), "promo1");

        assert_eq!(
            service.resolve(&code("PROMO1")).await.unwrap(),
            "https://example.com/sale"
        );
    }

    #[tokio::test]
    async fn reused_alias_is_an_alias_conflict() {
        let service = test_service();

        service
            .create(CreateRequest::new("https://one.example").with_alias(code("promo1")))
            .await
            .unwrap();
        let err = service
            .create(CreateRequest::new("https://two.example").with_alias(code("Promo1")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AliasConflict(alias) if alias == "Promo1"));
    }

    #[tokio::test]
    async fn save_race_is_a_duplicate_code() {
        let service = with_repository(BlindExists(InMemoryRepository::new()));

        service
            .create(CreateRequest::new("https://one.example").with_alias(code("promo1")))
            .await
            .unwrap();
        let err = service
            .create(CreateRequest::new("https://two.example").with_alias(code("promo1")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::DuplicateCode(_)));
    }

    #[tokio::test]
    async fn taken_generated_code_is_retried() {
        let service = test_service();
        service
            .create(CreateRequest::new("https://one.example").with_alias(code("tl0000")))
            .await
            .unwrap();

        let mapping = service
            .create(CreateRequest::new("https://two.example"))
            .await
            .unwrap();

        assert_eq!(mapping.short_code.as_str(), "tl0001");
    }

    #[tokio::test]
    async fn generation_gives_up_after_the_attempt_budget() {
        let service = ShortenerService::new(
            InMemoryRepository::new(),
            SweepingUrlCache::default(),
            FixedGenerator::default(),
            ShortenerSettings::builder().max_attempts(3).build(),
        );
        service
            .create(CreateRequest::new("https://one.example").with_alias(code("taken1")))
            .await
            .unwrap();

        let err = service
            .create(CreateRequest::new("https://two.example"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::GenerationExhausted { attempts: 3 }));
        assert_eq!(service.generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn blank_or_oversized_urls_are_invalid_input() {
        let service = test_service();

        for long_url in ["".to_string(), "   ".to_string(), "x".repeat(MAX_LONG_URL_LENGTH + 1)] {
            let err = service.create(CreateRequest::new(long_url)).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidInput(_)));
        }
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expiry_follows_the_policy() {
        let service = test_service();
        let before = Timestamp::now();

        let default = service
            .create(CreateRequest::new("https://example.com"))
            .await
            .unwrap();
        let expiry = default.expiry_at.unwrap();
        assert!(expiry >= before + DEFAULT_EXPIRY);
        assert!(expiry <= Timestamp::now() + DEFAULT_EXPIRY);

        let never = service
            .create(CreateRequest::new("https://example.com").with_expiration(ExpirationPolicy::Never))
            .await
            .unwrap();
        assert_eq!(never.expiry_at, None);

        let at = Timestamp::now() + SignedDuration::from_hours(5);
        let fixed = service
            .create(
                CreateRequest::new("https://example.com")
                    .with_expiration(ExpirationPolicy::AtTimestamp(at)),
            )
            .await
            .unwrap();
        assert_eq!(fixed.expiry_at, Some(at));
    }

    #[tokio::test]
    async fn expiry_not_in_the_future_is_rejected() {
        let service = test_service();

        for policy in [
            ExpirationPolicy::AfterDuration(SignedDuration::ZERO),
            ExpirationPolicy::AfterDuration(SignedDuration::from_secs(-60)),
            ExpirationPolicy::AtTimestamp(Timestamp::now() - SignedDuration::from_secs(1)),
        ] {
            let err = service
                .create(CreateRequest::new("https://example.com").with_expiration(policy))
                .await
                .unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let service = test_service();

        let err = service.resolve(&code("missing")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(c) if c == "missing"));
    }

    #[tokio::test]
    async fn expired_record_is_expired_until_cleanup() {
        let service = test_service();
        seed_expired(&service, "old1").await;

        let err = service.resolve(&code("old1")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Expired(_)));
        assert!(service.cache().is_empty());

        assert_eq!(service.cleanup_expired(Timestamp::now()).await.unwrap(), 1);

        let err = service.resolve(&code("old1")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn cleanup_keeps_live_records() {
        let service = test_service();
        seed_expired(&service, "old1").await;
        seed_expired(&service, "old2").await;
        service
            .create(CreateRequest::new("https://example.com/live").with_alias(code("live1")))
            .await
            .unwrap();

        assert_eq!(service.cleanup_expired(Timestamp::now()).await.unwrap(), 2);

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].short_code.as_str(), "live1");
        assert_eq!(service.resolve(&code("live1")).await.unwrap(), "https://example.com/live");
    }

    #[tokio::test]
    async fn list_all_includes_unswept_expired_records() {
        let service = test_service();
        seed_expired(&service, "old1").await;
        service
            .create(CreateRequest::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(service.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_invalidates_the_cache() {
        let service = test_service();
        service
            .create(CreateRequest::new("https://example.com").with_alias(code("gone1")))
            .await
            .unwrap();
        assert!(service.cache().get(&code("gone1")).await.unwrap().is_some());

        assert!(service.delete_by_code(&code("GONE1")).await.unwrap());

        assert!(service.cache().get(&code("gone1")).await.unwrap().is_none());
        let err = service.resolve(&code("gone1")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
        assert!(!service.delete_by_code(&code("gone1")).await.unwrap());
    }

    /// Starts a resolve of `alias` on a cache miss and returns once it has
    /// read the row but not yet cached it.
    async fn resolve_parked_after_read(
        service: &Arc<Service<ParkingFind>>,
        alias: &'static str,
    ) -> tokio::task::JoinHandle<Result<String>> {
        service.cache().invalidate(&code(alias)).await.unwrap();
        service.repository().park_next_find();

        let resolving = tokio::spawn({
            let service = Arc::clone(service);
            async move { service.resolve(&code(alias)).await }
        });
        service.repository().parked.notified().await;
        resolving
    }

    #[tokio::test]
    async fn delete_during_resolve_leaves_nothing_cached() {
        let service = Arc::new(with_repository(ParkingFind::default()));
        service
            .create(CreateRequest::new("https://example.com").with_alias(code("gone1")))
            .await
            .unwrap();

        let resolving = resolve_parked_after_read(&service, "gone1").await;
        assert!(service.delete_by_code(&code("gone1")).await.unwrap());
        service.repository().release.notify_one();
        resolving.await.unwrap().unwrap();

        assert!(service.cache().get(&code("gone1")).await.unwrap().is_none());
        let err = service.resolve(&code("gone1")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn recreate_during_resolve_serves_the_new_target() {
        let service = Arc::new(with_repository(ParkingFind::default()));
        service
            .create(CreateRequest::new("https://old.example").with_alias(code("swap1")))
            .await
            .unwrap();

        let resolving = resolve_parked_after_read(&service, "swap1").await;
        assert!(service.delete_by_code(&code("swap1")).await.unwrap());
        service
            .create(CreateRequest::new("https://new.example").with_alias(code("swap1")))
            .await
            .unwrap();
        service.repository().release.notify_one();
        resolving.await.unwrap().unwrap();

        assert_eq!(service.resolve(&code("swap1")).await.unwrap(), "https://new.example");
    }

    #[tokio::test]
    async fn check_store_reports_store_health() {
        test_service().check_store().await.unwrap();

        let err = with_repository(DownRepository).check_store().await.unwrap_err();
        assert!(matches!(err, ShortenerError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn cache_hit_is_trusted_without_the_store() {
        let service = test_service();
        service
            .create(CreateRequest::new("https://example.com").with_alias(code("cached1")))
            .await
            .unwrap();

        // Removed behind the service's back: the cache keeps serving it.
        service.repository().delete_by_code(&code("cached1")).await.unwrap();

        assert_eq!(service.resolve(&code("cached1")).await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn cache_miss_repopulates_the_cache() {
        let service = test_service();
        service
            .create(CreateRequest::new("https://example.com").with_alias(code("warm1")))
            .await
            .unwrap();
        service.cache().invalidate(&code("warm1")).await.unwrap();

        service.resolve(&code("warm1")).await.unwrap();

        assert_eq!(
            service.cache().get(&code("warm1")).await.unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn failed_click_update_does_not_fail_resolve() {
        let service = with_repository(BrokenClicks(InMemoryRepository::new()));
        service
            .create(CreateRequest::new("https://example.com").with_alias(code("abc123")))
            .await
            .unwrap();

        assert_eq!(service.resolve(&code("abc123")).await.unwrap(), "https://example.com");
        service.cache().invalidate(&code("abc123")).await.unwrap();
        assert_eq!(service.resolve(&code("abc123")).await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn failing_cache_degrades_to_the_store() {
        let service = ShortenerService::new(
            InMemoryRepository::new(),
            DownCache,
            SeqGenerator::with_prefix("tl"),
            ShortenerSettings::default(),
        );

        let mapping = service
            .create(CreateRequest::new("https://example.com"))
            .await
            .unwrap();
        assert_eq!(service.resolve(&mapping.short_code).await.unwrap(), "https://example.com");
        assert!(service.delete_by_code(&mapping.short_code).await.unwrap());
    }

    #[tokio::test]
    async fn store_failures_are_store_unavailable() {
        let service = with_repository(DownRepository);

        let err = service
            .create(CreateRequest::new("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::StoreUnavailable(_)));

        let err = service.resolve(&code("abc123")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::StoreUnavailable(_)));

        let err = service.cleanup_expired(Timestamp::now()).await.unwrap_err();
        assert!(matches!(err, ShortenerError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn concurrent_resolves_lose_no_clicks() {
        let service = Arc::new(test_service());
        service
            .create(CreateRequest::new("https://example.com").with_alias(code("hot1")))
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..25 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.resolve(&code("hot1")).await.unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), "https://example.com");
        }

        let mapping = service
            .repository()
            .find_by_code(&code("hot1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mapping.click_count, 25);
    }

    #[test]
    fn cache_ttl_is_capped_by_remaining_lifetime() {
        let now = Timestamp::now();
        let standard = Duration::from_secs(3600);

        assert_eq!(capped_ttl(standard, None, now), Some(standard));
        assert_eq!(
            capped_ttl(standard, Some(now + SignedDuration::from_secs(90)), now),
            Some(Duration::from_secs(90))
        );
        assert_eq!(
            capped_ttl(standard, Some(now + SignedDuration::from_hours(48)), now),
            Some(standard)
        );
        assert_eq!(capped_ttl(standard, Some(now), now), None);
        assert_eq!(
            capped_ttl(standard, Some(now - SignedDuration::from_secs(1)), now),
            None
        );
    }
}
