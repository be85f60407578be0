use crate::app::App;
use crate::cli::{CacheBackendArg, Cli, StorageBackendArg};
use crate::state::AppState;
use anyhow::Context;
use jiff::SignedDuration;
use std::sync::Arc;
use std::time::Duration;
use tinylink_cache::{MokaCacheSettings, MokaUrlCache, SweepingCacheSettings, SweepingUrlCache};
use tinylink_core::{PeriodicTask, Repository, Shortener};
use tinylink_generator::{RandomGenerator, RandomGeneratorSettings};
use tinylink_shortener::{spawn_cleanup, ShortenerService, ShortenerSettings};
use tinylink_storage::{InMemoryRepository, MySqlRepository, MySqlSettings};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Builds every component from `cli` and serves HTTP until a shutdown signal.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    info!(
        listen_addr = %cli.listen_addr,
        storage_backend = %cli.storage,
        cache_backend = %cli.cache,
        "starting tinylink"
    );

    match cli.storage {
        StorageBackendArg::InMemory => with_store(cli, InMemoryRepository::new()).await,
        StorageBackendArg::Mysql => {
            let dsn = cli
                .mysql_dsn
                .clone()
                .context("mysql dsn is required when storage backend is mysql")?;
            let settings = MySqlSettings::builder()
                .url(dsn)
                .timeout(Duration::from_millis(cli.store_timeout_ms))
                .build();
            let repository = MySqlRepository::connect(settings)
                .await
                .context("failed to connect to mysql")?;
            repository
                .migrate()
                .await
                .context("failed to apply mysql migrations")?;
            with_store(cli, repository).await
        }
    }
}

async fn with_store<R: Repository>(cli: Cli, repository: R) -> anyhow::Result<()> {
    let generator = RandomGenerator::new(
        RandomGeneratorSettings::builder()
            .length(cli.code_length)
            .build(),
    )?;
    let settings = ShortenerSettings::builder()
        .default_expiry(SignedDuration::from_hours(cli.default_expiry_days * 24))
        .max_attempts(cli.max_attempts)
        .build();
    let ttl = Duration::from_secs(cli.cache_ttl_hours * 60 * 60);
    let sweep_interval = Duration::from_secs(cli.cache_sweep_interval_secs);

    match cli.cache {
        CacheBackendArg::Sweeping => {
            let cache = SweepingUrlCache::new(
                SweepingCacheSettings::builder()
                    .ttl(ttl)
                    .sweep_interval(sweep_interval)
                    .build(),
            );
            let sweeper = cache.spawn_sweeper();
            let service = ShortenerService::new(repository, cache, generator, settings);
            serve(cli, Arc::new(service), sweeper).await
        }
        CacheBackendArg::Moka => {
            let cache = MokaUrlCache::new(
                MokaCacheSettings::builder()
                    .ttl(ttl)
                    .sweep_interval(sweep_interval)
                    .build(),
            );
            let sweeper = cache.spawn_sweeper();
            let service = ShortenerService::new(repository, cache, generator, settings);
            serve(cli, Arc::new(service), sweeper).await
        }
    }
}

async fn serve(cli: Cli, shortener: Arc<dyn Shortener>, sweeper: PeriodicTask) -> anyhow::Result<()> {
    let cleanup = spawn_cleanup(
        Arc::clone(&shortener),
        Duration::from_secs(cli.cleanup_interval_secs),
    );

    let app = App::router(AppState::new(shortener, cli.base_url));
    let listener = TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "serving http");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cleanup.shutdown().await;
    sweeper.shutdown().await;
    info!("background tasks stopped");

    served.context("http server failed")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
