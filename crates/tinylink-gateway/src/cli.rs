use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use tinylink_telemetry::LogFormat;

pub const LISTEN_ADDR_ENV: &str = "TINYLINK_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "TINYLINK_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "TINYLINK_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "TINYLINK_MYSQL_DSN";
pub const STORE_TIMEOUT_MS_ENV: &str = "TINYLINK_STORE_TIMEOUT_MS";
pub const CACHE_BACKEND_ENV: &str = "TINYLINK_CACHE_BACKEND";
pub const CACHE_TTL_HOURS_ENV: &str = "TINYLINK_CACHE_TTL_HOURS";
pub const CACHE_SWEEP_INTERVAL_SECS_ENV: &str = "TINYLINK_CACHE_SWEEP_INTERVAL_SECS";
pub const DEFAULT_EXPIRY_DAYS_ENV: &str = "TINYLINK_DEFAULT_EXPIRY_DAYS";
pub const CODE_LENGTH_ENV: &str = "TINYLINK_CODE_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "TINYLINK_MAX_ATTEMPTS";
pub const CLEANUP_INTERVAL_SECS_ENV: &str = "TINYLINK_CLEANUP_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "TINYLINK_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub const MAX_CACHE_TTL_HOURS: u64 = 365 * 24;
/// Longest sweep or cleanup period, one week.
pub const MAX_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "sweeping")]
    Sweeping,
    #[value(name = "moka")]
    Moka,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Sweeping => write!(f, "sweeping"),
            CacheBackendArg::Moka => write!(f, "moka"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "tinylink", about = "URL shortener HTTP server")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix of the short URLs returned to clients.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Upper bound for a single store call.
    #[arg(
        long,
        env = STORE_TIMEOUT_MS_ENV,
        default_value_t = 2000,
        value_parser = clap::value_parser!(u64).range(1..=600_000)
    )]
    pub store_timeout_ms: u64,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Sweeping
    )]
    pub cache: CacheBackendArg,

    /// Resolution cache TTL, at most one year.
    #[arg(
        long,
        env = CACHE_TTL_HOURS_ENV,
        default_value_t = 24,
        value_parser = clap::value_parser!(u64).range(1..=MAX_CACHE_TTL_HOURS)
    )]
    pub cache_ttl_hours: u64,

    #[arg(
        long,
        env = CACHE_SWEEP_INTERVAL_SECS_ENV,
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PERIOD_SECS)
    )]
    pub cache_sweep_interval_secs: u64,

    /// Lifetime of a mapping created without an explicit expiry.
    #[arg(
        long,
        env = DEFAULT_EXPIRY_DAYS_ENV,
        default_value_t = 30,
        value_parser = clap::value_parser!(i64).range(1..=36_500)
    )]
    pub default_expiry_days: i64,

    /// Length of generated short codes (5-8).
    #[arg(long, env = CODE_LENGTH_ENV, default_value_t = 7)]
    pub code_length: usize,

    /// Generated candidates tried before a creation fails.
    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = 50,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    #[arg(
        long,
        env = CLEANUP_INTERVAL_SECS_ENV,
        default_value_t = 3600,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PERIOD_SECS)
    )]
    pub cleanup_interval_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
