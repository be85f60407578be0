//! Core types and traits for the Tinylink URL shortener.
//!
//! This crate provides the types shared by the storage, cache, shortener
//! and gateway crates: the [`ShortCode`] key, the persisted [`UrlMapping`],
//! the error taxonomy and the trait seams each component implements.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;
pub mod task;

pub use cache::UrlCache;
pub use error::{CacheError, ShortenerError, StorageError};
pub use repository::{NewUrlMapping, ReadRepository, Repository, UrlMapping};
pub use shortcode::ShortCode;
pub use shortener::{CreateRequest, ExpirationPolicy, Shortener, MAX_LONG_URL_LENGTH};
pub use task::PeriodicTask;
