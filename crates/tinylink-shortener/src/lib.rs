//! The short-code allocation and resolution engine.
//!
//! [`ShortenerService`] composes a [`Repository`](tinylink_core::Repository),
//! a [`UrlCache`](tinylink_core::UrlCache) and a
//! [`Generator`](tinylink_generator::Generator) into a
//! [`Shortener`](tinylink_core::Shortener). Core types are re-exported from
//! `tinylink_core`.

pub mod cleanup;
pub mod service;

pub use cleanup::spawn_cleanup;
pub use service::{ShortenerService, ShortenerSettings};
pub use tinylink_core::{CreateRequest, ExpirationPolicy, Shortener, ShortenerError};
