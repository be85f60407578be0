//! Durable store adapters for URL mappings.
//!
//! [`InMemoryRepository`] keeps everything in a sharded concurrent map and
//! suits tests and single-process deployments; [`MySqlRepository`] persists
//! to MySQL through sqlx.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::{MySqlRepository, MySqlSettings};
pub use tinylink_core::repository::Result;
pub use tinylink_core::{NewUrlMapping, ReadRepository, Repository, StorageError, UrlMapping};
