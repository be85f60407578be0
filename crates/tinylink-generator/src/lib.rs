//! Short code generators.
//!
//! Generators are pure: they never consult storage. Uniqueness against the
//! store is the caller's job (see the shortener service's retry loop).

pub mod base62;
pub mod error;
pub mod random;
pub mod seq;

pub use error::GeneratorError;
pub use random::{RandomGenerator, RandomGeneratorSettings};
pub use seq::SeqGenerator;

use tinylink_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
///
/// Implementations can vary from random generators to sequential
/// counters; collisions with existing codes are resolved by the caller.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Generates a candidate short code.
    fn generate(&self) -> Self::Output;
}
