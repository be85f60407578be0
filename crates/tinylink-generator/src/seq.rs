use crate::base62;
use crate::Generator;
use std::sync::atomic::{AtomicU64, Ordering};
use tinylink_core::ShortCode;

/// Minimum number of base62 digits after the prefix.
const COUNTER_WIDTH: usize = 4;

/// A sequential short code generator.
///
/// This generator produces codes like "tl0000", "tl0001", ..., "tl000Z",
/// "tl0010". Sequential codes are trivially enumerable, so this is meant
/// for tests and deterministic local setups, not public deployments.
///
/// Each instance counts on its own; codes from two instances with the
/// same prefix collide, which the shortener's retry loop then has to absorb.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter value.
    ///
    /// Useful for resuming from a known state.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        let code = format!(
            "{}{:0>width$}",
            self.prefix,
            base62::encode(count),
            width = COUNTER_WIDTH
        );
        ShortCode::new_unchecked(code)
    }
}
