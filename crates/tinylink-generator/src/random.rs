use crate::error::GeneratorError;
use crate::Generator;
use rand::distr::{Alphanumeric, SampleString};
use tinylink_core::ShortCode;
use typed_builder::TypedBuilder;

pub const MIN_CODE_LENGTH: usize = 5;
pub const MAX_CODE_LENGTH: usize = 8;

/// Settings for [`RandomGenerator`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGeneratorSettings {
    /// Number of characters per generated code.
    #[builder(default = 7)]
    length: usize,
}

/// Generates fixed-length codes over `[0-9A-Za-z]`.
///
/// Draws from the thread-local CSPRNG, so knowing some codes does not help
/// predict others.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(settings: RandomGeneratorSettings) -> Result<Self, GeneratorError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&settings.length) {
            return Err(GeneratorError::InvalidLength {
                length: settings.length,
                min: MIN_CODE_LENGTH,
                max: MAX_CODE_LENGTH,
            });
        }

        Ok(Self {
            length: settings.length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let code = Alphanumeric.sample_string(&mut rand::rng(), self.length);
        ShortCode::new_unchecked(code)
    }
}
