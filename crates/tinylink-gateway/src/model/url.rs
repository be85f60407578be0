use crate::error::AppError;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tinylink_core::{CreateRequest, ExpirationPolicy, ShortCode, UrlMapping, MAX_LONG_URL_LENGTH};

/// Longest lifetime a client may request through `expiryInDays`.
pub const MAX_EXPIRY_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    pub long_url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
    #[serde(default)]
    pub expiry_at: Option<Timestamp>,
    #[serde(default)]
    pub expiry_in_days: Option<i64>,
}

impl ShortenRequest {
    /// Validates the payload and turns it into a shortener request.
    pub fn into_create_request(self) -> Result<CreateRequest, AppError> {
        let long_url = self.long_url.trim().to_string();
        validate_long_url(&long_url)?;

        let expiration = match (self.expiry_at, self.expiry_in_days) {
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "expiryAt and expiryInDays are mutually exclusive".to_string(),
                ))
            }
            (Some(at), None) => ExpirationPolicy::AtTimestamp(at),
            (None, Some(days)) => {
                if !(0..=MAX_EXPIRY_DAYS).contains(&days) {
                    return Err(AppError::Validation(format!(
                        "expiryInDays must be between 0 and {MAX_EXPIRY_DAYS}"
                    )));
                }
                ExpirationPolicy::AfterDuration(SignedDuration::from_hours(days * 24))
            }
            (None, None) => ExpirationPolicy::Default,
        };

        let mut request = CreateRequest::new(long_url).with_expiration(expiration);
        if let Some(alias) = self.custom_alias.filter(|alias| !alias.trim().is_empty()) {
            request = request.with_alias(ShortCode::new(alias.trim())?);
        }
        Ok(request)
    }
}

fn validate_long_url(long_url: &str) -> Result<(), AppError> {
    if long_url.is_empty() {
        return Err(AppError::Validation("longUrl must not be blank".to_string()));
    }
    if long_url.len() > MAX_LONG_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "longUrl must be at most {MAX_LONG_URL_LENGTH} characters"
        )));
    }

    let Some((scheme, rest)) = long_url.split_once("://") else {
        return Err(AppError::Validation(
            "longUrl must start with http:// or https://".to_string(),
        ));
    };
    if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")) {
        return Err(AppError::Validation(
            "longUrl must start with http:// or https://".to_string(),
        ));
    }
    if rest.is_empty() || rest.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::Validation("longUrl must have a valid host".to_string()));
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: Timestamp,
    pub expiry_at: Option<Timestamp>,
}

impl ShortenResponse {
    pub fn new(mapping: UrlMapping, base_url: &str) -> Self {
        Self {
            short_url: mapping.short_code.to_url(base_url),
            short_code: mapping.short_code.into(),
            long_url: mapping.long_url,
            created_at: mapping.created_at,
            expiry_at: mapping.expiry_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMappingResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: Timestamp,
    pub expiry_at: Option<Timestamp>,
    pub click_count: u64,
    pub last_clicked_at: Option<Timestamp>,
}

impl UrlMappingResponse {
    pub fn new(mapping: UrlMapping, base_url: &str) -> Self {
        Self {
            id: mapping.id,
            short_url: mapping.short_code.to_url(base_url),
            short_code: mapping.short_code.into(),
            long_url: mapping.long_url,
            created_at: mapping.created_at,
            expiry_at: mapping.expiry_at,
            click_count: mapping.click_count,
            last_clicked_at: mapping.last_clicked_at,
        }
    }
}
