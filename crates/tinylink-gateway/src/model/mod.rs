mod health;
mod url;

pub use health::{HealthResponse, HealthStatus, PingResponse};
pub use url::{ShortenRequest, ShortenResponse, UrlMappingResponse};
