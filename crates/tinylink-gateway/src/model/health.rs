use jiff::Timestamp;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthComponents {
    pub store: ComponentHealth,
}

/// Overall status plus one entry per backing component. The overall status
/// is `DOWN` as soon as any component is.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub components: HealthComponents,
}

impl HealthResponse {
    pub fn new(store: HealthStatus) -> Self {
        Self {
            status: store,
            components: HealthComponents {
                store: ComponentHealth { status: store },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
    pub service: &'static str,
    pub timestamp: Timestamp,
}
