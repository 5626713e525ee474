use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "Service is healthy")]
    pub message: String,
    pub timestamp: String,
    #[schema(example = "development")]
    pub environment: String,
}

impl HealthResponse {
    pub fn healthy(environment: &str) -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            environment: environment.to_string(),
        }
    }
}
