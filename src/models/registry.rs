// Request/response DTOs for the service registry. The registry-read path
// itself is a simple collaborator; these types only shape the HTTP surface.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub category: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub category: String,
    pub is_paid: bool,
    pub status: String,
}

impl From<crossfin_store::Service> for ServiceResponse {
    fn from(service: crossfin_store::Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            endpoint: service.endpoint,
            category: service.category,
            is_paid: service.is_paid,
            status: service.status,
        }
    }
}
