use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and unwrapped `data` of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEntityResponse {
    /// Absent when the server does not echo the new id back.
    pub entity_id: Option<u64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddComponentResponse {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveEntityResponse {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityComponents {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_scene: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInfo {
    pub entity_id: u64,
    #[serde(default)]
    pub components: EntityComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: u16,
    pub details: Value,
}

pub(crate) fn message_of(data: &Value) -> Option<String> {
    data.get("message").and_then(Value::as_str).map(str::to_string)
}
