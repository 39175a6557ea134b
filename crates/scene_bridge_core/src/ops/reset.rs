use crate::types::ApiResponse;
use crate::{Result, SceneClient};
use reqwest::Method;
use serde_json::json;

/// Clears all server-side state. Handy between test runs.
pub async fn reset(client: &SceneClient) -> Result<ApiResponse> {
    client.send(Method::POST, "/reset", Some(&json!({}))).await
}
