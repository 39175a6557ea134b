use crate::types::ApiResponse;
use crate::{Result, SceneClient};
use reqwest::Method;
use serde_json::Value;

pub async fn raw(
    client: &SceneClient,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<ApiResponse> {
    client.send(method, path, body.as_ref()).await
}
