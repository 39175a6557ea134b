use crate::types::HealthResponse;
use crate::{Result, SceneClient};
use reqwest::Method;

pub async fn health(client: &SceneClient) -> Result<HealthResponse> {
    let response = client.send(Method::GET, "/health", None).await?;

    Ok(HealthResponse {
        status: response.status,
        details: response.data,
    })
}
