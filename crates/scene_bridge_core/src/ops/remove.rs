use crate::types::responses::message_of;
use crate::types::{RemoveEntityRequest, RemoveEntityResponse};
use crate::{Result, SceneClient};
use reqwest::Method;

pub const PATH: &str = "/remove_entity";

pub async fn remove_entity(client: &SceneClient, entity_id: u64) -> Result<RemoveEntityResponse> {
    let body = serde_json::to_value(RemoveEntityRequest { entity_id })?;
    let response = client.send(Method::DELETE, PATH, Some(&body)).await?;

    Ok(RemoveEntityResponse {
        message: message_of(&response.data),
    })
}
