use crate::types::responses::message_of;
use crate::types::{AddComponentRequest, AddComponentResponse, ComponentSpec};
use crate::{Result, SceneClient};
use reqwest::Method;

pub const PATH: &str = "/add_component_to_entity";

pub async fn add_component(
    client: &SceneClient,
    entity_id: u64,
    component: ComponentSpec,
) -> Result<AddComponentResponse> {
    component.validate()?;

    let request = AddComponentRequest {
        entity_id,
        component,
    };
    tracing::debug!(
        "Attaching {} component to entity #{}",
        request.component.kind(),
        entity_id
    );

    let body = serde_json::to_value(&request)?;
    let response = client.send(Method::POST, PATH, Some(&body)).await?;

    Ok(AddComponentResponse {
        message: message_of(&response.data),
    })
}
