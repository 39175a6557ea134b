use crate::types::responses::message_of;
use crate::types::{CreateEntityRequest, CreateEntityResponse};
use crate::{Result, SceneClient};
use reqwest::Method;
use serde_json::Value;

pub const PATH: &str = "/create_entity";

pub async fn create_entity(
    client: &SceneClient,
    request: &CreateEntityRequest,
) -> Result<CreateEntityResponse> {
    request.validate()?;

    let body = serde_json::to_value(request)?;
    let response = client.send(Method::POST, PATH, Some(&body)).await?;

    Ok(parse_response(&response.data))
}

fn parse_response(data: &Value) -> CreateEntityResponse {
    CreateEntityResponse {
        entity_id: data.get("entityId").and_then(Value::as_u64),
        message: message_of(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_entity_id() {
        let parsed = parse_response(&json!({"entityId": 5, "message": "Entity created"}));
        assert_eq!(parsed.entity_id, Some(5));
        assert_eq!(parsed.message.as_deref(), Some("Entity created"));
    }

    #[test]
    fn test_parse_without_entity_id() {
        let parsed = parse_response(&json!({}));
        assert_eq!(parsed.entity_id, None);

        let parsed = parse_response(&Value::Null);
        assert_eq!(parsed.entity_id, None);
        assert_eq!(parsed.message, None);
    }

    #[test]
    fn test_parse_rejects_negative_id() {
        let parsed = parse_response(&json!({"entityId": -1}));
        assert_eq!(parsed.entity_id, None);
    }
}
