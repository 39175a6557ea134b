use crate::types::EntityInfo;
use crate::{Result, SceneClient, SceneError};
use reqwest::Method;

pub async fn get_entity(client: &SceneClient, entity_id: u64) -> Result<EntityInfo> {
    let response = client
        .send(Method::GET, &format!("/get_entity/{entity_id}"), None)
        .await?;

    let entity = response
        .data
        .get("entity")
        .cloned()
        .ok_or_else(|| {
            SceneError::InvalidResponse("Missing 'entity' in get_entity response".into())
        })?;

    Ok(serde_json::from_value(entity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_info_shape() {
        let info: EntityInfo = serde_json::from_value(json!({
            "entityId": 1,
            "components": {
                "name": "Cube",
                "targetScene": "Main Scene",
                "tags": ["cube"]
            }
        }))
        .unwrap();

        assert_eq!(info.entity_id, 1);
        assert_eq!(info.components.name.as_deref(), Some("Cube"));
        assert_eq!(info.components.target_scene.as_deref(), Some("Main Scene"));
        assert_eq!(info.components.tags, Some(vec!["cube".to_string()]));
    }

    #[test]
    fn test_entity_info_with_missing_components() {
        let info: EntityInfo = serde_json::from_value(json!({
            "entityId": 2,
            "components": {"name": "Bare"}
        }))
        .unwrap();

        assert_eq!(info.components.target_scene, None);
        assert_eq!(info.components.tags, None);
    }
}
