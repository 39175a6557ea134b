use crate::{Result, SceneError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityRequest {
    pub name: String,
    pub target_scene: String,
    pub tags: Vec<String>,
}

impl CreateEntityRequest {
    pub fn new(
        name: impl Into<String>,
        target_scene: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            target_scene: target_scene.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SceneError::InvalidRequest("name must not be empty".into()));
        }
        if self.target_scene.trim().is_empty() {
            return Err(SceneError::InvalidRequest(
                "targetScene must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// A component as the server expects it: `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ComponentSpec {
    Script {
        #[serde(rename = "scriptPath")]
        script_path: PathBuf,
    },
    Transform {
        position: [f32; 3],
        rotation: [f32; 3],
        scale: [f32; 3],
    },
}

impl ComponentSpec {
    pub fn script(script_path: impl Into<PathBuf>) -> Self {
        Self::Script {
            script_path: script_path.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Script { .. } => "script",
            Self::Transform { .. } => "transform",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Script { script_path } => {
                if !script_path.is_absolute() {
                    return Err(SceneError::InvalidRequest(format!(
                        "scriptPath must be absolute, got '{}'",
                        script_path.display()
                    )));
                }
                if script_path.to_str().is_none() {
                    return Err(SceneError::InvalidRequest(
                        "scriptPath must be valid UTF-8".into(),
                    ));
                }
            }
            Self::Transform {
                position,
                rotation,
                scale,
            } => {
                let mut values = position.iter().chain(rotation).chain(scale);
                if values.any(|v| !v.is_finite()) {
                    return Err(SceneError::InvalidRequest(
                        "transform values must be finite numbers".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddComponentRequest {
    #[serde(rename = "entityId")]
    pub entity_id: u64,
    #[serde(flatten)]
    pub component: ComponentSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveEntityRequest {
    #[serde(rename = "entityId")]
    pub entity_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_entity_has_exact_keys() {
        let request = CreateEntityRequest::new("Cube", "Main Scene", ["cube", "rotating"]);
        let value = serde_json::to_value(&request).unwrap();

        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["name", "tags", "targetScene"]);
        assert_eq!(value["tags"], json!(["cube", "rotating"]));
        assert_eq!(value["targetScene"], "Main Scene");
    }

    #[test]
    fn test_create_entity_validation() {
        assert!(CreateEntityRequest::new("Cube", "Main", Vec::<String>::new())
            .validate()
            .is_ok());
        assert!(CreateEntityRequest::new("", "Main", ["a"]).validate().is_err());
        assert!(CreateEntityRequest::new("Cube", "  ", ["a"]).validate().is_err());
    }

    #[test]
    fn test_script_component_shape() {
        let request = AddComponentRequest {
            entity_id: 1,
            component: ComponentSpec::script("/opt/scripts/spin.py"),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "entityId": 1,
                "type": "script",
                "data": {"scriptPath": "/opt/scripts/spin.py"}
            })
        );
    }

    #[test]
    fn test_transform_component_shape() {
        let component = ComponentSpec::Transform {
            position: [1.0, 2.0, 3.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        };
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["type"], "transform");
        assert_eq!(value["data"]["position"], json!([1.0, 2.0, 3.0]));
        assert_eq!(component.kind(), "transform");
    }

    #[test]
    fn test_script_path_must_be_absolute() {
        assert!(ComponentSpec::script("scripts/spin.py").validate().is_err());
        assert!(ComponentSpec::script("/scripts/spin.py").validate().is_ok());
    }

    #[test]
    fn test_transform_rejects_nan() {
        let component = ComponentSpec::Transform {
            position: [f32::NAN, 0.0, 0.0],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        };
        assert!(component.validate().is_err());
    }

    #[test]
    fn test_remove_entity_shape() {
        let value = serde_json::to_value(RemoveEntityRequest { entity_id: 42 }).unwrap();
        assert_eq!(value, json!({"entityId": 42}));
    }
}
