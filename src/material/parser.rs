//! Decoding material/pass definition documents
//!
//! A definition document is a single JSON object whose keys are either a
//! bare definition name (`"Terrain"`) or a composite `"Child:Parent"` key
//! naming the definition this one inherits from.

use std::collections::HashMap;

use tracing::trace;

use crate::material::definition::MaterialDefinition;

/// Errors that can occur while decoding or resolving definitions
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("definition document is not a JSON object")]
    NotAnObject,

    #[error("definition {name} has a cycle in its parent chain")]
    ParentCycle { name: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a definition document into a map from definition name to record
///
/// Keys are split on the first colon: everything before it is the child
/// name, everything after it the parent name. Only fields present in the
/// JSON object are populated; everything else stays unset. Later duplicate
/// keys overwrite earlier ones.
pub fn parse_definitions(
    document: &serde_json::Value,
) -> Result<HashMap<String, MaterialDefinition>, MaterialError> {
    let Some(object) = document.as_object() else {
        return Err(MaterialError::NotAnObject);
    };

    let mut definitions = HashMap::new();
    for (key, value) in object {
        let (name, parent_name) = match key.split_once(':') {
            Some((child, parent)) => (child.to_string(), Some(parent.to_string())),
            None => (key.clone(), None),
        };

        let mut definition: MaterialDefinition = serde_json::from_value(value.clone())?;
        definition.name = name.clone();
        definition.parent_name = parent_name;

        trace!(definition = %name, "Parsed definition record");
        definitions.insert(name, definition);
    }

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_definition() {
        let document = serde_json::json!({
            "Base": { "vertexShader": "v1" }
        });
        let definitions = parse_definitions(&document).unwrap();
        let base = &definitions["Base"];
        assert_eq!(base.name, "Base");
        assert!(base.parent_name.is_none());
        assert_eq!(base.vertex_shader.as_deref(), Some("v1"));
    }

    #[test]
    fn test_parse_splits_key_on_first_colon() {
        let document = serde_json::json!({
            "Child:Base": {}
        });
        let definitions = parse_definitions(&document).unwrap();
        let child = &definitions["Child"];
        assert_eq!(child.name, "Child");
        assert_eq!(child.parent_name.as_deref(), Some("Base"));
        assert!(!definitions.contains_key("Child:Base"));
    }

    #[test]
    fn test_parse_only_populates_present_fields() {
        let document = serde_json::json!({
            "Terrain": { "fragmentShader": "f1" }
        });
        let definitions = parse_definitions(&document).unwrap();
        let terrain = &definitions["Terrain"];
        assert_eq!(terrain.fragment_shader.as_deref(), Some("f1"));
        assert!(terrain.vertex_shader.is_none());
        assert!(terrain.states.is_none());
    }

    #[test]
    fn test_parse_duplicate_keys_overwrite() {
        // serde_json keeps the last value for a duplicated key, so the later
        // definition wins without any merging
        let document: serde_json::Value = serde_json::from_str(
            r#"{
                "Terrain": { "vertexShader": "old" },
                "Terrain": { "vertexShader": "new" }
            }"#,
        )
        .unwrap();
        let definitions = parse_definitions(&document).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions["Terrain"].vertex_shader.as_deref(), Some("new"));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let document = serde_json::json!(["not", "an", "object"]);
        assert!(matches!(
            parse_definitions(&document),
            Err(MaterialError::NotAnObject)
        ));
    }

    #[test]
    fn test_parse_forward_parent_reference() {
        // A child may name a parent defined later in the document
        let document = serde_json::json!({
            "Child:Base": {},
            "Base": { "fragmentShader": "f" }
        });
        let definitions = parse_definitions(&document).unwrap();
        assert_eq!(definitions["Child"].parent_name.as_deref(), Some("Base"));
        assert!(definitions.contains_key("Base"));
    }
}
