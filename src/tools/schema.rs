//! Helpers used by tool implementations (and by code generated with `tool!`)
//! to describe and decode their parameters.

use crate::{AgentError, Result};
use schemars::{gen::SchemaSettings, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keys every provider we talk to either rejects or ignores.
const STRIPPED_KEYS: &[&str] = &["$schema", "title", "format", "definitions"];

/// Build a provider-friendly JSON Schema for a params struct.
///
/// Subschemas are inlined, optional fields are plain (no `null` unions), and
/// metadata keys such as `title` and `format` are removed so the same schema is
/// accepted by OpenAI, Anthropic, Gemini and Bedrock.
pub fn parameters_for<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.option_nullable = false;
            settings.option_add_null_type = false;
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();

    let root = generator.into_root_schema_for::<T>();
    let mut schema = serde_json::to_value(&root.schema).unwrap_or_else(|_| {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    });
    sanitize(&mut schema);
    schema
}

fn sanitize(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in STRIPPED_KEYS {
                map.remove(*key);
            }
            if map.get("default").map(Value::is_null).unwrap_or(false) {
                map.remove("default");
            }
            for (key, child) in map.iter_mut() {
                if key == "properties" {
                    // property names are user data; only clean their schemas
                    if let Value::Object(properties) = child {
                        properties.values_mut().for_each(sanitize);
                    }
                } else {
                    sanitize(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize),
        _ => {}
    }
}

/// Decode tool arguments, reporting the offending field path on failure.
pub fn decode_params<T: DeserializeOwned>(tool_name: &str, parameters: Value) -> Result<T> {
    serde_path_to_error::deserialize(parameters).map_err(|err| {
        AgentError::Validation(format!(
            "Invalid parameters for {} at {}: {}",
            tool_name,
            err.path(),
            err.inner()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Debug, Deserialize, JsonSchema)]
    struct Sample {
        /// The title of the thing
        title: String,
        #[serde(default)]
        count: Option<u32>,
        ratio: f64,
    }

    #[test]
    fn generated_schema_is_plain_object_schema() {
        let schema = parameters_for::<Sample>();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());

        let properties = &schema["properties"];
        // a parameter literally named `title` survives
        assert_eq!(properties["title"]["type"], "string");
        assert_eq!(properties["title"]["description"], "The title of the thing");
        assert_eq!(properties["count"]["type"], "integer");
        assert!(properties["count"].get("format").is_none());
        assert!(properties["ratio"].get("format").is_none());

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"title"));
        assert!(!required.contains(&"count"));
    }

    #[test]
    fn decode_reports_field_path() {
        let err = decode_params::<Sample>("sample", serde_json::json!({"title": "x", "ratio": "high"}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("sample"));
        assert!(message.contains("ratio"));
    }
}
