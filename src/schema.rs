use serde_json::{json, Map, Value};

/// Response schema passed alongside a structured-text prompt.
///
/// The generation service constrains its reply to match the declared shape.
/// This is deliberately a closed set of variants rather than a general schema
/// language; only the shapes the director actually requests are modeled.
#[derive(Debug, Clone)]
pub enum Schema {
    Object {
        properties: Vec<(String, Schema)>,
        required: Vec<String>,
    },
    Array {
        description: Option<String>,
        items: Box<Schema>,
    },
    String {
        description: Option<String>,
    },
    Enum {
        values: Vec<String>,
    },
    Integer,
}

impl Schema {
    pub fn object(properties: Vec<(&str, Schema)>, required: &[&str]) -> Self {
        Schema::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: required.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array {
            description: None,
            items: Box::new(items),
        }
    }

    pub fn array_described(description: &str, items: Schema) -> Self {
        Schema::Array {
            description: Some(description.to_string()),
            items: Box::new(items),
        }
    }

    pub fn string() -> Self {
        Schema::String { description: None }
    }

    pub fn string_described(description: &str) -> Self {
        Schema::String {
            description: Some(description.to_string()),
        }
    }

    pub fn string_enum(values: &[&str]) -> Self {
        Schema::Enum {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn integer() -> Self {
        Schema::Integer
    }

    /// Wire form understood by the generation endpoint.
    pub fn to_value(&self) -> Value {
        match self {
            Schema::Object {
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, schema) in properties {
                    props.insert(name.clone(), schema.to_value());
                }
                let mut value = json!({ "type": "OBJECT", "properties": props });
                if !required.is_empty() {
                    value["required"] = json!(required);
                }
                value
            }
            Schema::Array { description, items } => {
                let mut value = json!({ "type": "ARRAY", "items": items.to_value() });
                if let Some(description) = description {
                    value["description"] = json!(description);
                }
                value
            }
            Schema::String { description } => {
                let mut value = json!({ "type": "STRING" });
                if let Some(description) = description {
                    value["description"] = json!(description);
                }
                value
            }
            Schema::Enum { values } => {
                json!({ "type": "STRING", "enum": values })
            }
            Schema::Integer => json!({ "type": "INTEGER" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_wire_form() {
        let schema = Schema::object(
            vec![
                ("name", Schema::string()),
                ("count", Schema::integer()),
            ],
            &["name"],
        );

        let value = schema.to_value();
        assert_eq!(value["type"], "OBJECT");
        assert_eq!(value["properties"]["name"]["type"], "STRING");
        assert_eq!(value["properties"]["count"]["type"], "INTEGER");
        assert_eq!(value["required"], json!(["name"]));
    }

    #[test]
    fn test_object_without_required_omits_field() {
        let schema = Schema::object(vec![("name", Schema::string())], &[]);
        let value = schema.to_value();
        assert!(value.get("required").is_none());
    }

    #[test]
    fn test_nested_array_and_enum() {
        let schema = Schema::array_described(
            "A list of moods.",
            Schema::string_enum(&["calm", "tense"]),
        );

        let value = schema.to_value();
        assert_eq!(value["type"], "ARRAY");
        assert_eq!(value["description"], "A list of moods.");
        assert_eq!(value["items"]["type"], "STRING");
        assert_eq!(value["items"]["enum"], json!(["calm", "tense"]));
    }

    #[test]
    fn test_string_description() {
        let value = Schema::string_described("A catchy title.").to_value();
        assert_eq!(value["description"], "A catchy title.");
    }
}
