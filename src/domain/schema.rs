use serde_json::{json, Value};

/// Shape hint sent with a generation request so the model emits conforming JSON.
/// Never used to parse the reply locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSchema {
    StringArray,
    Object { required_fields: Vec<String> },
}

impl ResponseSchema {
    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Object {
            required_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Render in the OpenAPI subset accepted by `generationConfig.responseSchema`.
    pub fn to_json(&self) -> Value {
        match self {
            ResponseSchema::StringArray => json!({
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }),
            ResponseSchema::Object { required_fields } => {
                let properties: serde_json::Map<String, Value> = required_fields
                    .iter()
                    .map(|name| (name.clone(), json!({ "type": "STRING" })))
                    .collect();
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required_fields,
                })
            }
        }
    }
}
