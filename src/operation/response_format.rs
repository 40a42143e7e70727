//! Structured Output Contracts
//!
//! A named JSON Schema that constrains what the model may generate. Schemas can be
//! supplied directly or derived from any type implementing `schemars::JsonSchema`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FrameError, FrameResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    pub name: String,
    pub schema: Value,
}

impl ResponseFormat {
    /// Use an explicit schema object. The name must be non-empty and the schema a JSON object.
    pub fn new(name: impl Into<String>, schema: Value) -> FrameResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FrameError::InvalidConfiguration(
                "response_format name must not be empty".to_string(),
            ));
        }
        if !schema.is_object() {
            return Err(FrameError::InvalidConfiguration(format!(
                "response_format '{}' schema must be a JSON object",
                name
            )));
        }
        Ok(Self { name, schema })
    }

    /// Derive the contract from a Rust type, named after the type's schema name.
    pub fn of<T: JsonSchema>() -> Self {
        let root = schemars::schema_for!(T);
        // RootSchema always serializes to an object
        let schema = serde_json::to_value(root).unwrap_or_else(|_| Value::Object(Default::default()));
        Self {
            name: T::schema_name(),
            schema,
        }
    }

    /// The `response_format` block placed in a chat-completion request body.
    pub fn to_request_block(&self) -> ResponseFormatBlock {
        ResponseFormatBlock {
            kind: "json_schema".to_string(),
            json_schema: JsonSchemaBlock {
                schema: self.schema.clone(),
                name: self.name.clone(),
                strict: true,
            },
        }
    }
}

/// Wire form: `{"type": "json_schema", "json_schema": {"schema", "name", "strict": true}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormatBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub json_schema: JsonSchemaBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaBlock {
    pub schema: Value,
    pub name: String,
    pub strict: bool,
}
