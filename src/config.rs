//! Configuration
//!
//! Runtime settings for the extender and provider, plus the declarative file
//! format for operations. Operation files reject unrecognised keys.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FrameError, FrameResult};
use crate::operation::{ResponseFormat, SemanticOperation};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Batch files must hold fewer than this many requests
pub const MAX_BATCH_REQUESTS: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Model used when an operation leaves `model_name` unset
    pub default_model: String,
    /// Maximum in-flight completion calls within one operation
    pub concurrency: usize,
}

impl FrameConfig {
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    /// Read `OPENAI_BASE_URL` and `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

/// Declarative form of a [`SemanticOperation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationConfig {
    pub input_column: String,
    pub output_column: String,
    #[serde(alias = "prompt_template")]
    pub prompt_message: String,
    #[serde(default)]
    pub system_message: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_params: Option<Map<String, Value>>,
    #[serde(default)]
    pub response_format: Option<ResponseFormatConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseFormatConfig {
    pub name: String,
    pub schema: Value,
}

impl TryFrom<OperationConfig> for SemanticOperation {
    type Error = FrameError;

    fn try_from(config: OperationConfig) -> FrameResult<Self> {
        let mut builder = SemanticOperation::builder(
            config.input_column,
            config.output_column,
            config.prompt_message,
        );
        if let Some(system) = config.system_message {
            builder = builder.system_message(system);
        }
        if let Some(model) = config.model_name {
            builder = builder.model_name(model);
        }
        if let Some(params) = config.model_params {
            builder = builder.model_params(params);
        }
        if let Some(format) = config.response_format {
            builder = builder.response_format(ResponseFormat::new(format.name, format.schema)?);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationsFile {
    pub operations: Vec<OperationConfig>,
}

impl OperationsFile {
    pub fn from_yaml(text: &str) -> FrameResult<Self> {
        serde_yaml::from_str(text).map_err(|e| FrameError::InvalidConfiguration(e.to_string()))
    }

    pub fn from_json(text: &str) -> FrameResult<Self> {
        serde_json::from_str(text).map_err(|e| FrameError::InvalidConfiguration(e.to_string()))
    }

    /// Load by extension: `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> FrameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    pub fn into_operations(self) -> FrameResult<Vec<SemanticOperation>> {
        self.operations.into_iter().map(SemanticOperation::try_from).collect()
    }
}
