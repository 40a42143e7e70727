//! Batch Entries
//!
//! One serialized chat-completion request per (operation, record) pair, in the
//! newline-delimited JSON shape accepted by the OpenAI Batch API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::MessageSequence;
use super::response_format::ResponseFormatBlock;
use crate::error::FrameResult;

pub const BATCH_METHOD: &str = "POST";
pub const BATCH_URL: &str = "/v1/chat/completions";

/// Body keys owned by the request itself; pass-through parameters may not use them.
pub const RESERVED_BODY_KEYS: [&str; 3] = ["model", "messages", "response_format"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub custom_id: String,
    pub method: String,
    pub url: String,
    pub body: BatchBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchBody {
    /// Serialized as `null` when the operation has no model configured
    pub model: Option<String>,
    pub messages: MessageSequence,
    /// Pass-through parameters, emitted as top-level siblings of `model` and `messages`
    #[serde(flatten)]
    pub params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response_format: Option<ResponseFormatBlock>,
}

impl BatchEntry {
    pub(crate) fn new(custom_id: impl Into<String>, body: BatchBody) -> Self {
        Self {
            custom_id: custom_id.into(),
            method: BATCH_METHOD.to_string(),
            url: BATCH_URL.to_string(),
            body,
        }
    }

    /// Render as a single JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> FrameResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
