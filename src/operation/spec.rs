//! Semantic Operations
//!
//! A column-to-column transformation template and the builder that validates it.
//! Rendering produces either a chat message sequence or one batch request entry.

use serde_json::{Map, Value};

use super::batch::{BatchBody, BatchEntry, RESERVED_BODY_KEYS};
use super::message::MessageSequence;
use super::response_format::ResponseFormat;
use crate::error::{FrameError, FrameResult};

/// Literal joining the prompt template and the per-record context
pub const CONTEXT_SEPARATOR: &str = " Context: ";

/// Declarative template for one column-to-column LLM transformation.
///
/// Immutable once built; the same operation is rendered against every record of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticOperation {
    input_column: String,
    output_column: String,
    prompt_template: String,
    system_message: Option<String>,
    model_name: Option<String>,
    model_params: Map<String, Value>,
    response_format: Option<ResponseFormat>,
}

impl SemanticOperation {
    pub fn builder(
        input_column: impl Into<String>,
        output_column: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> SemanticOperationBuilder {
        SemanticOperationBuilder {
            input_column: input_column.into(),
            output_column: output_column.into(),
            prompt_template: prompt_template.into(),
            system_message: None,
            model_name: None,
            model_params: Map::new(),
            response_format: None,
        }
    }

    pub fn input_column(&self) -> &str {
        &self.input_column
    }

    pub fn output_column(&self) -> &str {
        &self.output_column
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    pub fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn model_params(&self) -> &Map<String, Value> {
        &self.model_params
    }

    pub fn response_format(&self) -> Option<&ResponseFormat> {
        self.response_format.as_ref()
    }

    /// Build the message sequence for one record's context.
    ///
    /// The system turn (if configured) is copied verbatim; the user turn is
    /// `prompt_template + " Context: " + context` with no escaping or truncation.
    pub fn render_messages(&self, context: &str) -> MessageSequence {
        let mut prompt = String::with_capacity(
            self.prompt_template.len() + CONTEXT_SEPARATOR.len() + context.len(),
        );
        prompt.push_str(&self.prompt_template);
        prompt.push_str(CONTEXT_SEPARATOR);
        prompt.push_str(context);
        MessageSequence::new(self.system_message.as_deref(), prompt)
    }

    /// Build the batch request for one record. `custom_id` uniqueness is the caller's concern.
    pub fn render_batch_entry(&self, context: &str, custom_id: &str) -> FrameResult<BatchEntry> {
        self.check_model_params()?;

        let body = BatchBody {
            model: self.model_name.clone(),
            messages: self.render_messages(context),
            params: self.model_params.clone(),
            response_format: self.response_format.as_ref().map(ResponseFormat::to_request_block),
        };
        Ok(BatchEntry::new(custom_id, body))
    }

    /// Reject pass-through parameters that would clobber structured request fields.
    pub fn check_model_params(&self) -> FrameResult<()> {
        if let Some(key) = RESERVED_BODY_KEYS
            .iter()
            .find(|key| self.model_params.contains_key(**key))
        {
            return Err(FrameError::InvalidConfiguration(format!(
                "model_params key '{}' collides with a reserved request field",
                key
            )));
        }
        Ok(())
    }
}

/// Builder for [`SemanticOperation`]; `build` validates column names.
#[derive(Debug, Clone)]
pub struct SemanticOperationBuilder {
    input_column: String,
    output_column: String,
    prompt_template: String,
    system_message: Option<String>,
    model_name: Option<String>,
    model_params: Map<String, Value>,
    response_format: Option<ResponseFormat>,
}

impl SemanticOperationBuilder {
    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn model_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.model_params.insert(name.into(), value.into());
        self
    }

    pub fn model_params(mut self, params: Map<String, Value>) -> Self {
        self.model_params = params;
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn build(self) -> FrameResult<SemanticOperation> {
        if self.input_column.is_empty() {
            return Err(FrameError::InvalidConfiguration(
                "input_column must not be empty".to_string(),
            ));
        }
        if self.output_column.is_empty() {
            return Err(FrameError::InvalidConfiguration(
                "output_column must not be empty".to_string(),
            ));
        }

        Ok(SemanticOperation {
            input_column: self.input_column,
            output_column: self.output_column,
            prompt_template: self.prompt_template,
            // An empty system message would produce an empty system turn
            system_message: self.system_message.filter(|s| !s.is_empty()),
            model_name: self.model_name,
            model_params: self.model_params,
            response_format: self.response_format,
        })
    }
}
