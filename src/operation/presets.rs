//! Operation Presets
//!
//! Ready-made configurations for common transformations. Each preset field maps
//! to exactly one operation field.

use super::response_format::ResponseFormat;
use super::spec::SemanticOperation;
use crate::error::FrameResult;

/// Translate a text column into a target language
#[derive(Debug, Clone)]
pub struct TranslationPreset {
    pub input_column: String,
    pub output_column: String,
    pub target_language: String,
    pub model_name: Option<String>,
    pub response_format: Option<ResponseFormat>,
}

impl TranslationPreset {
    pub fn new(
        input_column: impl Into<String>,
        output_column: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            input_column: input_column.into(),
            output_column: output_column.into(),
            target_language: target_language.into(),
            model_name: None,
            response_format: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn build(self) -> FrameResult<SemanticOperation> {
        let mut builder = SemanticOperation::builder(
            self.input_column,
            self.output_column,
            format!(
                "Translate the following text into {}. Respond with the translation only.",
                self.target_language
            ),
        )
        .system_message("You are a professional translator.");

        if let Some(model) = self.model_name {
            builder = builder.model_name(model);
        }
        if let Some(format) = self.response_format {
            builder = builder.response_format(format);
        }
        builder.build()
    }
}

/// Classify a text column into one of a fixed set of labels
#[derive(Debug, Clone)]
pub struct SentimentPreset {
    pub input_column: String,
    pub output_column: String,
    pub labels: Vec<String>,
    pub model_name: Option<String>,
}

impl SentimentPreset {
    pub fn new(input_column: impl Into<String>, output_column: impl Into<String>) -> Self {
        Self {
            input_column: input_column.into(),
            output_column: output_column.into(),
            labels: vec!["positive".into(), "neutral".into(), "negative".into()],
            model_name: None,
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn build(self) -> FrameResult<SemanticOperation> {
        let mut builder = SemanticOperation::builder(
            self.input_column,
            self.output_column,
            format!(
                "Classify the sentiment of the text as one of: {}. Respond with the label only.",
                self.labels.join(", ")
            ),
        )
        .system_message("You are a sentiment classifier.")
        .model_param("temperature", 0);

        if let Some(model) = self.model_name {
            builder = builder.model_name(model);
        }
        builder.build()
    }
}
