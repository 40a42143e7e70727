//! Error Taxonomy
//!
//! Every top-level operation (`extend`, `emit_batch_file`, `estimate_token_usage`)
//! surfaces one of these variants. Nothing is swallowed or retried internally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    /// Malformed operation specification or configuration file
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A record's value cannot be rendered as message text
    #[error("Invalid input in column '{column}': {reason}")]
    InvalidInput { column: String, reason: String },

    /// A dataset file line that does not hold a JSON object
    #[error("Invalid dataset at line {line}: {reason}")]
    InvalidDataset { line: usize, reason: String },

    #[error("Batch of {records} requests exceeds the limit (must be fewer than {limit})")]
    BatchSizeExceeded { records: usize, limit: usize },

    #[error("No tokenizer registered for model '{0}'")]
    UnsupportedModel(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Cannot estimate token usage over an empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The completion capability failed while processing record `record`
    #[error("Completion failed for record {record}: {source}")]
    Completion {
        record: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl FrameError {
    pub fn invalid_input(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

pub type FrameResult<T> = Result<T, FrameError>;
