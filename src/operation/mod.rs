//! Operation Module
//!
//! Declarative semantic operations and the request forms they render into:
//! per-record message sequences for synchronous calls and batch entries for
//! offline bulk submission.

mod batch;
mod message;
pub mod presets;
mod response_format;
mod spec;

pub use batch::{BatchBody, BatchEntry, BATCH_METHOD, BATCH_URL, RESERVED_BODY_KEYS};
pub use message::{ChatMessage, MessageSequence, Role};
pub use presets::{SentimentPreset, TranslationPreset};
pub use response_format::{JsonSchemaBlock, ResponseFormat, ResponseFormatBlock};
pub use spec::{SemanticOperation, SemanticOperationBuilder, CONTEXT_SEPARATOR};
