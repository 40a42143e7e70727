//! LLM Frames
//!
//! Row-level natural-language transformations over tabular data:
//! - Declarative semantic operations (input column, prompt, output column, optional schema)
//! - Synchronous extension through any chat-completion provider
//! - Offline batch request files for the OpenAI Batch API
//! - Token usage estimates before running anything

pub mod config;
pub mod error;
pub mod frame;
pub mod operation;
pub mod provider;
pub mod tokenizer;
pub mod utils;

// Re-exports for convenience
pub use config::{FrameConfig, OperationConfig, OperationsFile, ProviderConfig};
pub use error::{FrameError, FrameResult};
pub use frame::{Dataset, LlmFrame, Record, TokenUsage};
pub use operation::{BatchEntry, ChatMessage, MessageSequence, ResponseFormat, Role, SemanticOperation};
pub use provider::{CachedProvider, CompletionProvider, OpenAICompatibleProvider};
pub use tokenizer::{ApproxTokenCounter, TokenCounter, TokenizerRegistry};
