//! Completion Providers
//!
//! The completion capability the frame extender calls once per record.

mod cache;
mod openai;

pub use cache::{CachedProvider, CompletionCache};
pub use openai::OpenAICompatibleProvider;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::operation::MessageSequence;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one chat completion and return the generated text.
    ///
    /// `params` are forwarded verbatim as top-level request fields.
    async fn complete(
        &self,
        model: &str,
        messages: &MessageSequence,
        params: &Map<String, Value>,
    ) -> Result<String>;
}
