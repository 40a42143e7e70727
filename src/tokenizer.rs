//! Token Counting
//!
//! Counts tokens for cost and capacity planning. Counters are keyed by model
//! identifier and must report `UnsupportedModel` for models they have no table for.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokenizers::Tokenizer;

use crate::error::{FrameError, FrameResult};

const APPROX_BYTES_PER_TOKEN: usize = 4;

pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str, model: &str) -> FrameResult<usize>;
}

/// Exact counts from Hugging Face `tokenizer.json` tables.
///
/// Models resolve by exact name first, then by the longest registered prefix
/// (so `gpt-4o-` covers dated snapshots).
#[derive(Default, Clone)]
pub struct TokenizerRegistry {
    exact: HashMap<String, Arc<Tokenizer>>,
    prefixes: Vec<(String, Arc<Tokenizer>)>,
}

impl TokenizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: impl Into<String>, tokenizer: Tokenizer) {
        self.exact.insert(model.into(), Arc::new(tokenizer));
    }

    pub fn register_prefix(&mut self, prefix: impl Into<String>, tokenizer: Tokenizer) {
        self.prefixes.push((prefix.into(), Arc::new(tokenizer)));
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    pub fn register_file(&mut self, model: impl Into<String>, path: impl AsRef<Path>) -> FrameResult<()> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            FrameError::InvalidConfiguration(format!(
                "Failed to load tokenizer from {}: {}",
                path.display(),
                e
            ))
        })?;
        self.register(model, tokenizer);
        Ok(())
    }

    fn resolve(&self, model: &str) -> Option<&Tokenizer> {
        if let Some(tok) = self.exact.get(model) {
            return Some(tok);
        }
        self.prefixes
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix.as_str()))
            .map(|(_, tok)| tok.as_ref())
    }

    pub fn supports(&self, model: &str) -> bool {
        self.resolve(model).is_some()
    }
}

impl TokenCounter for TokenizerRegistry {
    fn count_tokens(&self, text: &str, model: &str) -> FrameResult<usize> {
        let tokenizer = self
            .resolve(model)
            .ok_or_else(|| FrameError::UnsupportedModel(model.to_string()))?;
        let encoding = tokenizer
            .encode(text, false)
            .map_err(|e| FrameError::Tokenization(e.to_string()))?;
        Ok(encoding.get_ids().len())
    }
}

/// Byte-length estimate (about four bytes per token) for known model families.
#[derive(Debug, Clone)]
pub struct ApproxTokenCounter {
    families: Vec<String>,
}

impl ApproxTokenCounter {
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: families.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ApproxTokenCounter {
    fn default() -> Self {
        Self::new(["gpt-4o", "gpt-4", "gpt-3.5-turbo", "o1", "o3", "o4", "text-embedding-"])
    }
}

impl TokenCounter for ApproxTokenCounter {
    fn count_tokens(&self, text: &str, model: &str) -> FrameResult<usize> {
        if !self.families.iter().any(|f| model.starts_with(f.as_str())) {
            return Err(FrameError::UnsupportedModel(model.to_string()));
        }
        Ok(approx_token_count(text))
    }
}

pub fn approx_token_count(text: &str) -> usize {
    text.len().saturating_add(APPROX_BYTES_PER_TOKEN - 1) / APPROX_BYTES_PER_TOKEN
}
