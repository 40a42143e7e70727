use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use llm_frames::{
    CompletionProvider, Dataset, FrameError, LlmFrame, MessageSequence, Record, SemanticOperation,
    TokenCounter, TokenUsage, FrameResult, TokenizerRegistry,
};
use serde_json::{Map, Value};
use tokenizers::Tokenizer;

struct NoProvider;

#[async_trait]
impl CompletionProvider for NoProvider {
    async fn complete(&self, _: &str, _: &MessageSequence, _: &Map<String, Value>) -> anyhow::Result<String> {
        anyhow::bail!("not used")
    }
}

/// One token per whitespace-separated word, only for `word-model`
struct WordCounter;

impl TokenCounter for WordCounter {
    fn count_tokens(&self, text: &str, model: &str) -> FrameResult<usize> {
        if model != "word-model" {
            return Err(FrameError::UnsupportedModel(model.to_string()));
        }
        Ok(text.split_whitespace().count())
    }
}

fn frame(texts: &[&str]) -> LlmFrame {
    let dataset: Dataset = texts.iter().map(|t| Record::new().with("text", *t)).collect();
    LlmFrame::new(dataset, Arc::new(NoProvider)).with_token_counter(Arc::new(WordCounter))
}

fn op(model: &str) -> SemanticOperation {
    SemanticOperation::builder("text", "out", "A long prompt that is not counted.")
        .model_name(model)
        .build()
        .unwrap()
}

#[test]
fn test_counts_only_input_text() {
    let usage = frame(&["one two", "one two three four"]).estimate_token_usage(&op("word-model")).unwrap();
    assert_eq!(usage, TokenUsage { total: 6, average: 3.0, max: 4, min: 2 });
}

#[test]
fn test_single_record_stats_agree() {
    let usage = frame(&["a b c"]).estimate_token_usage(&op("word-model")).unwrap();
    assert_eq!(usage.total, 3);
    assert_eq!(usage.total, usage.max);
    assert_eq!(usage.total, usage.min);
    assert_eq!(usage.average, 3.0);
}

#[test]
fn test_unknown_model_rejected() {
    let err = frame(&["a"]).estimate_token_usage(&op("gpt-4o")).unwrap_err();
    assert!(matches!(err, FrameError::UnsupportedModel(m) if m == "gpt-4o"));
}

#[test]
fn test_empty_dataset_rejected() {
    let err = frame(&[]).estimate_token_usage(&op("word-model")).unwrap_err();
    assert!(matches!(err, FrameError::EmptyDataset));
}

/// Whitespace-split WordLevel table; unknown words map to `[UNK]`
fn word_level_table() -> Tokenizer {
    let json = r#"{"version": "1.0", "truncation": null, "padding": null, "added_tokens": [],
        "normalizer": null, "pre_tokenizer": {"type": "Whitespace"}, "post_processor": null, "decoder": null,
        "model": {"type": "WordLevel", "vocab": {"[UNK]": 0, "the": 1, "cat": 2, "sat": 3}, "unk_token": "[UNK]"}}"#;
    Tokenizer::from_str(json).unwrap()
}

#[test]
fn test_registry_counts_through_frame() {
    let mut registry = TokenizerRegistry::new();
    registry.register_prefix("table-", word_level_table());
    let dataset: Dataset = ["the cat sat", "the dog"]
        .iter()
        .map(|t| Record::new().with("text", *t))
        .collect();
    let frame = LlmFrame::new(dataset, Arc::new(NoProvider)).with_token_counter(Arc::new(registry));

    let usage = frame.estimate_token_usage(&op("table-v1")).unwrap();
    assert_eq!(usage, TokenUsage { total: 5, average: 2.5, max: 3, min: 2 });

    let err = frame.estimate_token_usage(&op("other-v1")).unwrap_err();
    assert!(matches!(err, FrameError::UnsupportedModel(m) if m == "other-v1"));
}
