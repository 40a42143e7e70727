use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use llm_frames::provider::{CachedProvider, CompletionCache};
use llm_frames::{
    CompletionProvider, Dataset, FrameConfig, FrameError, LlmFrame, MessageSequence, OperationsFile,
    Record, Role,
};
use serde_json::{Map, Value};

/// Returns canned answers keyed by the user turn and logs each request
#[derive(Default)]
struct ScriptedProvider {
    answers: HashMap<String, String>,
    requests: Mutex<Vec<MessageSequence>>,
}

impl ScriptedProvider {
    fn answering(pairs: &[(&str, &str)]) -> Self {
        Self {
            answers: pairs.iter().map(|(q, a)| (q.to_string(), a.to_string())).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(
        &self,
        _model: &str,
        messages: &MessageSequence,
        _params: &Map<String, Value>,
    ) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(messages.clone());
        let user = &messages.last().unwrap().content;
        self.answers
            .get(user)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer for '{}'", user))
    }
}

const OPS: &str = r#"
operations:
  - input_column: review
    output_column: sentiment
    prompt_message: Classify sentiment.
    system_message: You are a classifier.
  - input_column: sentiment
    output_column: emoji
    prompt_message: Pick an emoji.
"#;

fn reviews() -> Dataset {
    Dataset::new(vec![
        Record::new().with("review", "bad").with("id", "a"),
        Record::new().with("review", "great").with("id", "b"),
    ])
}

fn scripted() -> ScriptedProvider {
    ScriptedProvider::answering(&[
        ("Classify sentiment. Context: bad", "negative"),
        ("Classify sentiment. Context: great", "positive"),
        ("Pick an emoji. Context: negative", ":("),
        ("Pick an emoji. Context: positive", ":)"),
    ])
}

#[tokio::test]
async fn test_operations_file_chain() {
    let operations = OperationsFile::from_yaml(OPS).unwrap().into_operations().unwrap();
    let provider = Arc::new(scripted());
    let mut frame = LlmFrame::new(reviews(), provider.clone());

    frame.extend(&operations).await.unwrap();

    let dataset = frame.into_dataset();
    assert_eq!(dataset.column_text("sentiment").unwrap(), vec!["negative", "positive"]);
    assert_eq!(dataset.column_text("emoji").unwrap(), vec![":(", ":)"]);

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 4);
    for request in &requests[..2] {
        assert_eq!(request.len(), 2);
        assert_eq!(request.first().unwrap().role, Role::System);
        assert_eq!(request.first().unwrap().content, "You are a classifier.");
    }
    for request in &requests[2..] {
        assert_eq!(request.len(), 1);
    }
}

#[tokio::test]
async fn test_failure_aborts_subsequent_operations() {
    let operations = OperationsFile::from_yaml(OPS).unwrap().into_operations().unwrap();
    let provider = Arc::new(ScriptedProvider::answering(&[
        ("Classify sentiment. Context: bad", "negative"),
        ("Classify sentiment. Context: great", "positive"),
        ("Pick an emoji. Context: negative", ":("),
    ]));
    let mut frame = LlmFrame::new(reviews(), provider).with_config(FrameConfig::default().with_concurrency(4));

    let err = frame.extend(&operations).await.unwrap_err();
    assert!(matches!(err, FrameError::Completion { record: 1, .. }));

    let records = frame.dataset().records();
    assert_eq!(records[0].text("emoji").unwrap(), ":(");
    assert!(records[1].get("emoji").is_none());
    assert_eq!(records[1].text("sentiment").unwrap(), "positive");
}

#[tokio::test]
async fn test_cached_provider_reuses_answers_across_passes() {
    let inner = Arc::new(scripted());
    let provider = Arc::new(CachedProvider::new(inner.clone(), Arc::new(CompletionCache::new())));
    let operations = OperationsFile::from_yaml(OPS).unwrap().into_operations().unwrap();

    let mut first = LlmFrame::new(reviews(), provider.clone());
    first.extend(&operations).await.unwrap();
    let mut second = LlmFrame::new(reviews(), provider);
    second.extend(&operations).await.unwrap();

    assert_eq!(first.dataset(), second.dataset());
    assert_eq!(inner.requests.lock().unwrap().len(), 4);
}

#[test]
fn test_extend_from_blocking_context() {
    let operations = OperationsFile::from_yaml(OPS).unwrap().into_operations().unwrap();
    let mut frame = LlmFrame::new(reviews(), Arc::new(scripted()));

    tokio_test::block_on(frame.extend(&operations[..1])).unwrap();
    assert_eq!(frame.dataset().column_text("sentiment").unwrap(), vec!["negative", "positive"]);
}
