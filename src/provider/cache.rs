//! Completion Response Cache
//!
//! Memoises completions by model, rendered messages, and parameters so repeated
//! extension passes over the same data do not re-issue identical requests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::CompletionProvider;
use crate::operation::MessageSequence;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    model: String,
    request_hash: [u8; 32],
}

impl CacheKey {
    fn new(model: &str, messages: &MessageSequence, params: &Map<String, Value>) -> Self {
        let mut hasher = Sha256::new();
        for message in messages {
            hasher.update(format!("{:?}", message.role).as_bytes());
            hasher.update([0u8]);
            hasher.update(message.content.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(Value::Object(params.clone()).to_string().as_bytes());
        Self {
            model: model.to_string(),
            request_hash: hasher.finalize().into(),
        }
    }
}

pub struct CompletionCache {
    responses: Arc<RwLock<HashMap<CacheKey, String>>>,
}

impl CompletionCache {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(
        &self,
        model: &str,
        messages: &MessageSequence,
        params: &Map<String, Value>,
    ) -> Option<String> {
        let key = CacheKey::new(model, messages, params);
        let responses = self.responses.read().await;
        responses.get(&key).cloned()
    }

    pub async fn set(
        &self,
        model: &str,
        messages: &MessageSequence,
        params: &Map<String, Value>,
        response: String,
    ) {
        let key = CacheKey::new(model, messages, params);
        let mut responses = self.responses.write().await;
        responses.insert(key, response);
    }

    pub async fn len(&self) -> usize {
        self.responses.read().await.len()
    }

    pub async fn clear(&self) {
        let mut responses = self.responses.write().await;
        responses.clear();
    }
}

impl Default for CompletionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider that wraps another provider with a cache
pub struct CachedProvider {
    inner: Arc<dyn CompletionProvider>,
    cache: Arc<CompletionCache>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn CompletionProvider>, cache: Arc<CompletionCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl CompletionProvider for CachedProvider {
    async fn complete(
        &self,
        model: &str,
        messages: &MessageSequence,
        params: &Map<String, Value>,
    ) -> anyhow::Result<String> {
        if let Some(cached) = self.cache.get(model, messages, params).await {
            tracing::debug!("Completion cache hit for model {}", model);
            return Ok(cached);
        }

        let response = self.inner.complete(model, messages, params).await?;
        self.cache.set(model, messages, params, response.clone()).await;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for CountingProvider {
        async fn complete(
            &self,
            _model: &str,
            messages: &MessageSequence,
            _params: &Map<String, Value>,
        ) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(messages.last().map(|m| m.content.to_uppercase()).unwrap_or_default())
        }
    }

    fn seq(text: &str) -> MessageSequence {
        MessageSequence::new(None, text.to_string())
    }

    #[tokio::test]
    async fn test_cache_get_set() {
        let cache = CompletionCache::new();
        let params = Map::new();
        cache.set("m", &seq("hello"), &params, "hi there".into()).await;

        assert_eq!(cache.get("m", &seq("hello"), &params).await.unwrap(), "hi there");
        assert!(cache.get("m", &seq("other"), &params).await.is_none());
        assert!(cache.get("other-model", &seq("hello"), &params).await.is_none());
    }

    #[tokio::test]
    async fn test_params_are_part_of_key() {
        let cache = CompletionCache::new();
        let mut hot = Map::new();
        hot.insert("temperature".into(), Value::from(1));
        cache.set("m", &seq("p"), &Map::new(), "r".into()).await;
        assert!(cache.get("m", &seq("p"), &hot).await.is_none());
    }

    #[tokio::test]
    async fn test_cached_provider_skips_repeat_calls() {
        let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let cache = Arc::new(CompletionCache::new());
        let provider = CachedProvider::new(inner.clone(), cache.clone());
        let params = Map::new();

        let first = provider.complete("m", &seq("abc"), &params).await.unwrap();
        let second = provider.complete("m", &seq("abc"), &params).await.unwrap();

        assert_eq!(first, "ABC");
        assert_eq!(second, "ABC");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
