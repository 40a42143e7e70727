//! Frame Extender
//!
//! Applies semantic operations across every record of a dataset: synchronously
//! through a completion provider, or offline as a batch request file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::record::Dataset;
use crate::config::{FrameConfig, MAX_BATCH_REQUESTS};
use crate::error::{FrameError, FrameResult};
use crate::operation::SemanticOperation;
use crate::provider::CompletionProvider;
use crate::tokenizer::{ApproxTokenCounter, TokenCounter};

/// Token statistics over one operation's input column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total: usize,
    pub average: f64,
    pub max: usize,
    pub min: usize,
}

/// A dataset bound to a completion provider and a token counter
pub struct LlmFrame {
    dataset: Dataset,
    provider: Arc<dyn CompletionProvider>,
    tokens: Arc<dyn TokenCounter>,
    config: FrameConfig,
}

impl LlmFrame {
    pub fn new(dataset: Dataset, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            dataset,
            provider,
            tokens: Arc::new(ApproxTokenCounter::default()),
            config: FrameConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_token_counter(mut self, tokens: Arc<dyn TokenCounter>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Apply `operations` in order, writing each result into its output column.
    ///
    /// Operations run one after another so a later operation may read an earlier
    /// one's output. Within an operation up to `concurrency` calls are in flight,
    /// but results are written in record order.
    ///
    /// The first failing record aborts the whole call. Records written before the
    /// failure (earlier operations, and earlier records of the failing one) keep
    /// their new values; nothing is rolled back.
    #[tracing::instrument(skip(self, operations), fields(records = self.dataset.len(), operations = operations.len()))]
    pub async fn extend(&mut self, operations: &[SemanticOperation]) -> FrameResult<()> {
        for operation in operations {
            self.apply_operation(operation).await?;
        }
        info!("Extended {} records with {} operation(s)", self.dataset.len(), operations.len());
        Ok(())
    }

    /// The operation's model, or the configured default when unset or empty
    fn resolve_model<'a>(&'a self, operation: &'a SemanticOperation) -> &'a str {
        operation
            .model_name()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.config.default_model)
    }

    async fn apply_operation(&mut self, operation: &SemanticOperation) -> FrameResult<()> {
        operation.check_model_params()?;

        let model = self.resolve_model(operation).to_string();
        let input = operation.input_column();
        let output = operation.output_column();
        info!("Applying operation {} -> {} with model {}", input, output, model);

        // Rendering failures stay in place so records before them are still completed
        let requests: Vec<_> = self
            .dataset
            .iter()
            .map(|record| record.text(input).map(|context| operation.render_messages(&context)))
            .collect();

        let provider = self.provider.clone();
        let params = operation.model_params();
        let model = model.as_str();
        let provider = provider.as_ref();

        let mut completions = stream::iter(requests.into_iter().enumerate())
            .map(|(idx, request)| async move {
                let messages = request?;
                debug!("Requesting completion for record {}", idx);
                provider
                    .complete(model, &messages, params)
                    .await
                    .map(|text| (idx, text))
                    .map_err(|source| FrameError::Completion { record: idx, source })
            })
            .buffered(self.config.concurrency.max(1));

        while let Some(result) = completions.next().await {
            let (idx, text) = result?;
            self.dataset.records_mut()[idx].set(output, text);
        }
        Ok(())
    }

    /// Write one batch request per record to `destination` as newline-delimited JSON.
    ///
    /// Makes no API calls. Every entry is rendered before the file is opened, so
    /// an unreadable record never leaves a partial file. Returns the line count.
    #[tracing::instrument(skip(self, destination, operation), fields(records = self.dataset.len()))]
    pub fn emit_batch_file(
        &self,
        destination: impl AsRef<Path>,
        operation: &SemanticOperation,
        id_column: &str,
    ) -> FrameResult<usize> {
        let lines = self.render_batch_lines(operation, id_column)?;

        let path = destination.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_lines(&mut writer, &lines)?;

        info!("Batch file created: {} ({} requests)", path.display(), lines.len());
        Ok(lines.len())
    }

    /// Same as [`emit_batch_file`](Self::emit_batch_file) over any writer.
    pub fn write_batch<W: Write>(
        &self,
        mut writer: W,
        operation: &SemanticOperation,
        id_column: &str,
    ) -> FrameResult<usize> {
        let lines = self.render_batch_lines(operation, id_column)?;
        write_lines(&mut writer, &lines)?;
        Ok(lines.len())
    }

    fn render_batch_lines(&self, operation: &SemanticOperation, id_column: &str) -> FrameResult<Vec<String>> {
        if self.dataset.len() >= MAX_BATCH_REQUESTS {
            return Err(FrameError::BatchSizeExceeded {
                records: self.dataset.len(),
                limit: MAX_BATCH_REQUESTS,
            });
        }

        self.dataset
            .iter()
            .map(|record| {
                let context = record.text(operation.input_column())?;
                let custom_id = record.text(id_column)?;
                operation.render_batch_entry(&context, &custom_id)?.to_json_line()
            })
            .collect()
    }

    /// Token statistics over the raw input-column text of every record.
    ///
    /// Counting is keyed by the operation's model, or the configured default.
    pub fn estimate_token_usage(&self, operation: &SemanticOperation) -> FrameResult<TokenUsage> {
        if self.dataset.is_empty() {
            return Err(FrameError::EmptyDataset);
        }

        let model = self.resolve_model(operation);
        let counts = self
            .dataset
            .iter()
            .map(|record| {
                let text = record.text(operation.input_column())?;
                self.tokens.count_tokens(&text, model)
            })
            .collect::<FrameResult<Vec<usize>>>()?;

        let total: usize = counts.iter().sum();
        let usage = TokenUsage {
            total,
            average: total as f64 / counts.len() as f64,
            max: counts.iter().copied().max().unwrap_or(0),
            min: counts.iter().copied().min().unwrap_or(0),
        };
        debug!("Token usage for {} with {}: {:?}", operation.input_column(), model, usage);
        Ok(usage)
    }
}

fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> FrameResult<()> {
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
