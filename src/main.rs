//! LLM Frames CLI
//!
//! Extend a JSON-lines dataset with LLM-generated columns, emit an offline
//! batch request file, or estimate token usage for a set of operations.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use llm_frames::provider::{CachedProvider, CompletionCache};
use llm_frames::utils::init_logging;
use llm_frames::{
    ApproxTokenCounter, CompletionProvider, Dataset, FrameConfig, LlmFrame, OpenAICompatibleProvider,
    OperationsFile, ProviderConfig, SemanticOperation, TokenCounter, TokenizerRegistry,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every operation synchronously and write the extended dataset
    Extend {
        /// Dataset (.json array or JSON lines)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// Operations file (.yaml or .json)
        #[arg(long, value_name = "FILE")]
        operations: PathBuf,
        /// Output JSON lines (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Model for operations without model_name
        #[arg(long, value_name = "MODEL")]
        default_model: Option<String>,
        /// Maximum in-flight requests per operation
        #[arg(short, long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Write a batch request file for one operation without calling the API
    Batch {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        #[arg(long, value_name = "FILE")]
        operations: PathBuf,
        /// Column whose value becomes each request's custom_id
        #[arg(long, value_name = "COLUMN")]
        id_column: String,
        /// Destination batch file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        /// Which operation in the file to render
        #[arg(long, default_value_t = 0)]
        operation_index: usize,
    },
    /// Print token usage statistics for each operation's input column
    Estimate {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        #[arg(long, value_name = "FILE")]
        operations: PathBuf,
        /// Exact tokenizer table as MODEL=PATH to tokenizer.json (repeatable)
        #[arg(long, value_name = "MODEL=PATH")]
        tokenizer: Vec<String>,
        #[arg(long, value_name = "MODEL")]
        default_model: Option<String>,
    },
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Dataset::from_json_array(&text)?
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Dataset::from_json_lines(BufReader::new(file))?
    };
    info!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

fn load_operations(path: &Path) -> Result<Vec<SemanticOperation>> {
    let operations = OperationsFile::load(path)
        .with_context(|| format!("Failed to load operations from {}", path.display()))?
        .into_operations()?;
    if operations.is_empty() {
        bail!("{} defines no operations", path.display());
    }
    Ok(operations)
}

fn frame_config(default_model: Option<String>, concurrency: usize) -> FrameConfig {
    let config = FrameConfig::default().with_concurrency(concurrency);
    match default_model {
        Some(model) => config.with_default_model(model),
        None => config,
    }
}

fn token_counter(pairs: &[String]) -> Result<Arc<dyn TokenCounter>> {
    if pairs.is_empty() {
        return Ok(Arc::new(ApproxTokenCounter::default()));
    }
    let mut registry = TokenizerRegistry::new();
    for pair in pairs {
        let (model, path) = pair
            .split_once('=')
            .with_context(|| format!("Expected MODEL=PATH, got '{}'", pair))?;
        registry.register_file(model, path)?;
    }
    Ok(Arc::new(registry))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let provider_config = ProviderConfig::from_env();
    let provider: Arc<dyn CompletionProvider> = Arc::new(CachedProvider::new(
        Arc::new(OpenAICompatibleProvider::from_config(&provider_config)),
        Arc::new(CompletionCache::new()),
    ));

    match cli.command {
        Commands::Extend { input, operations, output, default_model, concurrency } => {
            let dataset = load_dataset(&input)?;
            let operations = load_operations(&operations)?;
            let mut frame = LlmFrame::new(dataset, provider)
                .with_config(frame_config(default_model, concurrency));

            frame.extend(&operations).await?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    frame.dataset().write_json_lines(io::BufWriter::new(file))?;
                    info!("Wrote extended dataset to {}", path.display());
                }
                None => frame.dataset().write_json_lines(io::stdout().lock())?,
            }
        }
        Commands::Batch { input, operations, id_column, output, operation_index } => {
            let dataset = load_dataset(&input)?;
            let operations = load_operations(&operations)?;
            let operation = operations.get(operation_index).with_context(|| {
                format!("Operation index {} out of range ({} defined)", operation_index, operations.len())
            })?;
            let frame = LlmFrame::new(dataset, provider);

            let written = frame.emit_batch_file(&output, operation, &id_column)?;
            println!("Batch file created: {} ({} requests)", output.display(), written);
        }
        Commands::Estimate { input, operations, tokenizer, default_model } => {
            let dataset = load_dataset(&input)?;
            let operations = load_operations(&operations)?;
            let frame = LlmFrame::new(dataset, provider)
                .with_config(frame_config(default_model, 1))
                .with_token_counter(token_counter(&tokenizer)?);

            for operation in &operations {
                let usage = frame.estimate_token_usage(operation)?;
                println!(
                    "{}",
                    serde_json::json!({
                        "input_column": operation.input_column(),
                        "output_column": operation.output_column(),
                        "total_tokens": usage.total,
                        "average_tokens": usage.average,
                        "max_tokens": usage.max,
                        "min_tokens": usage.min,
                    })
                );
            }
        }
    }

    Ok(())
}
