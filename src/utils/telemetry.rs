//! Logging Setup
//!
//! Installs the global `tracing` subscriber for the binary. `RUST_LOG` overrides
//! the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const DEFAULT_FILTER: &str = "llm_frames=info";

pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "llm_frames=debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
