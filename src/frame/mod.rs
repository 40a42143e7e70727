//! Frame Module
//!
//! Ordered tabular records and the extender that applies semantic operations to them.

mod extender;
mod record;

pub use extender::{LlmFrame, TokenUsage};
pub use record::{Dataset, Record};
