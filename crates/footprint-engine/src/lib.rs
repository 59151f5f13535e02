//! Aggregation engine: fans one search request out to the platform
//! adapters, isolates their failures, and merges the survivors into the
//! response contract with derived cross-platform metrics.

mod compile;
mod orchestrator;
mod scoring;
mod types;

pub use compile::compile_response;
pub use orchestrator::{aggregate, EngineError};
pub use scoring::summarize;
pub use types::{
    AggregationOptions, AggregationResult, ContentBreakdown, DigitalFootprintResponse,
    FootprintSummary, Insight, InsightType,
};
