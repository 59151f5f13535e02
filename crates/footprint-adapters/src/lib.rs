//! Platform adapters: one client per social platform, each translating that
//! platform's public API responses into the canonical [`footprint_core::PlatformData`]
//! shape, plus the credential registry and the shared analysis helpers the
//! adapters use to derive per-platform metrics.

mod adapter;
mod analyze;
mod error;
mod platforms;
mod registry;
mod retry;
mod sentiment;

pub use adapter::{strip_handle_prefix, PlatformAdapter};
pub use analyze::{analyze, AnalysisInput};
pub use error::AdapterError;
pub use platforms::{
    FacebookAdapter, InstagramAdapter, LinkedinAdapter, RedditAdapter, TwitterAdapter,
};
pub use registry::{AdapterSet, CredentialRegistry, PlatformStatus};
pub use sentiment::{classify_sentiment, lexicon_score};
