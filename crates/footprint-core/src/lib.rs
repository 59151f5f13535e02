//! Core types for the footprint engine: the platform enum, the canonical
//! data model shared by adapters and the aggregation engine, and application
//! configuration loaded from the environment.

mod app_config;
mod config;
mod model;
mod platform;

pub use app_config::{AppConfig, PlatformCredentials};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use model::{
    ActivityData, AnalysisResults, ContentItem, ContentType, DataQuality, PlatformData,
    PrivacyConcern, ProfileData, Sentiment, SentimentBreakdown, Severity, TimelineBucket,
    TopicWeight,
};
pub use platform::{Platform, ParsePlatformError};
