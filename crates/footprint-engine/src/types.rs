use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use footprint_adapters::AdapterError;
use footprint_core::{Platform, PlatformData};
use serde::Serialize;

/// One outcome per requested platform. Keyed by the ordered platform enum,
/// so iteration — and therefore serialization — always follows canonical
/// order regardless of completion order.
pub type AggregationResult = BTreeMap<Platform, Result<PlatformData, AdapterError>>;

/// Fan-out limits for one aggregation request.
#[derive(Debug, Clone, Copy)]
pub struct AggregationOptions {
    /// Independent timeout ceiling applied to every adapter call.
    pub adapter_timeout: Duration,
    /// Overall deadline; when it elapses, still-pending platforms are
    /// reported as timed out while finished results are kept.
    pub request_deadline: Duration,
    /// Cap on concurrently running adapter fetches.
    pub max_concurrent: usize,
}

impl AggregationOptions {
    #[must_use]
    pub fn from_config(config: &footprint_core::AppConfig) -> Self {
        Self {
            adapter_timeout: Duration::from_secs(config.adapter_timeout_secs),
            request_deadline: Duration::from_secs(config.request_deadline_secs),
            max_concurrent: config.max_concurrent_fetches,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Info,
    Warning,
}

/// A derived, human-readable observation about the merged data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
}

/// Content-type totals summed across successful platforms.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBreakdown {
    pub posts: u64,
    pub comments: u64,
    pub likes: u64,
    pub shares: u64,
}

impl ContentBreakdown {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.posts + self.comments + self.likes + self.shares
    }
}

/// The derived `summary` block of a response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintSummary {
    /// Volume-weighted aggregate exposure in `[0, 100]`.
    pub exposure_score: f64,
    pub platforms_found: usize,
    pub total_content_items: u64,
    pub content_breakdown: ContentBreakdown,
    /// Ranked severity-first, then magnitude; at most one entry per rule.
    pub top_insights: Vec<Insight>,
    pub recommendations: Vec<String>,
}

/// The full response contract for one search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalFootprintResponse {
    pub username: String,
    pub timestamp: DateTime<Utc>,
    /// Requested platforms in canonical order.
    pub platforms: Vec<Platform>,
    /// Successful results in canonical platform order.
    pub platform_data: Vec<PlatformData>,
    pub summary: FootprintSummary,
    /// Human-readable message per failed platform.
    pub platform_errors: BTreeMap<Platform, String>,
    /// Set only when no platform produced data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data_message: Option<String>,
}
