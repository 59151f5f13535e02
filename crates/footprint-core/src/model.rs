//! Canonical data model produced by platform adapters and consumed by the
//! aggregation engine. Values are built once by an adapter and never mutated
//! afterwards; the engine merges them into new values instead of patching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Platform;

/// One platform's normalized result for one username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformData {
    pub platform: Platform,
    pub username: String,
    pub profile: ProfileData,
    pub activity: ActivityData,
    /// Content items ordered newest-first.
    pub content: Vec<ContentItem>,
    pub analysis: AnalysisResults,
}

/// Public profile fields. Everything is optional: platforms expose different
/// subsets, and merge code must apply explicit defaults before arithmetic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub joined_at: Option<DateTime<Utc>>,
    pub profile_url: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

/// Activity totals and cadence for one platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_likes: u64,
    pub total_shares: u64,
    pub posts_per_week: f64,
    pub last_active_at: Option<DateTime<Utc>>,
    pub top_hashtags: Vec<String>,
    pub top_communities: Vec<String>,
}

impl ActivityData {
    /// Sum of all content-type totals.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_posts + self.total_comments + self.total_likes + self.total_shares
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Comment,
    Like,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// A single normalized content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub content_type: ContentType,
    pub posted_at: DateTime<Utc>,
    /// Combined engagement count (likes + replies + shares on the item).
    pub engagement: u64,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub text_preview: Option<String>,
}

/// Severity of a privacy concern, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyConcern {
    pub category: String,
    pub severity: Severity,
    pub description: String,
}

/// Whether the analysis was computed from observed upstream data or had to
/// estimate missing values. Estimated results are tagged, never passed off
/// as real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Real,
    Estimated,
}

/// A ranked topic with its share of the platform's content, in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicWeight {
    pub topic: String,
    pub weight: f64,
}

/// Content count for one calendar-month period (`"YYYY-MM"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBucket {
    pub period: String,
    pub count: u64,
}

/// Fractions of content by sentiment. Sums to 1.0 (± rounding) whenever any
/// content exists; all zero otherwise.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentBreakdown {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }
}

/// Per-platform derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    /// Public-visibility risk in `[0, 100]`.
    pub exposure_score: f64,
    /// Ranked by weight, descending. Weights sum to 1.0 (± rounding) when
    /// non-empty.
    pub topic_distribution: Vec<TopicWeight>,
    /// Month buckets in chronological order.
    pub activity_timeline: Vec<TimelineBucket>,
    pub sentiment_breakdown: SentimentBreakdown,
    pub privacy_concerns: Vec<PrivacyConcern>,
    /// Platform-specific metric bag (e.g. `karma`, `mediaCount`).
    pub platform_metrics: serde_json::Map<String, serde_json::Value>,
    pub data_quality: DataQuality,
}
