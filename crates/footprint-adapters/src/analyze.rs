//! Shared per-platform analysis: topic tagging, timeline bucketing,
//! sentiment breakdown, exposure scoring, and privacy-concern rules.
//!
//! Every adapter funnels its normalized profile/activity/content through
//! [`analyze`] so the derived metrics are computed the same way everywhere.
//! All fractions are computed from raw counts here; nothing is re-averaged
//! from already-rounded percentages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use footprint_core::{
    ActivityData, AnalysisResults, ContentItem, DataQuality, Platform, PrivacyConcern,
    ProfileData, Sentiment, Severity, TimelineBucket, TopicWeight,
};
use regex::Regex;

/// Keyword lists for topic tagging. First match wins per keyword; a text can
/// still carry several topics.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "technology",
        &["tech", "software", "code", "coding", "programming", "ai", "startup", "app"],
    ),
    (
        "gaming",
        &["game", "gaming", "gamer", "playstation", "xbox", "nintendo", "steam"],
    ),
    (
        "politics",
        &["politics", "election", "policy", "government", "senate", "congress", "vote"],
    ),
    (
        "sports",
        &["sports", "football", "soccer", "basketball", "baseball", "tennis", "match"],
    ),
    (
        "music",
        &["music", "album", "concert", "band", "song", "playlist", "vinyl"],
    ),
    (
        "travel",
        &["travel", "trip", "vacation", "flight", "hotel", "wanderlust"],
    ),
    (
        "food",
        &["food", "recipe", "cooking", "restaurant", "dinner", "coffee"],
    ),
    (
        "finance",
        &["finance", "invest", "investing", "stocks", "crypto", "bitcoin", "market"],
    ),
    (
        "health",
        &["health", "fitness", "workout", "running", "yoga", "wellness"],
    ),
    (
        "photography",
        &["photo", "photography", "camera", "portrait", "landscape"],
    ),
];

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("valid regex")
});

/// Inputs to [`analyze`]. Content is the adapter's normalized item list;
/// `platform_metrics` is the platform-specific bag passed through verbatim.
pub struct AnalysisInput<'a> {
    pub platform: Platform,
    pub profile: &'a ProfileData,
    pub activity: &'a ActivityData,
    pub content: &'a [ContentItem],
    pub platform_metrics: serde_json::Map<String, serde_json::Value>,
    pub data_quality: DataQuality,
}

/// Derive [`AnalysisResults`] from normalized platform data.
#[must_use]
pub fn analyze(input: AnalysisInput<'_>) -> AnalysisResults {
    AnalysisResults {
        exposure_score: exposure_score(input.profile, input.activity, input.content),
        topic_distribution: topic_distribution(input.content),
        activity_timeline: activity_timeline(input.content),
        sentiment_breakdown: sentiment_breakdown(input.content),
        privacy_concerns: privacy_concerns(input.platform, input.profile, input.activity),
        platform_metrics: input.platform_metrics,
        data_quality: input.data_quality,
    }
}

/// Tag a text (plus any explicit hashtags) with known topics.
///
/// Hashtag words participate in keyword matching; unmatched hashtags are not
/// invented into topics.
#[must_use]
pub(crate) fn tag_topics(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut topics: Vec<String> = Vec::new();
    for (topic, keywords) in TOPIC_KEYWORDS {
        if words.iter().any(|w| keywords.contains(w)) && !topics.iter().any(|t| t == topic) {
            topics.push((*topic).to_owned());
        }
    }
    topics
}

/// Extract `#hashtags` from a text, lowercased, in order of appearance.
#[must_use]
pub(crate) fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .collect()
}

/// Ranked topic shares across all content items, weights summing to 1.0
/// (± floating point) whenever any item carries a topic.
#[allow(clippy::cast_precision_loss)]
fn topic_distribution(content: &[ContentItem]) -> Vec<TopicWeight> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for item in content {
        for topic in &item.topics {
            *counts.entry(topic.as_str()).or_default() += 1;
        }
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<TopicWeight> = counts
        .into_iter()
        .map(|(topic, count)| TopicWeight {
            topic: topic.to_owned(),
            weight: count as f64 / total as f64,
        })
        .collect();
    // Descending by weight; BTreeMap iteration already fixed the tie order.
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    ranked
}

/// Calendar-month buckets (`"YYYY-MM"`), chronological.
fn activity_timeline(content: &[ContentItem]) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for item in content {
        let period = item.posted_at.format("%Y-%m").to_string();
        *buckets.entry(period).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(period, count)| TimelineBucket { period, count })
        .collect()
}

/// Sentiment fractions from raw item counts.
#[allow(clippy::cast_precision_loss)]
fn sentiment_breakdown(content: &[ContentItem]) -> footprint_core::SentimentBreakdown {
    if content.is_empty() {
        return footprint_core::SentimentBreakdown::default();
    }
    let mut positive = 0u64;
    let mut neutral = 0u64;
    let mut negative = 0u64;
    for item in content {
        match item.sentiment {
            Sentiment::Positive => positive += 1,
            Sentiment::Neutral => neutral += 1,
            Sentiment::Negative => negative += 1,
        }
    }
    let total = content.len() as f64;
    footprint_core::SentimentBreakdown {
        positive: positive as f64 / total,
        neutral: neutral as f64 / total,
        negative: negative as f64 / total,
    }
}

/// Public-visibility risk in `[0, 100]`.
///
/// Weighted components: audience reach (35), profile completeness (20),
/// content volume (25), posting cadence (10), average engagement (10).
/// Reach uses a log scale so the score does not saturate on mid-size
/// accounts.
fn exposure_score(profile: &ProfileData, activity: &ActivityData, content: &[ContentItem]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let followers = profile.followers.unwrap_or(0) as f64;
    let reach = ((followers + 1.0).log10() / 6.0).min(1.0) * 35.0;

    let filled = [
        profile.display_name.is_some(),
        profile.bio.is_some(),
        profile.followers.is_some(),
        profile.following.is_some(),
        profile.joined_at.is_some(),
        profile.profile_url.is_some(),
        profile.avatar_url.is_some(),
        profile.location.is_some(),
    ]
    .iter()
    .filter(|&&f| f)
    .count();
    #[allow(clippy::cast_precision_loss)]
    let completeness = filled as f64 / 8.0 * 20.0;

    #[allow(clippy::cast_precision_loss)]
    let volume = (activity.total_items() as f64 / 200.0).min(1.0) * 25.0;

    let cadence = (activity.posts_per_week / 14.0).min(1.0) * 10.0;

    let engagement = if content.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let avg = content.iter().map(|c| c.engagement).sum::<u64>() as f64 / content.len() as f64;
        (avg / 500.0).min(1.0) * 10.0
    };

    (reach + completeness + volume + cadence + engagement).clamp(0.0, 100.0)
}

/// Fixed-order privacy-concern rules over the normalized profile/activity.
fn privacy_concerns(
    platform: Platform,
    profile: &ProfileData,
    activity: &ActivityData,
) -> Vec<PrivacyConcern> {
    let mut concerns = Vec::new();

    if let Some(bio) = &profile.bio {
        if EMAIL_RE.is_match(bio) {
            concerns.push(PrivacyConcern {
                category: "contact-info".to_owned(),
                severity: Severity::High,
                description: format!("{platform} bio exposes an email address"),
            });
        }
        if PHONE_RE.is_match(bio) {
            concerns.push(PrivacyConcern {
                category: "contact-info".to_owned(),
                severity: Severity::High,
                description: format!("{platform} bio exposes a phone number"),
            });
        }
    }

    if profile.location.is_some() {
        concerns.push(PrivacyConcern {
            category: "location-disclosure".to_owned(),
            severity: Severity::Medium,
            description: format!("{platform} profile publishes a location"),
        });
    }

    if profile.followers.unwrap_or(0) >= 10_000 {
        concerns.push(PrivacyConcern {
            category: "audience-reach".to_owned(),
            severity: Severity::Medium,
            description: format!("large public audience on {platform}"),
        });
    }

    if activity.posts_per_week >= 20.0 {
        concerns.push(PrivacyConcern {
            category: "activity-pattern".to_owned(),
            severity: Severity::Low,
            description: format!("high posting cadence on {platform} makes routines inferable"),
        });
    }

    concerns
}

/// Posting cadence from observed content timestamps: items per week across
/// the observed window, or `0.0` with fewer than two items.
#[must_use]
pub(crate) fn posts_per_week(content: &[ContentItem]) -> f64 {
    if content.len() < 2 {
        #[allow(clippy::cast_precision_loss)]
        return content.len() as f64;
    }
    let newest = content.iter().map(|c| c.posted_at).max();
    let oldest = content.iter().map(|c| c.posted_at).min();
    let (Some(newest), Some(oldest)) = (newest, oldest) else {
        return 0.0;
    };
    let span_days = (newest - oldest).num_days().max(1);
    #[allow(clippy::cast_precision_loss)]
    let weeks = (span_days as f64 / 7.0).max(1.0 / 7.0);
    #[allow(clippy::cast_precision_loss)]
    let items = content.len() as f64;
    items / weeks
}

/// Most frequent values first, capped at `limit`, ties broken
/// alphabetically.
#[must_use]
pub(crate) fn top_counted(values: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(v, _)| v).collect()
}
