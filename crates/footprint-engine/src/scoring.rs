//! Scoring & insight derivation over the successful subset of an
//! aggregation.
//!
//! All merged percentages are recomputed from raw item counts here; nothing
//! is averaged from the per-platform fractions, so rounding error never
//! compounds. Insight rules run in a fixed order and fire at most once each,
//! which keeps output deterministic for identical inputs.

use std::collections::BTreeMap;

use footprint_core::{PlatformData, Sentiment, Severity};

use crate::types::{ContentBreakdown, FootprintSummary, Insight, InsightType};

/// Aggregate exposure at or above this is called out as high risk.
const HIGH_EXPOSURE_THRESHOLD: f64 = 70.0;
/// Fraction of negative content at or above this counts as a skew.
const NEGATIVE_SKEW_THRESHOLD: f64 = 0.4;
/// Minimum platforms resolving the same username for the reuse signal.
const USERNAME_REUSE_MIN: usize = 3;
/// Latest-month activity at or above this multiple of the prior month
/// counts as a spike.
const ACTIVITY_SPIKE_FACTOR: f64 = 2.0;

/// Derive the summary block from successful platform results.
///
/// Zero platforms produce an all-zero summary; the caller is responsible for
/// attaching the no-data message.
#[must_use]
pub fn summarize(platform_data: &[PlatformData]) -> FootprintSummary {
    let content_breakdown = content_breakdown(platform_data);
    let exposure_score = weighted_exposure(platform_data);
    let top_insights = insights(platform_data, exposure_score);
    let recommendations = recommendations(platform_data, &top_insights);

    FootprintSummary {
        exposure_score,
        platforms_found: platform_data.len(),
        total_content_items: content_breakdown.total(),
        content_breakdown,
        top_insights,
        recommendations,
    }
}

/// Volume-weighted mean of per-platform exposure scores, clamped to
/// `[0, 100]`. A platform with no observed content still participates with
/// weight 1 so a profile-only result is not silently dropped.
fn weighted_exposure(platform_data: &[PlatformData]) -> f64 {
    if platform_data.is_empty() {
        return 0.0;
    }
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for data in platform_data {
        #[allow(clippy::cast_precision_loss)]
        let weight = (data.activity.total_items().max(1)) as f64;
        weighted_sum += data.analysis.exposure_score * weight;
        weight_total += weight;
    }
    (weighted_sum / weight_total).clamp(0.0, 100.0)
}

fn content_breakdown(platform_data: &[PlatformData]) -> ContentBreakdown {
    let mut breakdown = ContentBreakdown::default();
    for data in platform_data {
        breakdown.posts += data.activity.total_posts;
        breakdown.comments += data.activity.total_comments;
        breakdown.likes += data.activity.total_likes;
        breakdown.shares += data.activity.total_shares;
    }
    breakdown
}

/// Fraction of negative items across all platforms' observed content,
/// recomputed from raw counts.
#[allow(clippy::cast_precision_loss)]
fn negative_fraction(platform_data: &[PlatformData]) -> Option<f64> {
    let mut negative = 0u64;
    let mut total = 0u64;
    for data in platform_data {
        for item in &data.content {
            total += 1;
            if item.sentiment == Sentiment::Negative {
                negative += 1;
            }
        }
    }
    if total == 0 {
        return None;
    }
    Some(negative as f64 / total as f64)
}

/// Latest-vs-previous month counts from the merged activity timelines.
fn latest_month_change(platform_data: &[PlatformData]) -> Option<(u64, u64)> {
    let mut merged: BTreeMap<&str, u64> = BTreeMap::new();
    for data in platform_data {
        for bucket in &data.analysis.activity_timeline {
            *merged.entry(bucket.period.as_str()).or_default() += bucket.count;
        }
    }
    let mut months = merged.into_iter();
    let (mut previous, mut latest) = (None, months.next()?);
    for month in months {
        previous = Some(latest);
        latest = month;
    }
    previous.map(|p| (p.1, latest.1))
}

/// Evaluate the insight rules in fixed order, then rank by severity
/// (warnings first) and magnitude. The stable sort keeps rule order for
/// ties, so identical inputs always produce identical output.
fn insights(platform_data: &[PlatformData], exposure_score: f64) -> Vec<Insight> {
    let mut scored: Vec<(InsightType, f64, Insight)> = Vec::new();

    if exposure_score >= HIGH_EXPOSURE_THRESHOLD {
        scored.push((
            InsightType::Warning,
            exposure_score,
            Insight {
                insight_type: InsightType::Warning,
                title: "High overall exposure".to_owned(),
                description: format!(
                    "Your aggregate exposure score is {exposure_score:.0}/100; your public \
                     footprint is broadly discoverable."
                ),
            },
        ));
    }

    let high_concerns: Vec<&footprint_core::PrivacyConcern> = platform_data
        .iter()
        .flat_map(|d| &d.analysis.privacy_concerns)
        .filter(|c| c.severity == Severity::High)
        .collect();
    if !high_concerns.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let magnitude = high_concerns.len() as f64;
        scored.push((
            InsightType::Warning,
            magnitude,
            Insight {
                insight_type: InsightType::Warning,
                title: "High-severity privacy concern".to_owned(),
                description: high_concerns
                    .iter()
                    .map(|c| c.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            },
        ));
    }

    if platform_data.len() >= USERNAME_REUSE_MIN {
        #[allow(clippy::cast_precision_loss)]
        let magnitude = platform_data.len() as f64;
        scored.push((
            InsightType::Warning,
            magnitude,
            Insight {
                insight_type: InsightType::Warning,
                title: "Username reused across platforms".to_owned(),
                description: format!(
                    "The same username resolves on {} platforms, making your accounts easy \
                     to cross-reference.",
                    platform_data.len()
                ),
            },
        ));
    }

    if let Some(negative) = negative_fraction(platform_data) {
        if negative >= NEGATIVE_SKEW_THRESHOLD {
            scored.push((
                InsightType::Warning,
                negative,
                Insight {
                    insight_type: InsightType::Warning,
                    title: "Negative sentiment skew".to_owned(),
                    description: format!(
                        "{:.0}% of your public content reads as negative.",
                        negative * 100.0
                    ),
                },
            ));
        }
    }

    if let Some((previous, latest)) = latest_month_change(platform_data) {
        #[allow(clippy::cast_precision_loss)]
        let spiked = previous > 0 && latest as f64 >= previous as f64 * ACTIVITY_SPIKE_FACTOR;
        if spiked {
            #[allow(clippy::cast_precision_loss)]
            let magnitude = latest as f64 / previous.max(1) as f64;
            scored.push((
                InsightType::Info,
                magnitude,
                Insight {
                    insight_type: InsightType::Info,
                    title: "Activity spike".to_owned(),
                    description: format!(
                        "Public activity jumped from {previous} to {latest} items \
                         month-over-month."
                    ),
                },
            ));
        }
    }

    scored.sort_by(|a, b| {
        let severity = |t: InsightType| u8::from(t == InsightType::Warning);
        severity(b.0)
            .cmp(&severity(a.0))
            .then_with(|| b.1.total_cmp(&a.1))
    });
    scored.into_iter().map(|(_, _, insight)| insight).collect()
}

/// Ordered, deduplicated recommendations from the fired rules plus the
/// privacy-concern categories present in the data.
fn recommendations(platform_data: &[PlatformData], insights: &[Insight]) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();
    let mut push = |rec: &str| {
        if !recs.iter().any(|r| r == rec) {
            recs.push(rec.to_owned());
        }
    };

    for insight in insights {
        match insight.title.as_str() {
            "High overall exposure" => {
                push("Review the visibility settings on your most active platforms.");
            }
            "Username reused across platforms" => {
                push("Use distinct usernames on different platforms to make cross-referencing harder.");
            }
            "Negative sentiment skew" => {
                push("Audit recent posts with a negative tone and remove content you would not want surfaced.");
            }
            "Activity spike" => {
                push("Recent activity sharply increased; check for automated cross-posting.");
            }
            _ => {}
        }
    }

    for data in platform_data {
        for concern in &data.analysis.privacy_concerns {
            match concern.category.as_str() {
                "contact-info" => {
                    push("Remove email addresses and phone numbers from public bios.");
                }
                "location-disclosure" => {
                    push("Remove precise location details from public profiles.");
                }
                "audience-reach" => {
                    push("Consider tighter audience controls on high-reach accounts.");
                }
                "activity-pattern" => {
                    push("Vary posting times so your daily routine is harder to infer.");
                }
                _ => {}
            }
        }
    }

    recs
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use footprint_core::{
        ActivityData, AnalysisResults, ContentItem, ContentType, DataQuality, Platform,
        PrivacyConcern, ProfileData, SentimentBreakdown, TimelineBucket,
    };

    use super::*;

    fn platform_result(platform: Platform, exposure: f64, posts: u64) -> PlatformData {
        PlatformData {
            platform,
            username: "sample".to_owned(),
            profile: ProfileData::default(),
            activity: ActivityData {
                total_posts: posts,
                ..ActivityData::default()
            },
            content: Vec::new(),
            analysis: AnalysisResults {
                exposure_score: exposure,
                topic_distribution: Vec::new(),
                activity_timeline: Vec::new(),
                sentiment_breakdown: SentimentBreakdown::default(),
                privacy_concerns: Vec::new(),
                platform_metrics: serde_json::Map::new(),
                data_quality: DataQuality::Real,
            },
        }
    }

    fn negative_item() -> ContentItem {
        ContentItem {
            content_type: ContentType::Post,
            posted_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap(),
            engagement: 0,
            sentiment: Sentiment::Negative,
            topics: Vec::new(),
            text_preview: None,
        }
    }

    #[test]
    fn empty_input_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert!((summary.exposure_score - 0.0).abs() < f64::EPSILON);
        assert_eq!(summary.platforms_found, 0);
        assert_eq!(summary.total_content_items, 0);
        assert!(summary.top_insights.is_empty());
        assert!(summary.recommendations.is_empty());
    }

    #[test]
    fn single_platform_keeps_its_score() {
        let summary = summarize(&[platform_result(Platform::Instagram, 40.0, 10)]);
        assert!((summary.exposure_score - 40.0).abs() < 1e-9);
        assert_eq!(summary.platforms_found, 1);
    }

    #[test]
    fn aggregate_score_weights_by_volume() {
        let summary = summarize(&[
            platform_result(Platform::Instagram, 90.0, 30),
            platform_result(Platform::Twitter, 30.0, 10),
        ]);
        // (90*30 + 30*10) / 40 = 75
        assert!((summary.exposure_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn breakdown_sums_all_content_types() {
        let mut a = platform_result(Platform::Reddit, 10.0, 3);
        a.activity.total_comments = 5;
        a.activity.total_likes = 2;
        let mut b = platform_result(Platform::Twitter, 10.0, 4);
        b.activity.total_shares = 1;
        let summary = summarize(&[a, b]);
        assert_eq!(summary.content_breakdown.posts, 7);
        assert_eq!(summary.content_breakdown.comments, 5);
        assert_eq!(summary.content_breakdown.likes, 2);
        assert_eq!(summary.content_breakdown.shares, 1);
        assert_eq!(summary.total_content_items, 15);
    }

    #[test]
    fn high_exposure_fires_exactly_one_warning() {
        let summary = summarize(&[platform_result(Platform::Instagram, 85.0, 10)]);
        let high: Vec<&Insight> = summary
            .top_insights
            .iter()
            .filter(|i| i.title == "High overall exposure")
            .collect();
        assert_eq!(high.len(), 1, "rule must fire at most once");
        assert_eq!(high[0].insight_type, InsightType::Warning);
    }

    #[test]
    fn username_reuse_needs_three_platforms() {
        let two = summarize(&[
            platform_result(Platform::Instagram, 10.0, 1),
            platform_result(Platform::Twitter, 10.0, 1),
        ]);
        assert!(!two
            .top_insights
            .iter()
            .any(|i| i.title == "Username reused across platforms"));

        let three = summarize(&[
            platform_result(Platform::Instagram, 10.0, 1),
            platform_result(Platform::Twitter, 10.0, 1),
            platform_result(Platform::Reddit, 10.0, 1),
        ]);
        assert!(three
            .top_insights
            .iter()
            .any(|i| i.title == "Username reused across platforms"));
    }

    #[test]
    fn high_severity_concern_drives_insight_and_recommendation() {
        let mut data = platform_result(Platform::Twitter, 20.0, 2);
        data.analysis.privacy_concerns.push(PrivacyConcern {
            category: "contact-info".to_owned(),
            severity: Severity::High,
            description: "twitter bio exposes an email address".to_owned(),
        });
        let summary = summarize(&[data]);
        assert!(summary
            .top_insights
            .iter()
            .any(|i| i.title == "High-severity privacy concern"));
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("email addresses")));
    }

    #[test]
    fn negative_skew_computed_from_raw_counts() {
        let mut data = platform_result(Platform::Reddit, 20.0, 5);
        data.content = vec![negative_item(), negative_item(), negative_item()];
        // Stale per-platform fraction must be ignored in favor of raw counts.
        data.analysis.sentiment_breakdown = SentimentBreakdown {
            positive: 1.0,
            neutral: 0.0,
            negative: 0.0,
        };
        let summary = summarize(&[data]);
        assert!(summary
            .top_insights
            .iter()
            .any(|i| i.title == "Negative sentiment skew"));
    }

    #[test]
    fn activity_spike_is_info_and_needs_doubling() {
        let mut data = platform_result(Platform::Instagram, 20.0, 5);
        data.analysis.activity_timeline = vec![
            TimelineBucket {
                period: "2026-04".to_owned(),
                count: 4,
            },
            TimelineBucket {
                period: "2026-05".to_owned(),
                count: 9,
            },
        ];
        let summary = summarize(&[data]);
        let spike = summary
            .top_insights
            .iter()
            .find(|i| i.title == "Activity spike")
            .expect("spike insight should fire");
        assert_eq!(spike.insight_type, InsightType::Info);
    }

    #[test]
    fn warnings_rank_before_infos() {
        let mut data = platform_result(Platform::Instagram, 85.0, 5);
        data.analysis.activity_timeline = vec![
            TimelineBucket {
                period: "2026-04".to_owned(),
                count: 2,
            },
            TimelineBucket {
                period: "2026-05".to_owned(),
                count: 8,
            },
        ];
        let summary = summarize(&[data]);
        assert!(summary.top_insights.len() >= 2);
        assert_eq!(summary.top_insights[0].insight_type, InsightType::Warning);
        assert_eq!(
            summary
                .top_insights
                .last()
                .expect("non-empty")
                .insight_type,
            InsightType::Info
        );
    }

    #[test]
    fn recommendations_are_deduplicated() {
        let mut a = platform_result(Platform::Twitter, 20.0, 2);
        a.analysis.privacy_concerns.push(PrivacyConcern {
            category: "location-disclosure".to_owned(),
            severity: Severity::Medium,
            description: "twitter profile publishes a location".to_owned(),
        });
        let mut b = platform_result(Platform::Instagram, 20.0, 2);
        b.analysis.privacy_concerns.push(PrivacyConcern {
            category: "location-disclosure".to_owned(),
            severity: Severity::Medium,
            description: "instagram profile publishes a location".to_owned(),
        });
        let summary = summarize(&[a, b]);
        let location_recs = summary
            .recommendations
            .iter()
            .filter(|r| r.contains("location details"))
            .count();
        assert_eq!(location_recs, 1);
    }
}
