//! Instagram adapter (Graph API business-discovery lookup).

use footprint_core::{
    ActivityData, AppConfig, ContentItem, ContentType, DataQuality, Platform, PlatformData,
    ProfileData,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::adapter::{strip_handle_prefix, PlatformAdapter};
use crate::analyze::{analyze, extract_hashtags, posts_per_week, tag_topics, top_counted, AnalysisInput};
use crate::error::AdapterError;
use crate::platforms::{build_http_client, parse_graph_time, read_graph_json};
use crate::retry::with_single_retry;
use crate::sentiment::classify_sentiment;

const DEFAULT_BASE: &str = "https://graph.facebook.com/v19.0";

pub struct InstagramAdapter {
    client: reqwest::Client,
    access_token: Option<String>,
    base_url: String,
    timeout_secs: u64,
    fetch_limit: u32,
    jitter_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct DiscoveryEnvelope {
    business_discovery: Option<IgProfile>,
}

#[derive(Debug, Deserialize)]
struct IgProfile {
    name: Option<String>,
    biography: Option<String>,
    website: Option<String>,
    followers_count: Option<u64>,
    follows_count: Option<u64>,
    media_count: Option<u64>,
    profile_picture_url: Option<String>,
    media: Option<IgMediaList>,
}

#[derive(Debug, Deserialize)]
struct IgMediaList {
    data: Vec<IgMedia>,
}

#[derive(Debug, Deserialize)]
struct IgMedia {
    caption: Option<String>,
    like_count: Option<u64>,
    comments_count: Option<u64>,
    timestamp: Option<String>,
}

impl InstagramAdapter {
    /// # Errors
    ///
    /// Returns [`AdapterError::Upstream`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AdapterError> {
        Self::with_base_url(config, DEFAULT_BASE)
    }

    /// # Errors
    ///
    /// Returns [`AdapterError::Upstream`] if the HTTP client cannot be built.
    pub fn with_base_url(config: &AppConfig, base_url: &str) -> Result<Self, AdapterError> {
        Ok(Self {
            client: build_http_client(config)?,
            access_token: config.credentials.instagram_access_token.clone(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_secs: config.adapter_timeout_secs,
            fetch_limit: config.content_fetch_limit,
            jitter_base_ms: config.retry_jitter_base_ms,
        })
    }

    async fn fetch_inner(&self, token: &str, username: &str) -> Result<PlatformData, AdapterError> {
        let fields = format!(
            "business_discovery.username({username}){{name,biography,website,followers_count,follows_count,media_count,profile_picture_url,media.limit({}){{caption,like_count,comments_count,timestamp}}}}",
            self.fetch_limit
        );
        let url = format!(
            "{}/me?fields={}&access_token={}",
            self.base_url,
            utf8_percent_encode(&fields, NON_ALPHANUMERIC),
            token
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let envelope: DiscoveryEnvelope =
            read_graph_json(response, username, "instagram business discovery").await?;

        let Some(profile) = envelope.business_discovery else {
            return Err(AdapterError::NotFound {
                username: username.to_owned(),
            });
        };

        Ok(Self::normalize(username, profile))
    }

    fn normalize(username: &str, ig: IgProfile) -> PlatformData {
        let media = ig.media.map(|m| m.data).unwrap_or_default();

        let mut content: Vec<ContentItem> = Vec::new();
        let mut hashtags: Vec<String> = Vec::new();
        for item in &media {
            let caption = item.caption.clone().unwrap_or_default();
            hashtags.extend(extract_hashtags(&caption));
            content.push(ContentItem {
                content_type: ContentType::Post,
                posted_at: item
                    .timestamp
                    .as_deref()
                    .and_then(parse_graph_time)
                    .unwrap_or(chrono::DateTime::UNIX_EPOCH),
                engagement: item.like_count.unwrap_or(0) + item.comments_count.unwrap_or(0),
                sentiment: classify_sentiment(&caption),
                topics: tag_topics(&caption),
                text_preview: Some(caption.chars().take(140).collect::<String>())
                    .filter(|c| !c.is_empty()),
            });
        }
        content.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

        let profile = ProfileData {
            display_name: ig.name.clone(),
            bio: ig.biography.clone().filter(|b| !b.is_empty()),
            followers: ig.followers_count,
            following: ig.follows_count,
            joined_at: None,
            profile_url: ig
                .website
                .clone()
                .or_else(|| Some(format!("https://www.instagram.com/{username}"))),
            avatar_url: ig.profile_picture_url.clone(),
            location: None,
        };

        // The account-level media count can exceed the fetched window; totals
        // report the upstream number, so the window-derived cadence is an
        // estimate in that case.
        let total_posts = ig.media_count.unwrap_or(media.len() as u64);
        let estimated = total_posts > media.len() as u64;

        let activity = ActivityData {
            total_posts,
            total_comments: 0,
            total_likes: 0,
            total_shares: 0,
            posts_per_week: posts_per_week(&content),
            last_active_at: content.first().map(|c| c.posted_at),
            top_hashtags: top_counted(hashtags, 5),
            top_communities: Vec::new(),
        };

        let mut platform_metrics = serde_json::Map::new();
        if let Some(v) = ig.media_count {
            platform_metrics.insert("mediaCount".to_owned(), v.into());
        }

        let analysis = analyze(AnalysisInput {
            platform: Platform::Instagram,
            profile: &profile,
            activity: &activity,
            content: &content,
            platform_metrics,
            data_quality: if estimated {
                DataQuality::Estimated
            } else {
                DataQuality::Real
            },
        });

        PlatformData {
            platform: Platform::Instagram,
            username: username.to_owned(),
            profile,
            activity,
            content,
            analysis,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError> {
        let username = strip_handle_prefix(Platform::Instagram, username);
        let Some(token) = self.access_token.clone() else {
            return Err(AdapterError::NotConfigured);
        };

        with_single_retry(self.jitter_base_ms, || {
            self.fetch_inner(&token, &username)
        })
        .await
    }
}
