//! Facebook adapter (Graph API page/profile lookup).

use footprint_core::{
    ActivityData, AppConfig, ContentItem, ContentType, DataQuality, Platform, PlatformData,
    ProfileData,
};
use serde::Deserialize;

use crate::adapter::{strip_handle_prefix, PlatformAdapter};
use crate::analyze::{analyze, extract_hashtags, posts_per_week, tag_topics, top_counted, AnalysisInput};
use crate::error::AdapterError;
use crate::platforms::{build_http_client, parse_graph_time, read_graph_json};
use crate::retry::with_single_retry;
use crate::sentiment::classify_sentiment;

const DEFAULT_BASE: &str = "https://graph.facebook.com/v19.0";

pub struct FacebookAdapter {
    client: reqwest::Client,
    access_token: Option<String>,
    base_url: String,
    timeout_secs: u64,
    fetch_limit: u32,
    jitter_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct FbPage {
    id: String,
    name: Option<String>,
    about: Option<String>,
    fan_count: Option<u64>,
    link: Option<String>,
    location: Option<FbLocation>,
    picture: Option<FbPicture>,
}

#[derive(Debug, Deserialize)]
struct FbLocation {
    city: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FbPicture {
    data: Option<FbPictureData>,
}

#[derive(Debug, Deserialize)]
struct FbPictureData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FbPosts {
    data: Vec<FbPost>,
    paging: Option<FbPaging>,
}

#[derive(Debug, Deserialize)]
struct FbPaging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FbPost {
    message: Option<String>,
    created_time: Option<String>,
    shares: Option<FbShares>,
    reactions: Option<FbSummaryField>,
    comments: Option<FbSummaryField>,
}

#[derive(Debug, Deserialize)]
struct FbShares {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FbSummaryField {
    summary: Option<FbSummary>,
}

#[derive(Debug, Deserialize)]
struct FbSummary {
    total_count: Option<u64>,
}

impl FacebookAdapter {
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
            access_token: config.credentials.facebook_access_token.clone(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_secs: config.adapter_timeout_secs,
            fetch_limit: config.content_fetch_limit,
            jitter_base_ms: config.retry_jitter_base_ms,
        })
    }

    async fn fetch_inner(&self, token: &str, username: &str) -> Result<PlatformData, AdapterError> {
        let page_url = format!(
            "{}/{}?fields=id,name,about,fan_count,link,location{{city,country}},picture{{data{{url}}}}&access_token={}",
            self.base_url, username, token
        );
        let response = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let page: FbPage = read_graph_json(response, username, "facebook page lookup").await?;

        let posts_url = format!(
            "{}/{}/posts?fields=message,created_time,shares,reactions.summary(true),comments.summary(true)&limit={}&access_token={}",
            self.base_url, page.id, self.fetch_limit, token
        );
        let response = self
            .client
            .get(posts_url)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let posts: FbPosts = read_graph_json(response, username, "facebook posts").await?;

        Ok(Self::normalize(username, page, posts))
    }

    fn normalize(username: &str, page: FbPage, posts: FbPosts) -> PlatformData {
        let truncated = posts.paging.as_ref().is_some_and(|p| p.next.is_some());

        let mut content: Vec<ContentItem> = Vec::new();
        let mut hashtags: Vec<String> = Vec::new();
        let mut share_total = 0u64;

        for post in &posts.data {
            let message = post.message.clone().unwrap_or_default();
            let reactions = summary_count(post.reactions.as_ref());
            let comments = summary_count(post.comments.as_ref());
            let shares = post.shares.as_ref().and_then(|s| s.count).unwrap_or(0);
            share_total += shares;

            hashtags.extend(extract_hashtags(&message));
            content.push(ContentItem {
                content_type: ContentType::Post,
                posted_at: post
                    .created_time
                    .as_deref()
                    .and_then(parse_graph_time)
                    .unwrap_or(chrono::DateTime::UNIX_EPOCH),
                engagement: reactions + comments + shares,
                sentiment: classify_sentiment(&message),
                topics: tag_topics(&message),
                text_preview: Some(message.chars().take(140).collect::<String>())
                    .filter(|m| !m.is_empty()),
            });
        }
        content.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

        let location = page.location.as_ref().map(|l| {
            [l.city.as_deref(), l.country.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        });

        let profile = ProfileData {
            display_name: page.name.clone(),
            bio: page.about.clone().filter(|a| !a.is_empty()),
            followers: page.fan_count,
            following: None,
            joined_at: None,
            profile_url: page
                .link
                .clone()
                .or_else(|| Some(format!("https://www.facebook.com/{username}"))),
            avatar_url: page
                .picture
                .as_ref()
                .and_then(|p| p.data.as_ref())
                .and_then(|d| d.url.clone()),
            location: location.filter(|l| !l.is_empty()),
        };

        let activity = ActivityData {
            total_posts: content.len() as u64,
            total_comments: 0,
            total_likes: 0,
            total_shares: share_total,
            posts_per_week: posts_per_week(&content),
            last_active_at: content.first().map(|c| c.posted_at),
            top_hashtags: top_counted(hashtags, 5),
            top_communities: Vec::new(),
        };

        let mut platform_metrics = serde_json::Map::new();
        if let Some(fans) = page.fan_count {
            platform_metrics.insert("fanCount".to_owned(), fans.into());
        }

        let analysis = analyze(AnalysisInput {
            platform: Platform::Facebook,
            profile: &profile,
            activity: &activity,
            content: &content,
            platform_metrics,
            data_quality: if truncated {
                DataQuality::Estimated
            } else {
                DataQuality::Real
            },
        });

        PlatformData {
            platform: Platform::Facebook,
            username: username.to_owned(),
            profile,
            activity,
            content,
            analysis,
        }
    }
}

fn summary_count(field: Option<&FbSummaryField>) -> u64 {
    field
        .and_then(|f| f.summary.as_ref())
        .and_then(|s| s.total_count)
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl PlatformAdapter for FacebookAdapter {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError> {
        let username = strip_handle_prefix(Platform::Facebook, username);
        let Some(token) = self.access_token.clone() else {
            return Err(AdapterError::NotConfigured);
        };

        with_single_retry(self.jitter_base_ms, || {
            self.fetch_inner(&token, &username)
        })
        .await
    }
}
