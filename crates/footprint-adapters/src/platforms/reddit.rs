//! Reddit adapter (client-credentials OAuth).
//!
//! Exchanges the app's client id/secret for a bearer token, then reads the
//! user's `about` document plus recent submissions and comments.

use footprint_core::{
    ActivityData, AppConfig, ContentItem, ContentType, DataQuality, Platform, PlatformData,
    ProfileData,
};
use serde::Deserialize;

use crate::adapter::{strip_handle_prefix, PlatformAdapter};
use crate::analyze::{analyze, posts_per_week, tag_topics, top_counted, AnalysisInput};
use crate::error::AdapterError;
use crate::platforms::{build_http_client, from_unix_secs, read_json};
use crate::retry::with_single_retry;
use crate::sentiment::classify_sentiment;

const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone)]
struct RedditCredentials {
    client_id: String,
    client_secret: String,
    user_agent: String,
}

pub struct RedditAdapter {
    client: reqwest::Client,
    credentials: Option<RedditCredentials>,
    auth_base: String,
    api_base: String,
    timeout_secs: u64,
    fetch_limit: u32,
    jitter_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AboutResponse {
    data: AboutData,
}

#[derive(Debug, Deserialize)]
struct AboutData {
    name: String,
    icon_img: Option<String>,
    created_utc: Option<f64>,
    total_karma: Option<i64>,
    link_karma: Option<i64>,
    comment_karma: Option<i64>,
    subreddit: Option<AboutSubreddit>,
}

#[derive(Debug, Deserialize)]
struct AboutSubreddit {
    public_description: Option<String>,
    subscribers: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: ThingData,
}

#[derive(Debug, Deserialize)]
struct ThingData {
    title: Option<String>,
    selftext: Option<String>,
    body: Option<String>,
    subreddit: Option<String>,
    score: Option<i64>,
    num_comments: Option<u64>,
    created_utc: Option<f64>,
}

impl RedditAdapter {
    /// # Errors
    ///
    /// Returns [`AdapterError::Upstream`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AdapterError> {
        Self::with_base_urls(config, DEFAULT_AUTH_BASE, DEFAULT_API_BASE)
    }

    /// Point both the token and API endpoints at a custom base, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Upstream`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        config: &AppConfig,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, AdapterError> {
        let creds = &config.credentials;
        let credentials = match (
            &creds.reddit_client_id,
            &creds.reddit_client_secret,
            &creds.reddit_user_agent,
        ) {
            (Some(id), Some(secret), Some(ua)) => Some(RedditCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
                user_agent: ua.clone(),
            }),
            _ => None,
        };

        let client = build_http_client(config)?;

        Ok(Self {
            client,
            credentials,
            auth_base: auth_base.trim_end_matches('/').to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
            timeout_secs: config.adapter_timeout_secs,
            fetch_limit: config.content_fetch_limit,
            jitter_base_ms: config.retry_jitter_base_ms,
        })
    }

    async fn fetch_token(&self, creds: &RedditCredentials) -> Result<String, AdapterError> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base))
            .header("User-Agent", &creds.user_agent)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;

        if response.status().as_u16() == 401 {
            return Err(AdapterError::Unauthorized);
        }
        let token: TokenResponse = read_json(response, "", "reddit token exchange").await?;
        Ok(token.access_token)
    }

    async fn get_listing(
        &self,
        token: &str,
        user_agent: &str,
        username: &str,
        kind: &str,
    ) -> Result<Listing, AdapterError> {
        let url = format!(
            "{}/user/{}/{}?limit={}&raw_json=1",
            self.api_base, username, kind, self.fetch_limit
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("User-Agent", user_agent)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        read_json(response, username, &format!("reddit {kind} listing")).await
    }

    async fn fetch_inner(
        &self,
        creds: &RedditCredentials,
        username: &str,
    ) -> Result<PlatformData, AdapterError> {
        let token = self.fetch_token(creds).await?;

        let about_url = format!("{}/user/{}/about?raw_json=1", self.api_base, username);
        let response = self
            .client
            .get(about_url)
            .bearer_auth(&token)
            .header("User-Agent", &creds.user_agent)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let about: AboutResponse = read_json(response, username, "reddit about").await?;

        let submitted = self
            .get_listing(&token, &creds.user_agent, username, "submitted")
            .await?;
        let comments = self
            .get_listing(&token, &creds.user_agent, username, "comments")
            .await?;

        Ok(Self::normalize(username, about.data, submitted, comments))
    }

    fn normalize(
        username: &str,
        about: AboutData,
        submitted: Listing,
        comments: Listing,
    ) -> PlatformData {
        let truncated = submitted.data.after.is_some() || comments.data.after.is_some();

        let mut content: Vec<ContentItem> = Vec::new();
        let mut communities: Vec<String> = Vec::new();

        for thing in &submitted.data.children {
            let d = &thing.data;
            let text = [d.title.as_deref(), d.selftext.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(sub) = &d.subreddit {
                communities.push(sub.clone());
            }
            content.push(Self::to_item(ContentType::Post, d, &text));
        }
        for thing in &comments.data.children {
            let d = &thing.data;
            let text = d.body.clone().unwrap_or_default();
            if let Some(sub) = &d.subreddit {
                communities.push(sub.clone());
            }
            content.push(Self::to_item(ContentType::Comment, d, &text));
        }
        content.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

        let profile = ProfileData {
            display_name: Some(about.name.clone()),
            bio: about
                .subreddit
                .as_ref()
                .and_then(|s| s.public_description.clone())
                .filter(|d| !d.is_empty()),
            followers: about.subreddit.as_ref().and_then(|s| s.subscribers),
            following: None,
            joined_at: about.created_utc.and_then(from_unix_secs),
            profile_url: Some(format!("https://www.reddit.com/user/{username}")),
            avatar_url: about.icon_img.filter(|u| !u.is_empty()),
            location: None,
        };

        #[allow(clippy::cast_possible_truncation)]
        let activity = ActivityData {
            total_posts: submitted.data.children.len() as u64,
            total_comments: comments.data.children.len() as u64,
            total_likes: 0,
            total_shares: 0,
            posts_per_week: posts_per_week(&content),
            last_active_at: content.first().map(|c| c.posted_at),
            top_hashtags: Vec::new(),
            top_communities: top_counted(communities, 5),
        };

        let mut metrics = serde_json::Map::new();
        if let Some(karma) = about.total_karma {
            metrics.insert("totalKarma".to_owned(), karma.into());
        }
        if let Some(karma) = about.link_karma {
            metrics.insert("linkKarma".to_owned(), karma.into());
        }
        if let Some(karma) = about.comment_karma {
            metrics.insert("commentKarma".to_owned(), karma.into());
        }

        let analysis = analyze(AnalysisInput {
            platform: Platform::Reddit,
            profile: &profile,
            activity: &activity,
            content: &content,
            platform_metrics: metrics,
            data_quality: if truncated {
                DataQuality::Estimated
            } else {
                DataQuality::Real
            },
        });

        PlatformData {
            platform: Platform::Reddit,
            username: username.to_owned(),
            profile,
            activity,
            content,
            analysis,
        }
    }

    fn to_item(content_type: ContentType, d: &ThingData, text: &str) -> ContentItem {
        #[allow(clippy::cast_sign_loss)]
        let engagement = d.score.unwrap_or(0).max(0) as u64 + d.num_comments.unwrap_or(0);
        ContentItem {
            content_type,
            posted_at: d
                .created_utc
                .and_then(from_unix_secs)
                .unwrap_or(chrono::DateTime::UNIX_EPOCH),
            engagement,
            sentiment: classify_sentiment(text),
            topics: tag_topics(text),
            text_preview: Some(text.chars().take(140).collect()).filter(|t: &String| !t.is_empty()),
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for RedditAdapter {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError> {
        let username = strip_handle_prefix(Platform::Reddit, username);
        let Some(creds) = self.credentials.clone() else {
            return Err(AdapterError::NotConfigured);
        };

        with_single_retry(self.jitter_base_ms, || {
            self.fetch_inner(&creds, &username)
        })
        .await
    }
}
