//! Twitter/X adapter (app-only bearer token, v2 endpoints).

use chrono::{DateTime, Utc};
use footprint_core::{
    ActivityData, AppConfig, ContentItem, ContentType, DataQuality, Platform, PlatformData,
    ProfileData,
};
use serde::Deserialize;

use crate::adapter::{strip_handle_prefix, PlatformAdapter};
use crate::analyze::{analyze, extract_hashtags, posts_per_week, tag_topics, top_counted, AnalysisInput};
use crate::error::AdapterError;
use crate::platforms::{build_http_client, read_json};
use crate::retry::with_single_retry;
use crate::sentiment::classify_sentiment;

const DEFAULT_BASE: &str = "https://api.twitter.com";

pub struct TwitterAdapter {
    client: reqwest::Client,
    bearer_token: Option<String>,
    base_url: String,
    timeout_secs: u64,
    fetch_limit: u32,
    jitter_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    data: Option<TwitterUser>,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    id: String,
    name: Option<String>,
    description: Option<String>,
    location: Option<String>,
    url: Option<String>,
    profile_image_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    public_metrics: Option<UserMetrics>,
}

#[derive(Debug, Deserialize)]
struct UserMetrics {
    followers_count: Option<u64>,
    following_count: Option<u64>,
    tweet_count: Option<u64>,
    listed_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TweetsEnvelope {
    data: Option<Vec<Tweet>>,
    meta: Option<TweetsMeta>,
}

#[derive(Debug, Deserialize)]
struct TweetsMeta {
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: String,
    created_at: Option<DateTime<Utc>>,
    public_metrics: Option<TweetMetrics>,
    referenced_tweets: Option<Vec<ReferencedTweet>>,
}

#[derive(Debug, Default, Deserialize)]
struct TweetMetrics {
    retweet_count: Option<u64>,
    reply_count: Option<u64>,
    like_count: Option<u64>,
    quote_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReferencedTweet {
    #[serde(rename = "type")]
    kind: String,
}

impl TwitterAdapter {
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
            bearer_token: config.credentials.twitter_bearer_token.clone(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_secs: config.adapter_timeout_secs,
            fetch_limit: config.content_fetch_limit,
            jitter_base_ms: config.retry_jitter_base_ms,
        })
    }

    async fn fetch_inner(
        &self,
        token: &str,
        username: &str,
    ) -> Result<PlatformData, AdapterError> {
        let user_url = format!(
            "{}/2/users/by/username/{}?user.fields=created_at,description,location,profile_image_url,public_metrics,url",
            self.base_url, username
        );
        let response = self
            .client
            .get(user_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let envelope: UserEnvelope = read_json(response, username, "twitter user lookup").await?;

        // The v2 lookup answers 200 with no `data` for unknown handles.
        let Some(user) = envelope.data else {
            return Err(AdapterError::NotFound {
                username: username.to_owned(),
            });
        };

        let max_results = self.fetch_limit.clamp(5, 100);
        let tweets_url = format!(
            "{}/2/users/{}/tweets?max_results={}&tweet.fields=created_at,public_metrics,referenced_tweets",
            self.base_url, user.id, max_results
        );
        let response = self
            .client
            .get(tweets_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let tweets: TweetsEnvelope = read_json(response, username, "twitter timeline").await?;

        Ok(Self::normalize(username, user, tweets))
    }

    fn normalize(username: &str, user: TwitterUser, tweets: TweetsEnvelope) -> PlatformData {
        let truncated = tweets
            .meta
            .as_ref()
            .is_some_and(|m| m.next_token.is_some());

        let mut content: Vec<ContentItem> = Vec::new();
        let mut hashtags: Vec<String> = Vec::new();

        for tweet in tweets.data.unwrap_or_default() {
            let metrics = tweet.public_metrics.unwrap_or_default();
            let engagement = metrics.retweet_count.unwrap_or(0)
                + metrics.reply_count.unwrap_or(0)
                + metrics.like_count.unwrap_or(0)
                + metrics.quote_count.unwrap_or(0);

            let content_type = match tweet.referenced_tweets.as_deref() {
                Some(refs) if refs.iter().any(|r| r.kind == "retweeted") => ContentType::Share,
                Some(refs) if refs.iter().any(|r| r.kind == "replied_to") => ContentType::Comment,
                _ => ContentType::Post,
            };

            hashtags.extend(extract_hashtags(&tweet.text));
            content.push(ContentItem {
                content_type,
                posted_at: tweet.created_at.unwrap_or(DateTime::UNIX_EPOCH),
                engagement,
                sentiment: classify_sentiment(&tweet.text),
                topics: tag_topics(&tweet.text),
                text_preview: Some(tweet.text.chars().take(140).collect()),
            });
        }
        content.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

        let metrics = user.public_metrics.as_ref();
        let profile = ProfileData {
            display_name: user.name.clone(),
            bio: user.description.clone().filter(|d| !d.is_empty()),
            followers: metrics.and_then(|m| m.followers_count),
            following: metrics.and_then(|m| m.following_count),
            joined_at: user.created_at,
            profile_url: user
                .url
                .clone()
                .or_else(|| Some(format!("https://x.com/{username}"))),
            avatar_url: user.profile_image_url.clone(),
            location: user.location.clone().filter(|l| !l.is_empty()),
        };

        let count_of = |t: ContentType| content.iter().filter(|c| c.content_type == t).count() as u64;
        let activity = ActivityData {
            total_posts: count_of(ContentType::Post),
            total_comments: count_of(ContentType::Comment),
            total_likes: 0,
            total_shares: count_of(ContentType::Share),
            posts_per_week: posts_per_week(&content),
            last_active_at: content.first().map(|c| c.posted_at),
            top_hashtags: top_counted(hashtags, 5),
            top_communities: Vec::new(),
        };

        let mut platform_metrics = serde_json::Map::new();
        if let Some(m) = metrics {
            if let Some(v) = m.tweet_count {
                platform_metrics.insert("tweetCount".to_owned(), v.into());
            }
            if let Some(v) = m.listed_count {
                platform_metrics.insert("listedCount".to_owned(), v.into());
            }
        }

        let analysis = analyze(AnalysisInput {
            platform: Platform::Twitter,
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
            platform: Platform::Twitter,
            username: username.to_owned(),
            profile,
            activity,
            content,
            analysis,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for TwitterAdapter {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError> {
        let username = strip_handle_prefix(Platform::Twitter, username);
        let Some(token) = self.bearer_token.clone() else {
            return Err(AdapterError::NotConfigured);
        };

        with_single_retry(self.jitter_base_ms, || {
            self.fetch_inner(&token, &username)
        })
        .await
    }
}
