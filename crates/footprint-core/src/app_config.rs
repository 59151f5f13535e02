use std::net::SocketAddr;

/// Per-platform credential material read once at process start.
///
/// Every field is optional: a missing credential means the platform reports
/// `configured: false`, it never fails startup.
#[derive(Clone, Default)]
pub struct PlatformCredentials {
    pub instagram_access_token: Option<String>,
    pub facebook_access_token: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub linkedin_client_id: Option<String>,
    pub linkedin_client_secret: Option<String>,
}

impl std::fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("PlatformCredentials")
            .field(
                "instagram_access_token",
                &redact(&self.instagram_access_token),
            )
            .field("facebook_access_token", &redact(&self.facebook_access_token))
            .field("reddit_client_id", &redact(&self.reddit_client_id))
            .field("reddit_client_secret", &redact(&self.reddit_client_secret))
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("twitter_bearer_token", &redact(&self.twitter_bearer_token))
            .field("linkedin_client_id", &redact(&self.linkedin_client_id))
            .field(
                "linkedin_client_secret",
                &redact(&self.linkedin_client_secret),
            )
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Fixed timeout ceiling applied independently to every adapter call.
    pub adapter_timeout_secs: u64,
    /// Overall deadline for one aggregation request.
    pub request_deadline_secs: u64,
    /// Cap on concurrently running adapter fetches.
    pub max_concurrent_fetches: usize,
    pub retry_jitter_base_ms: u64,
    pub outbound_user_agent: String,
    /// Maximum content items an adapter requests from its upstream.
    pub content_fetch_limit: u32,
    pub credentials: PlatformCredentials,
}
