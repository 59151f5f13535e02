//! LinkedIn adapter (client-credentials OAuth, vanity-name lookup).
//!
//! LinkedIn's public API exposes profile fields but no public post stream to
//! app-only clients, so this adapter contributes profile and audience data
//! with an empty content list.

use footprint_core::{
    ActivityData, AppConfig, DataQuality, Platform, PlatformData, ProfileData,
};
use serde::Deserialize;

use crate::adapter::{strip_handle_prefix, PlatformAdapter};
use crate::analyze::{analyze, AnalysisInput};
use crate::error::AdapterError;
use crate::platforms::{build_http_client, read_json};
use crate::retry::with_single_retry;

const DEFAULT_BASE: &str = "https://api.linkedin.com";
const DEFAULT_AUTH_BASE: &str = "https://www.linkedin.com";

#[derive(Debug, Clone)]
struct LinkedinCredentials {
    client_id: String,
    client_secret: String,
}

pub struct LinkedinAdapter {
    client: reqwest::Client,
    credentials: Option<LinkedinCredentials>,
    auth_base: String,
    api_base: String,
    timeout_secs: u64,
    jitter_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedinProfile {
    localized_first_name: Option<String>,
    localized_last_name: Option<String>,
    localized_headline: Option<String>,
    vanity_name: Option<String>,
}

impl LinkedinAdapter {
    /// # Errors
    ///
    /// Returns [`AdapterError::Upstream`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, AdapterError> {
        Self::with_base_urls(config, DEFAULT_AUTH_BASE, DEFAULT_BASE)
    }

    /// # Errors
    ///
    /// Returns [`AdapterError::Upstream`] if the HTTP client cannot be built.
    pub fn with_base_urls(
        config: &AppConfig,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, AdapterError> {
        let creds = &config.credentials;
        let credentials = match (&creds.linkedin_client_id, &creds.linkedin_client_secret) {
            (Some(id), Some(secret)) => Some(LinkedinCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            client: build_http_client(config)?,
            credentials,
            auth_base: auth_base.trim_end_matches('/').to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
            timeout_secs: config.adapter_timeout_secs,
            jitter_base_ms: config.retry_jitter_base_ms,
        })
    }

    async fn fetch_token(&self, creds: &LinkedinCredentials) -> Result<String, AdapterError> {
        let response = self
            .client
            .post(format!("{}/oauth/v2/accessToken", self.auth_base))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;

        if response.status().as_u16() == 401 {
            return Err(AdapterError::Unauthorized);
        }
        let token: TokenResponse = read_json(response, "", "linkedin token exchange").await?;
        Ok(token.access_token)
    }

    async fn fetch_inner(
        &self,
        creds: &LinkedinCredentials,
        username: &str,
    ) -> Result<PlatformData, AdapterError> {
        let token = self.fetch_token(creds).await?;

        let url = format!(
            "{}/v2/people/(vanityName:{})",
            self.api_base, username
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(&e, self.timeout_secs))?;
        let profile: LinkedinProfile =
            read_json(response, username, "linkedin profile lookup").await?;

        Ok(Self::normalize(username, &profile))
    }

    fn normalize(username: &str, li: &LinkedinProfile) -> PlatformData {
        let display_name = match (&li.localized_first_name, &li.localized_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.clone()),
            (None, Some(last)) => Some(last.clone()),
            (None, None) => None,
        };

        let vanity = li.vanity_name.as_deref().unwrap_or(username);
        let profile = ProfileData {
            display_name,
            bio: li.localized_headline.clone().filter(|h| !h.is_empty()),
            followers: None,
            following: None,
            joined_at: None,
            profile_url: Some(format!("https://www.linkedin.com/in/{vanity}")),
            avatar_url: None,
            location: None,
        };

        let activity = ActivityData::default();
        let analysis = analyze(AnalysisInput {
            platform: Platform::Linkedin,
            profile: &profile,
            activity: &activity,
            content: &[],
            platform_metrics: serde_json::Map::new(),
            data_quality: DataQuality::Real,
        });

        PlatformData {
            platform: Platform::Linkedin,
            username: username.to_owned(),
            profile,
            activity,
            content: Vec::new(),
            analysis,
        }
    }
}

#[async_trait::async_trait]
impl PlatformAdapter for LinkedinAdapter {
    fn platform(&self) -> Platform {
        Platform::Linkedin
    }

    async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError> {
        let username = strip_handle_prefix(Platform::Linkedin, username);
        let Some(creds) = self.credentials.clone() else {
            return Err(AdapterError::NotConfigured);
        };

        with_single_retry(self.jitter_base_ms, || {
            self.fetch_inner(&creds, &username)
        })
        .await
    }
}
