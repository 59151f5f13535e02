//! Credential/status registry and the closed adapter map.
//!
//! Both are built once at startup from [`AppConfig`] and are read-only for
//! the life of the process. Status checks are pure — no network I/O.

use std::collections::BTreeMap;
use std::sync::Arc;

use footprint_core::{AppConfig, Platform};
use serde::Serialize;

use crate::adapter::PlatformAdapter;
use crate::platforms::{
    FacebookAdapter, InstagramAdapter, LinkedinAdapter, RedditAdapter, TwitterAdapter,
};

/// Whether a platform's adapter has the secrets it needs, and why not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    pub configured: bool,
    pub message: String,
}

impl PlatformStatus {
    fn ready() -> Self {
        Self {
            configured: true,
            message: "ready".to_owned(),
        }
    }

    fn missing(vars: &[&str]) -> Self {
        Self {
            configured: false,
            message: format!("missing {}", vars.join(", ")),
        }
    }
}

/// Per-platform configuration state, computed once from the environment.
///
/// The orchestrator consults this to prune the fan-out set before any
/// network I/O; the status endpoint exposes it unchanged.
#[derive(Debug, Clone)]
pub struct CredentialRegistry {
    statuses: BTreeMap<Platform, PlatformStatus>,
}

impl CredentialRegistry {
    /// Build the registry from loaded configuration. Absent credentials mean
    /// `configured: false`; they never fail startup.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let creds = &config.credentials;
        let mut statuses = BTreeMap::new();

        statuses.insert(
            Platform::Instagram,
            if creds.instagram_access_token.is_some() {
                PlatformStatus::ready()
            } else {
                PlatformStatus::missing(&["INSTAGRAM_ACCESS_TOKEN"])
            },
        );

        statuses.insert(
            Platform::Facebook,
            if creds.facebook_access_token.is_some() {
                PlatformStatus::ready()
            } else {
                PlatformStatus::missing(&["FACEBOOK_ACCESS_TOKEN"])
            },
        );

        let mut reddit_missing = Vec::new();
        if creds.reddit_client_id.is_none() {
            reddit_missing.push("REDDIT_CLIENT_ID");
        }
        if creds.reddit_client_secret.is_none() {
            reddit_missing.push("REDDIT_CLIENT_SECRET");
        }
        if creds.reddit_user_agent.is_none() {
            reddit_missing.push("REDDIT_USER_AGENT");
        }
        statuses.insert(
            Platform::Reddit,
            if reddit_missing.is_empty() {
                PlatformStatus::ready()
            } else {
                PlatformStatus::missing(&reddit_missing)
            },
        );

        statuses.insert(
            Platform::Twitter,
            if creds.twitter_bearer_token.is_some() {
                PlatformStatus::ready()
            } else {
                PlatformStatus::missing(&["TWITTER_BEARER_TOKEN"])
            },
        );

        let mut linkedin_missing = Vec::new();
        if creds.linkedin_client_id.is_none() {
            linkedin_missing.push("LINKEDIN_CLIENT_ID");
        }
        if creds.linkedin_client_secret.is_none() {
            linkedin_missing.push("LINKEDIN_CLIENT_SECRET");
        }
        statuses.insert(
            Platform::Linkedin,
            if linkedin_missing.is_empty() {
                PlatformStatus::ready()
            } else {
                PlatformStatus::missing(&linkedin_missing)
            },
        );

        Self { statuses }
    }

    /// Build a registry directly from statuses. Intended for tests and for
    /// embedding the engine outside the server binary.
    #[must_use]
    pub fn new(statuses: BTreeMap<Platform, PlatformStatus>) -> Self {
        Self { statuses }
    }

    /// Registry where exactly `configured` platforms are ready.
    #[must_use]
    pub fn with_configured(configured: &[Platform]) -> Self {
        let statuses = Platform::ALL
            .into_iter()
            .map(|p| {
                let status = if configured.contains(&p) {
                    PlatformStatus::ready()
                } else {
                    PlatformStatus {
                        configured: false,
                        message: "missing credentials".to_owned(),
                    }
                };
                (p, status)
            })
            .collect();
        Self { statuses }
    }

    #[must_use]
    pub fn status(&self, platform: Platform) -> &PlatformStatus {
        &self.statuses[&platform]
    }

    #[must_use]
    pub fn is_configured(&self, platform: Platform) -> bool {
        self.statuses
            .get(&platform)
            .is_some_and(|s| s.configured)
    }

    /// Configured platforms in canonical order. This is what `"all"`
    /// expands to.
    #[must_use]
    pub fn configured_platforms(&self) -> Vec<Platform> {
        self.statuses
            .iter()
            .filter(|(_, s)| s.configured)
            .map(|(p, _)| *p)
            .collect()
    }

    /// Full status map in canonical order, for the status endpoint.
    #[must_use]
    pub fn statuses(&self) -> &BTreeMap<Platform, PlatformStatus> {
        &self.statuses
    }
}

/// The closed set of adapters, one per platform, registered once at startup.
#[derive(Clone)]
pub struct AdapterSet {
    adapters: BTreeMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl AdapterSet {
    /// Construct every platform adapter from configuration.
    ///
    /// Adapters are built whether or not their credentials are present; an
    /// unconfigured adapter answers `NotConfigured` if it is ever invoked
    /// directly, though the orchestrator short-circuits that case without a
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AdapterError::Upstream`] if an outbound HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, crate::AdapterError> {
        let mut adapters: BTreeMap<Platform, Arc<dyn PlatformAdapter>> = BTreeMap::new();
        adapters.insert(
            Platform::Instagram,
            Arc::new(InstagramAdapter::new(config)?),
        );
        adapters.insert(Platform::Facebook, Arc::new(FacebookAdapter::new(config)?));
        adapters.insert(Platform::Reddit, Arc::new(RedditAdapter::new(config)?));
        adapters.insert(Platform::Twitter, Arc::new(TwitterAdapter::new(config)?));
        adapters.insert(Platform::Linkedin, Arc::new(LinkedinAdapter::new(config)?));
        Ok(Self { adapters })
    }

    /// Build a set from explicit adapters. Intended for tests.
    #[must_use]
    pub fn new(adapters: BTreeMap<Platform, Arc<dyn PlatformAdapter>>) -> Self {
        Self { adapters }
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformAdapter>> {
        self.adapters.get(&platform).cloned()
    }
}

#[cfg(test)]
mod tests {
    use footprint_core::PlatformCredentials;

    use super::*;

    fn config_with(credentials: PlatformCredentials) -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_owned(),
            adapter_timeout_secs: 5,
            request_deadline_secs: 10,
            max_concurrent_fetches: 4,
            retry_jitter_base_ms: 0,
            outbound_user_agent: "footprint-test/0.1".to_owned(),
            content_fetch_limit: 25,
            credentials,
        }
    }

    #[test]
    fn unconfigured_platform_reports_missing_vars() {
        let registry = CredentialRegistry::from_config(&config_with(PlatformCredentials::default()));
        let status = registry.status(Platform::Reddit);
        assert!(!status.configured);
        assert!(status.message.contains("REDDIT_CLIENT_ID"));
        assert!(status.message.contains("REDDIT_CLIENT_SECRET"));
        assert!(registry.configured_platforms().is_empty());
    }

    #[test]
    fn fully_credentialed_reddit_is_ready() {
        let creds = PlatformCredentials {
            reddit_client_id: Some("id".to_owned()),
            reddit_client_secret: Some("secret".to_owned()),
            reddit_user_agent: Some("ua".to_owned()),
            ..PlatformCredentials::default()
        };
        let registry = CredentialRegistry::from_config(&config_with(creds));
        assert!(registry.is_configured(Platform::Reddit));
        assert_eq!(registry.status(Platform::Reddit).message, "ready");
        assert_eq!(registry.configured_platforms(), vec![Platform::Reddit]);
    }

    #[test]
    fn configured_platforms_preserve_canonical_order() {
        let registry =
            CredentialRegistry::with_configured(&[Platform::Twitter, Platform::Instagram]);
        assert_eq!(
            registry.configured_platforms(),
            vec![Platform::Instagram, Platform::Twitter]
        );
    }

    #[test]
    fn adapter_set_covers_every_platform() {
        let set = AdapterSet::from_config(&config_with(PlatformCredentials::default()))
            .expect("adapter set builds");
        for platform in Platform::ALL {
            let adapter = set.get(platform).expect("adapter registered");
            assert_eq!(adapter.platform(), platform);
        }
    }

    #[test]
    fn platform_status_serializes_camel_case() {
        let status = PlatformStatus::missing(&["TWITTER_BEARER_TOKEN"]);
        let json = serde_json::to_value(&status).expect("serialize");
        assert_eq!(json["configured"], false);
        assert_eq!(json["message"], "missing TWITTER_BEARER_TOKEN");
    }
}
