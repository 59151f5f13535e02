use thiserror::Error;

use crate::app_config::{AppConfig, PlatformCredentials};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value. Absent
/// vars fall back to defaults; absent credentials leave the platform
/// unconfigured.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from env vars already in the process,
/// without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration from the provided env-var lookup.
///
/// The parsing logic is decoupled from the real environment so tests can
/// drive it with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let bind_addr = parse_addr("FOOTPRINT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("FOOTPRINT_LOG_LEVEL", "info");
    let adapter_timeout_secs = parse_u64("FOOTPRINT_ADAPTER_TIMEOUT_SECS", "10")?;
    let request_deadline_secs = parse_u64("FOOTPRINT_REQUEST_DEADLINE_SECS", "25")?;
    let max_concurrent_fetches = parse_usize("FOOTPRINT_MAX_CONCURRENT_FETCHES", "5")?;
    let retry_jitter_base_ms = parse_u64("FOOTPRINT_RETRY_JITTER_BASE_MS", "200")?;
    let outbound_user_agent = or_default(
        "FOOTPRINT_USER_AGENT",
        "footprint/0.1 (public-profile-aggregation)",
    );
    let content_fetch_limit = parse_u32("FOOTPRINT_CONTENT_FETCH_LIMIT", "50")?;

    let credentials = PlatformCredentials {
        instagram_access_token: optional("INSTAGRAM_ACCESS_TOKEN"),
        facebook_access_token: optional("FACEBOOK_ACCESS_TOKEN"),
        reddit_client_id: optional("REDDIT_CLIENT_ID"),
        reddit_client_secret: optional("REDDIT_CLIENT_SECRET"),
        reddit_user_agent: optional("REDDIT_USER_AGENT"),
        twitter_bearer_token: optional("TWITTER_BEARER_TOKEN"),
        linkedin_client_id: optional("LINKEDIN_CLIENT_ID"),
        linkedin_client_secret: optional("LINKEDIN_CLIENT_SECRET"),
    };

    Ok(AppConfig {
        bind_addr,
        log_level,
        adapter_timeout_secs,
        request_deadline_secs,
        max_concurrent_fetches,
        retry_jitter_base_ms,
        outbound_user_agent,
        content_fetch_limit,
        credentials,
    })
}
