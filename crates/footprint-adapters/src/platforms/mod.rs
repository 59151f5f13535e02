//! Per-platform adapter implementations and the response-mapping helpers
//! they share.

mod facebook;
mod instagram;
mod linkedin;
mod reddit;
mod twitter;

pub use facebook::FacebookAdapter;
pub use instagram::InstagramAdapter;
pub use linkedin::LinkedinAdapter;
pub use reddit::RedditAdapter;
pub use twitter::TwitterAdapter;

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use footprint_core::AppConfig;
use serde::de::DeserializeOwned;

use crate::error::AdapterError;

/// Build the outbound HTTP client every adapter uses: request timeout at
/// the per-adapter ceiling, bounded connect timeout, configured user agent.
pub(crate) fn build_http_client(config: &AppConfig) -> Result<reqwest::Client, AdapterError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.adapter_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(config.outbound_user_agent.clone())
        .build()
        .map_err(|e| AdapterError::Upstream {
            status: None,
            reason: format!("failed to build HTTP client: {e}"),
        })
}

/// `Retry-After` seconds from a 429 response, when the header is present and
/// numeric. Date-form values are ignored.
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Check the HTTP status and deserialize the body.
///
/// Non-2xx statuses map through [`AdapterError::from_status`]; a body that
/// does not match `T` is an upstream contract problem, not retryable.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    username: &str,
    context: &str,
) -> Result<T, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = retry_after_secs(response.headers());
        return Err(AdapterError::from_status(
            status.as_u16(),
            username,
            retry_after,
        ));
    }

    response.json::<T>().await.map_err(|e| AdapterError::Upstream {
        status: None,
        reason: format!("malformed response for {context}: {e}"),
    })
}

/// Graph-style APIs (Instagram, Facebook) report application errors as
/// non-2xx statuses with a JSON `error` envelope. Map the envelope's error
/// code onto the adapter taxonomy, falling back to the plain status mapping.
pub(crate) async fn read_graph_json<T: DeserializeOwned>(
    response: reqwest::Response,
    username: &str,
    context: &str,
) -> Result<T, AdapterError> {
    #[derive(serde::Deserialize)]
    struct GraphErrorEnvelope {
        error: GraphErrorBody,
    }

    #[derive(serde::Deserialize)]
    struct GraphErrorBody {
        message: String,
        code: Option<i64>,
    }

    let status = response.status();
    if !status.is_success() {
        let retry_after = retry_after_secs(response.headers());
        let fallback = AdapterError::from_status(status.as_u16(), username, retry_after);
        let Ok(envelope) = response.json::<GraphErrorEnvelope>().await else {
            return Err(fallback);
        };
        return Err(match envelope.error.code {
            // 190: invalid/expired token. 4/17/32: call-budget throttling.
            Some(190) => AdapterError::Unauthorized,
            Some(4 | 17 | 32) => AdapterError::RateLimited {
                retry_after_secs: retry_after,
            },
            // 803: nonexistent alias; 100 with a missing object reads the same.
            Some(803 | 100) => AdapterError::NotFound {
                username: username.to_owned(),
            },
            _ => AdapterError::Upstream {
                status: Some(status.as_u16()),
                reason: envelope.error.message,
            },
        });
    }

    response.json::<T>().await.map_err(|e| AdapterError::Upstream {
        status: None,
        reason: format!("malformed response for {context}: {e}"),
    })
}

/// Parse Graph-style timestamps, which use a colonless offset
/// (`2024-05-01T12:00:00+0000`) that RFC 3339 parsing rejects.
pub(crate) fn parse_graph_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Unix seconds (possibly fractional, as Reddit reports) to UTC.
pub(crate) fn from_unix_secs(secs: f64) -> Option<DateTime<Utc>> {
    #[allow(clippy::cast_possible_truncation)]
    Utc.timestamp_opt(secs as i64, 0).single()
}
