use thiserror::Error;

/// Failure modes an adapter must distinguish. These are surfaced per platform
/// in the response's error map; their `Display` strings are the human-readable
/// messages callers see.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("not configured")]
    NotConfigured,

    #[error("credentials rejected by upstream")]
    Unauthorized,

    #[error("rate limited{}", .retry_after_secs.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("account '{username}' not found or private")]
    NotFound { username: String },

    #[error("timed out after {limit_secs}s")]
    Timeout { limit_secs: u64 },

    #[error("upstream error{}: {reason}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, reason: String },
}

impl AdapterError {
    /// Map a non-2xx HTTP status to the adapter taxonomy.
    ///
    /// 401/403 → `Unauthorized`, 404 → `NotFound`, 429 → `RateLimited`
    /// (honoring a `Retry-After` seconds value when the caller extracted one),
    /// everything else → `Upstream`.
    #[must_use]
    pub fn from_status(status: u16, username: &str, retry_after_secs: Option<u64>) -> Self {
        match status {
            401 | 403 => AdapterError::Unauthorized,
            404 => AdapterError::NotFound {
                username: username.to_owned(),
            },
            429 => AdapterError::RateLimited { retry_after_secs },
            other => AdapterError::Upstream {
                status: Some(other),
                reason: "unexpected upstream status".to_owned(),
            },
        }
    }

    /// Map a `reqwest` transport error. Request timeouts become [`Timeout`]
    /// with the client's configured ceiling; everything else is [`Upstream`]
    /// with no status.
    ///
    /// [`Timeout`]: AdapterError::Timeout
    /// [`Upstream`]: AdapterError::Upstream
    #[must_use]
    pub fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout {
                limit_secs: timeout_secs,
            }
        } else {
            AdapterError::Upstream {
                status: err.status().map(|s| s.as_u16()),
                reason: err.to_string(),
            }
        }
    }

    /// `true` for transient network failures worth one immediate retry:
    /// connection-level errors and 5xx responses. Rate limits are never
    /// retried within a request, and timeouts are surfaced as-is so the
    /// per-adapter budget stays meaningful.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Upstream { status, .. } => {
                status.is_none_or(|s| (500..600).contains(&s))
            }
            AdapterError::NotConfigured
            | AdapterError::Unauthorized
            | AdapterError::RateLimited { .. }
            | AdapterError::NotFound { .. }
            | AdapterError::Timeout { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_unauthorized() {
        assert!(matches!(
            AdapterError::from_status(401, "alice", None),
            AdapterError::Unauthorized
        ));
    }

    #[test]
    fn status_404_carries_username() {
        let err = AdapterError::from_status(404, "alice", None);
        assert!(matches!(err, AdapterError::NotFound { ref username } if username == "alice"));
    }

    #[test]
    fn status_429_keeps_retry_after() {
        let err = AdapterError::from_status(429, "alice", Some(30));
        assert!(matches!(
            err,
            AdapterError::RateLimited {
                retry_after_secs: Some(30)
            }
        ));
        assert_eq!(err.to_string(), "rate limited (retry after 30s)");
    }

    #[test]
    fn status_500_maps_to_upstream() {
        let err = AdapterError::from_status(500, "alice", None);
        assert!(matches!(
            err,
            AdapterError::Upstream {
                status: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn not_configured_displays_bare_message() {
        assert_eq!(AdapterError::NotConfigured.to_string(), "not configured");
    }

    #[test]
    fn only_upstream_errors_are_transient() {
        assert!(AdapterError::from_status(503, "a", None).is_transient());
        assert!(AdapterError::Upstream {
            status: None,
            reason: "connection reset".to_owned()
        }
        .is_transient());
        assert!(!AdapterError::from_status(404, "a", None).is_transient());
        assert!(!AdapterError::RateLimited {
            retry_after_secs: None
        }
        .is_transient());
        assert!(!AdapterError::Timeout { limit_secs: 10 }.is_transient());
    }
}
