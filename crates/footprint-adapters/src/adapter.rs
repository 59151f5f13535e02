use async_trait::async_trait;
use footprint_core::{Platform, PlatformData};

use crate::error::AdapterError;

/// One platform's public-data fetcher.
///
/// Implementations are registered once at startup in a closed
/// [`crate::AdapterSet`] keyed by [`Platform`], so every platform is handled
/// statically — there is no runtime string dispatch.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch and normalize public data for `username`.
    ///
    /// On success every distribution in the returned analysis sums to 1.0
    /// (± rounding) and the exposure score is within `[0, 100]`. An account
    /// that cannot be resolved yields [`AdapterError::NotFound`], never a
    /// zeroed `PlatformData`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] variant from the taxonomy in
    /// [`crate::error`]; adapters never panic on upstream misbehavior.
    async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError>;
}

/// Strip platform-specific handle prefixes before calling the upstream.
///
/// A leading `@` is removed for every platform; Reddit additionally accepts
/// `u/` or `/u/` prefixes. The result is trimmed but otherwise untouched.
#[must_use]
pub fn strip_handle_prefix(platform: Platform, raw: &str) -> String {
    let trimmed = raw.trim();
    let without_at = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if platform == Platform::Reddit {
        let without_slash = without_at.strip_prefix('/').unwrap_or(without_at);
        return without_slash
            .strip_prefix("u/")
            .unwrap_or(without_slash)
            .to_owned();
    }
    without_at.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_at_sign() {
        assert_eq!(
            strip_handle_prefix(Platform::Twitter, "@jack"),
            "jack".to_owned()
        );
    }

    #[test]
    fn strips_reddit_user_prefixes() {
        assert_eq!(strip_handle_prefix(Platform::Reddit, "u/spez"), "spez");
        assert_eq!(strip_handle_prefix(Platform::Reddit, "/u/spez"), "spez");
        assert_eq!(strip_handle_prefix(Platform::Reddit, "@spez"), "spez");
    }

    #[test]
    fn plain_usernames_pass_through_trimmed() {
        assert_eq!(
            strip_handle_prefix(Platform::Instagram, "  zuck "),
            "zuck".to_owned()
        );
    }
}
