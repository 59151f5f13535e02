//! Aggregation fan-out.
//!
//! Turns `(username, platforms)` into one outcome per requested platform
//! with bounded latency and full isolation between platforms: a slow, failed,
//! or panicking adapter never affects another platform's result or extends
//! its budget.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::Instant;

use footprint_adapters::{AdapterError, AdapterSet, CredentialRegistry, PlatformAdapter};
use footprint_core::{Platform, PlatformData};

use crate::types::{AggregationOptions, AggregationResult};

/// Contract violations that must be rejected before any fan-out begins.
/// These are caller errors, not adapter outcomes, and map to 4xx at the
/// HTTP boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("platform set must not be empty")]
    EmptyPlatformSet,
}

/// Aggregate public data for `username` across `platforms`.
///
/// - Platforms the registry reports unconfigured get a synthesized
///   `NotConfigured` outcome; their adapters are never invoked.
/// - Configured platforms run concurrently (capped by
///   [`AggregationOptions::max_concurrent`]), each in its own task under an
///   independent [`AggregationOptions::adapter_timeout`].
/// - When [`AggregationOptions::request_deadline`] elapses, still-pending
///   platforms are recorded as `Timeout` and their tasks cancelled; results
///   already collected are kept.
///
/// The returned map holds exactly one outcome per requested platform.
///
/// # Errors
///
/// Returns [`EngineError`] only for contract violations (empty username or
/// platform set). Adapter failures are data in the result map, never errors.
pub async fn aggregate(
    adapters: &AdapterSet,
    registry: &CredentialRegistry,
    options: &AggregationOptions,
    username: &str,
    platforms: &[Platform],
) -> Result<AggregationResult, EngineError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(EngineError::EmptyUsername);
    }

    let requested: BTreeSet<Platform> = platforms.iter().copied().collect();
    if requested.is_empty() {
        return Err(EngineError::EmptyPlatformSet);
    }

    let mut outcomes: AggregationResult = AggregationResult::new();
    let mut pending: Vec<Platform> = Vec::new();
    for platform in requested {
        if registry.is_configured(platform) {
            pending.push(platform);
        } else {
            tracing::debug!(platform = %platform, "skipping unconfigured platform");
            outcomes.insert(platform, Err(AdapterError::NotConfigured));
        }
    }

    let deadline = Instant::now() + options.request_deadline;
    let mut fetches = stream::iter(pending.iter().copied().map(|platform| {
        let adapter = adapters.get(platform);
        let username = username.to_owned();
        let per_call = options.adapter_timeout;
        async move {
            let outcome = match adapter {
                Some(adapter) => fetch_isolated(adapter, username, per_call).await,
                None => Err(AdapterError::NotConfigured),
            };
            (platform, outcome)
        }
    }))
    .buffer_unordered(options.max_concurrent.max(1));

    loop {
        match tokio::time::timeout_at(deadline, fetches.next()).await {
            Ok(Some((platform, outcome))) => {
                match &outcome {
                    Ok(data) => tracing::debug!(
                        platform = %platform,
                        items = data.content.len(),
                        "adapter fetch succeeded"
                    ),
                    Err(e) => tracing::warn!(
                        platform = %platform,
                        error = %e,
                        "adapter fetch failed"
                    ),
                }
                outcomes.insert(platform, outcome);
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    deadline_secs = options.request_deadline.as_secs(),
                    "aggregation deadline elapsed with adapters still pending"
                );
                break;
            }
        }
    }
    // Dropping the stream aborts the per-adapter tasks still in flight.
    drop(fetches);

    for platform in pending {
        outcomes.entry(platform).or_insert_with(|| {
            Err(AdapterError::Timeout {
                limit_secs: options.request_deadline.as_secs(),
            })
        });
    }

    Ok(outcomes)
}

/// Aborts the wrapped task when dropped, so an adapter call cancelled by a
/// timeout or by the request deadline does not keep running detached.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run one adapter call in its own task under its own timeout.
///
/// The task boundary confines panics: a panicking adapter surfaces as an
/// `Upstream` outcome for its platform only. On timeout — or when this
/// future itself is dropped at the request deadline — the task is aborted so
/// the adapter's in-flight work is cancelled, not orphaned.
async fn fetch_isolated(
    adapter: Arc<dyn PlatformAdapter>,
    username: String,
    per_call: std::time::Duration,
) -> Result<PlatformData, AdapterError> {
    let mut handle = tokio::spawn(async move { adapter.fetch(&username).await });
    let _guard = AbortOnDrop(handle.abort_handle());
    match tokio::time::timeout(per_call, &mut handle).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_err)) => Err(AdapterError::Upstream {
            status: None,
            reason: format!("adapter task failed: {join_err}"),
        }),
        Err(_) => Err(AdapterError::Timeout {
            limit_secs: per_call.as_secs(),
        }),
    }
}
