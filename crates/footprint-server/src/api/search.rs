use std::collections::{BTreeMap, BTreeSet};

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use footprint_core::Platform;
use footprint_engine::{aggregate, compile_response, AggregationResult, DigitalFootprintResponse};

use crate::api::{ApiError, AppState};
use crate::history::SearchRecord;
use crate::middleware::RequestId;

/// Search request body. Either a single `username` for every platform, or
/// per-platform entries in `platformUsernames` (the first entry doubles as
/// the display username). `platforms` may contain `"all"`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    platform_usernames: Vec<PlatformUsername>,
    #[serde(default)]
    platforms: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformUsername {
    platform: String,
    username: String,
}

pub async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<DigitalFootprintResponse>, ApiError> {
    let platforms = resolve_platforms(&request.platforms, &state)?;

    let primary = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| {
            request
                .platform_usernames
                .first()
                .map(|e| e.username.trim().to_owned())
                .filter(|u| !u.is_empty())
        })
        .ok_or_else(|| ApiError::new("validation_error", "username must not be empty"))?;

    let mut overrides: BTreeMap<Platform, String> = BTreeMap::new();
    for entry in &request.platform_usernames {
        let platform: Platform = entry
            .platform
            .parse()
            .map_err(|e: footprint_core::ParsePlatformError| {
                ApiError::new("validation_error", e.to_string())
            })?;
        let username = entry.username.trim();
        if username.is_empty() {
            return Err(ApiError::new(
                "validation_error",
                format!("username for {platform} must not be empty"),
            ));
        }
        overrides.insert(platform, username.to_owned());
    }

    // One aggregation per distinct username; platform sets are disjoint, so
    // the outcome maps merge without collisions.
    let mut groups: BTreeMap<String, Vec<Platform>> = BTreeMap::new();
    for platform in &platforms {
        let username = overrides
            .get(platform)
            .cloned()
            .unwrap_or_else(|| primary.clone());
        groups.entry(username).or_default().push(*platform);
    }

    let runs = groups.iter().map(|(username, subset)| {
        let adapters = &state.adapters;
        let registry = &state.registry;
        let options = state.options;
        async move { aggregate(adapters, registry, &options, username, subset).await }
    });

    let mut outcomes = AggregationResult::new();
    for run in futures::future::join_all(runs).await {
        let map = run.map_err(|e| ApiError::new("validation_error", e.to_string()))?;
        outcomes.extend(map);
    }

    let response = compile_response(&primary, outcomes, Utc::now());

    tracing::info!(
        request_id = %req_id.0,
        username = %response.username,
        platforms_found = response.summary.platforms_found,
        failed = response.platform_errors.len(),
        "search completed"
    );

    state
        .history
        .record(SearchRecord {
            id: Uuid::new_v4(),
            username: response.username.clone(),
            timestamp: response.timestamp,
            platforms_found: response.summary.platforms_found,
            exposure_score: response.summary.exposure_score,
        })
        .await;

    Ok(Json(response))
}

/// Parse the requested platform names, expanding `"all"` to the configured
/// set, deduplicating into canonical order.
fn resolve_platforms(raw: &[String], state: &AppState) -> Result<Vec<Platform>, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::new(
            "validation_error",
            "platform set must not be empty",
        ));
    }

    if raw.iter().any(|p| p.trim().eq_ignore_ascii_case("all")) {
        let configured = state.registry.configured_platforms();
        if configured.is_empty() {
            return Err(ApiError::new(
                "validation_error",
                "\"all\" was requested but no platform is configured",
            ));
        }
        return Ok(configured);
    }

    let mut set = BTreeSet::new();
    for name in raw {
        let platform: Platform = name
            .parse()
            .map_err(|e: footprint_core::ParsePlatformError| {
                ApiError::new("validation_error", e.to_string())
            })?;
        set.insert(platform);
    }
    Ok(set.into_iter().collect())
}
