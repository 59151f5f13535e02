use std::collections::BTreeMap;

use axum::{extract::State, Json};

use footprint_adapters::PlatformStatus;
use footprint_core::Platform;

use crate::api::AppState;

/// Per-platform configuration status straight from the credential registry.
/// Pure read — no upstream platform is ever called here.
pub async fn platform_api_status(
    State(state): State<AppState>,
) -> Json<BTreeMap<Platform, PlatformStatus>> {
    Json(state.registry.statuses().clone())
}
