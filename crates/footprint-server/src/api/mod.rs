mod search;
mod status;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use footprint_adapters::{AdapterSet, CredentialRegistry};
use footprint_engine::AggregationOptions;

use crate::history::SearchHistorySink;
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

#[derive(Clone)]
pub struct AppState {
    pub adapters: AdapterSet,
    pub registry: Arc<CredentialRegistry>,
    pub options: AggregationOptions,
    pub history: Arc<dyn SearchHistorySink>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/platform-api-status",
            get(status::platform_api_status),
        )
        .route("/api/search", post(search::search))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthData { status: "ok" }))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use footprint_adapters::{AdapterError, PlatformAdapter};
    use footprint_core::{
        ActivityData, AnalysisResults, DataQuality, Platform, PlatformData, ProfileData,
        SentimentBreakdown,
    };
    use tower::ServiceExt;

    use crate::history::InMemoryHistory;

    use super::*;

    struct StubAdapter {
        platform: Platform,
        exposure: f64,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl PlatformAdapter for StubAdapter {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch(&self, username: &str) -> Result<PlatformData, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PlatformData {
                platform: self.platform,
                username: username.to_owned(),
                profile: ProfileData::default(),
                activity: ActivityData {
                    total_posts: 3,
                    ..ActivityData::default()
                },
                content: Vec::new(),
                analysis: AnalysisResults {
                    exposure_score: self.exposure,
                    topic_distribution: Vec::new(),
                    activity_timeline: Vec::new(),
                    sentiment_breakdown: SentimentBreakdown::default(),
                    privacy_concerns: Vec::new(),
                    platform_metrics: serde_json::Map::new(),
                    data_quality: DataQuality::Real,
                },
            })
        }
    }

    fn test_state(
        configured: &[Platform],
        history: Arc<InMemoryHistory>,
    ) -> (AppState, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let mut adapters: BTreeMap<Platform, Arc<dyn PlatformAdapter>> = BTreeMap::new();
        for platform in Platform::ALL {
            adapters.insert(
                platform,
                Arc::new(StubAdapter {
                    platform,
                    exposure: 40.0,
                    calls: Arc::clone(&calls),
                }),
            );
        }
        let state = AppState {
            adapters: AdapterSet::new(adapters),
            registry: Arc::new(CredentialRegistry::with_configured(configured)),
            options: AggregationOptions {
                adapter_timeout: Duration::from_millis(500),
                request_deadline: Duration::from_secs(2),
                max_concurrent: 4,
            },
            history,
        };
        (state, calls)
    }

    fn app(state: AppState) -> Router {
        build_app(state, default_rate_limit_state())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    fn post_search(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (state, _) = test_state(&[], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn search_rejects_empty_username() {
        let (state, calls) = test_state(&[Platform::Twitter], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "username": "  ",
                "platforms": ["twitter"]
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0, "no fan-out on bad input");
    }

    #[tokio::test]
    async fn search_rejects_empty_platform_set() {
        let (state, _) = test_state(&[Platform::Twitter], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "username": "sample",
                "platforms": []
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_rejects_unknown_platform() {
        let (state, _) = test_state(&[Platform::Twitter], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "username": "sample",
                "platforms": ["myspace"]
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn search_returns_contract_shape() {
        let history = Arc::new(InMemoryHistory::new());
        let (state, _) = test_state(
            &[Platform::Instagram, Platform::Twitter],
            Arc::clone(&history),
        );
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "username": "@sample",
                "platforms": ["instagram", "twitter"]
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["username"], "@sample");
        assert_eq!(json["platforms"], serde_json::json!(["instagram", "twitter"]));
        assert_eq!(json["platformData"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["summary"]["platformsFound"], 2);
        assert_eq!(json["summary"]["exposureScore"], 40.0);
        assert!(json.get("noDataMessage").is_none());

        let records = history.records().await;
        assert_eq!(records.len(), 1, "completed search must be archived");
        assert_eq!(records[0].platforms_found, 2);
    }

    #[tokio::test]
    async fn search_expands_all_to_configured_platforms() {
        let (state, _) = test_state(
            &[Platform::Instagram, Platform::Reddit],
            Arc::new(InMemoryHistory::new()),
        );
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "username": "sample",
                "platforms": ["all"]
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["platforms"],
            serde_json::json!(["instagram", "reddit"])
        );
    }

    #[tokio::test]
    async fn search_accepts_per_platform_usernames() {
        let (state, _) = test_state(
            &[Platform::Instagram, Platform::Twitter],
            Arc::new(InMemoryHistory::new()),
        );
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "platformUsernames": [
                    { "platform": "instagram", "username": "ig_name" },
                    { "platform": "twitter", "username": "tw_name" }
                ],
                "platforms": ["instagram", "twitter"]
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["username"], "ig_name", "primary username is the first entry");
        let usernames: Vec<&str> = json["platformData"]
            .as_array()
            .expect("array")
            .iter()
            .map(|d| d["username"].as_str().expect("username"))
            .collect();
        assert_eq!(usernames, vec!["ig_name", "tw_name"]);
    }

    #[tokio::test]
    async fn unconfigured_platform_is_reported_not_queried() {
        let (state, calls) = test_state(&[], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(post_search(serde_json::json!({
                "username": "sample",
                "platforms": ["reddit"]
            })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["platformErrors"]["reddit"], "not configured");
        assert_eq!(json["summary"]["exposureScore"], 0.0);
        assert!(json["noDataMessage"].is_string());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn status_endpoint_reports_registry_verbatim() {
        let (state, calls) = test_state(&[Platform::Twitter], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/platform-api-status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["twitter"]["configured"], true);
        assert_eq!(json["reddit"]["configured"], false);
        assert_eq!(calls.load(Ordering::SeqCst), 0, "status never calls upstream");
    }

    #[tokio::test]
    async fn responses_carry_request_id_header() {
        let (state, _) = test_state(&[], Arc::new(InMemoryHistory::new()));
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.to_str().unwrap()),
            Some("req-123")
        );
    }
}
