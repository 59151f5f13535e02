//! Integration tests for `TwitterAdapter` using wiremock HTTP mocks.

use footprint_adapters::{AdapterError, PlatformAdapter, TwitterAdapter};
use footprint_core::{AppConfig, ContentType, Platform, PlatformCredentials};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "info".to_owned(),
        adapter_timeout_secs: 5,
        request_deadline_secs: 10,
        max_concurrent_fetches: 4,
        retry_jitter_base_ms: 0,
        outbound_user_agent: "footprint-test/0.1".to_owned(),
        content_fetch_limit: 25,
        credentials: PlatformCredentials {
            twitter_bearer_token: Some("test-bearer".to_owned()),
            ..PlatformCredentials::default()
        },
    }
}

fn adapter(server: &MockServer) -> TwitterAdapter {
    TwitterAdapter::with_base_url(&test_config(), &server.uri())
        .expect("adapter construction should not fail")
}

fn user_body() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "id": "1122334455",
            "name": "Sample User",
            "username": "sampleuser",
            "description": "Travel photos and tech takes",
            "location": "Lisbon",
            "profile_image_url": "https://pbs.twimg.com/profile.jpg",
            "created_at": "2014-03-01T10:00:00.000Z",
            "public_metrics": {
                "followers_count": 25_000,
                "following_count": 410,
                "tweet_count": 3,
                "listed_count": 12
            }
        }
    })
}

#[tokio::test]
async fn fetch_normalizes_timeline_and_metrics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/sampleuser"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/1122334455/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {
                    "id": "1",
                    "text": "Loving this amazing trip through Portugal #travel",
                    "created_at": "2026-05-20T09:00:00.000Z",
                    "public_metrics": { "retweet_count": 4, "reply_count": 2, "like_count": 90, "quote_count": 1 }
                },
                {
                    "id": "2",
                    "text": "RT @someone: big tech news",
                    "created_at": "2026-05-18T09:00:00.000Z",
                    "public_metrics": { "retweet_count": 0, "reply_count": 0, "like_count": 0, "quote_count": 0 },
                    "referenced_tweets": [{ "type": "retweeted", "id": "99" }]
                },
                {
                    "id": "3",
                    "text": "totally agree, terrible call by the league",
                    "created_at": "2026-05-15T09:00:00.000Z",
                    "public_metrics": { "retweet_count": 0, "reply_count": 1, "like_count": 3, "quote_count": 0 },
                    "referenced_tweets": [{ "type": "replied_to", "id": "98" }]
                }
            ],
            "meta": { "result_count": 3 }
        })))
        .mount(&server)
        .await;

    let data = adapter(&server)
        .fetch("@sampleuser")
        .await
        .expect("fetch should succeed");

    assert_eq!(data.platform, Platform::Twitter);
    assert_eq!(data.username, "sampleuser", "leading @ must be stripped");
    assert_eq!(data.profile.followers, Some(25_000));
    assert_eq!(data.profile.location.as_deref(), Some("Lisbon"));

    assert_eq!(data.activity.total_posts, 1);
    assert_eq!(data.activity.total_comments, 1);
    assert_eq!(data.activity.total_shares, 1);
    assert_eq!(data.activity.top_hashtags, vec!["travel".to_owned()]);

    assert_eq!(data.content[0].content_type, ContentType::Post, "newest first");
    assert_eq!(data.content[0].engagement, 97);

    assert!((data.analysis.sentiment_breakdown.sum() - 1.0).abs() < 0.01);
    assert_eq!(data.analysis.platform_metrics["tweetCount"], 3);
    assert!((0.0..=100.0).contains(&data.analysis.exposure_score));
    // 25k followers puts audience reach over the concern threshold.
    assert!(data
        .analysis
        .privacy_concerns
        .iter()
        .any(|c| c.category == "audience-reach"));
}

#[tokio::test]
async fn missing_data_envelope_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errors": [{ "title": "Not Found Error", "detail": "no user" }]
        })))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .fetch("ghost")
        .await
        .expect_err("empty envelope must map to NotFound");
    assert!(matches!(err, AdapterError::NotFound { ref username } if username == "ghost"));
}

#[tokio::test]
async fn unauthorized_token_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/anyone"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = adapter(&server).fetch("anyone").await.expect_err("401");
    assert!(matches!(err, AdapterError::Unauthorized));
}

#[tokio::test]
async fn transient_500_is_retried_once_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let mut body = user_body();
    body["data"]["username"] = "flaky".into();
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/1122334455/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [],
            "meta": { "result_count": 0 }
        })))
        .mount(&server)
        .await;

    let data = adapter(&server)
        .fetch("flaky")
        .await
        .expect("one retry should recover from a single 500");
    assert_eq!(data.username, "flaky");
    assert!(data.content.is_empty());
}

#[tokio::test]
async fn rate_limited_timeline_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/by/username/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/1122334455/tweets"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "900"))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server).fetch("busy").await.expect_err("429");
    assert!(matches!(
        err,
        AdapterError::RateLimited {
            retry_after_secs: Some(900)
        }
    ));
}
