use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clout::config::Config;
use clout::error::AnalyzeError;
use clout::source::AccountSource;
use clout::source::twitter::TwitterSource;

const TOKEN: &str = "test-token";

fn source_for(server: &MockServer) -> TwitterSource {
    let config = Config {
        api_base: server.uri(),
        ..Config::default()
    }
    .with_token(TOKEN);
    TwitterSource::new(&config).unwrap()
}

fn user_body() -> serde_json::Value {
    json!({
        "data": {
            "id": "783214",
            "username": "jack",
            "name": "jack",
            "created_at": "2006-03-21T20:50:14.000Z",
            "description": "no state is the best state",
            "verified": true,
            "profile_image_url": "https://pbs.twimg.com/profile_images/jack.jpg",
            "public_metrics": {
                "followers_count": 6500000,
                "following_count": 4200,
                "tweet_count": 29000,
                "listed_count": 32000
            }
        }
    })
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/by/username/jack"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param(
            "user.fields",
            "created_at,description,public_metrics,verified,profile_image_url",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(server)
        .await;
}

// ── Success ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_profile_then_timeline() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/783214/tweets"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("max_results", "100"))
        .and(query_param("exclude", "retweets,replies"))
        .and(query_param("tweet.fields", "created_at,public_metrics,entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": "2",
                    "text": "newest",
                    "created_at": "2024-05-02T10:00:00.000Z",
                    "public_metrics": {
                        "like_count": 120,
                        "retweet_count": 30,
                        "reply_count": 12,
                        "impression_count": 9000
                    }
                },
                {
                    "id": "1",
                    "text": "older",
                    "created_at": "2024-05-01T10:00:00.000Z",
                    "public_metrics": {
                        "like_count": 4,
                        "retweet_count": 0,
                        "reply_count": 1
                    }
                }
            ],
            "meta": { "result_count": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = source_for(&server).fetch("jack").await.unwrap();

    assert_eq!(data.profile.id, "783214");
    assert_eq!(data.profile.handle, "jack");
    assert_eq!(data.profile.bio, "no state is the best state");
    assert!(data.profile.verified);
    assert_eq!(data.profile.metrics.followers, 6_500_000);
    assert_eq!(data.profile.metrics.listed, 32_000);

    assert_eq!(data.posts.len(), 2);
    assert_eq!(data.posts[0].text, "newest");
    assert_eq!(data.posts[0].metrics.reshares, 30);
    assert_eq!(data.posts[0].metrics.impressions, 9000);
    assert_eq!(data.posts[1].metrics.impressions, 0);
}

#[tokio::test]
async fn empty_timeline_means_no_posts() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/783214/tweets"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "meta": { "result_count": 0 } })),
        )
        .mount(&server)
        .await;

    let data = source_for(&server).fetch("jack").await.unwrap();
    assert!(data.posts.is_empty());
}

// ── Failures ──────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_never_calls_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        api_base: server.uri(),
        ..Config::default()
    };
    let err = TwitterSource::new(&config)
        .unwrap()
        .fetch("jack")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Configuration(_)));
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn rate_limit_reads_reset_header() {
    let server = MockServer::start().await;
    let reset = (Utc::now() + Duration::seconds(900)).timestamp();
    Mock::given(method("GET"))
        .and(path("/users/by/username/jack"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-rate-limit-reset", reset.to_string().as_str())
                .set_body_json(json!({ "title": "Too Many Requests", "status": 429 })),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("jack").await.unwrap_err();
    match err {
        AnalyzeError::RateLimited {
            reset_time,
            wait_minutes,
        } => {
            assert_eq!(reset_time.map(|t| t.timestamp()), Some(reset));
            assert_eq!(wait_minutes, 15);
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_without_header_waits_fifteen_minutes() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/783214/tweets"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("jack").await.unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::RateLimited {
            reset_time: None,
            wait_minutes: 15
        }
    ));
}

#[tokio::test]
async fn provider_detail_is_surfaced() {
    let server = MockServer::start().await;
    let problem = json!({
        "title": "Unauthorized",
        "type": "about:blank",
        "status": 401,
        "detail": "Bearer token is invalid"
    });
    Mock::given(method("GET"))
        .and(path("/users/by/username/jack"))
        .respond_with(ResponseTemplate::new(401).set_body_json(problem.clone()))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("jack").await.unwrap_err();
    match err {
        AnalyzeError::Provider {
            status,
            message,
            details,
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Bearer token is invalid");
            assert_eq!(details, Some(problem));
        }
        other => panic!("expected Provider, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_title_used_without_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/by/username/jack"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "title": "Forbidden" })))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("jack").await.unwrap_err();
    assert_eq!(err.status(), 403);
    assert_eq!(err.to_string(), "Forbidden");
}

#[tokio::test]
async fn generic_message_for_opaque_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("jack").await.unwrap_err();
    assert_eq!(err.status(), 503);
    assert_eq!(err.to_string(), "Request failed with status code 503");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/by/username/nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{
                "value": "nobody",
                "detail": "Could not find user with username: [nobody].",
                "title": "Not Found Error",
                "resource_type": "user"
            }]
        })))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("nobody").await.unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(
        err.to_string(),
        "Could not find user with username: [nobody]."
    );
}

#[tokio::test]
async fn unreachable_provider_is_a_500() {
    let config = Config {
        api_base: "http://127.0.0.1:1".to_string(),
        ..Config::default()
    }
    .with_token(TOKEN);
    let err = TwitterSource::new(&config)
        .unwrap()
        .fetch("jack")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Provider { status: 500, .. }));
}
