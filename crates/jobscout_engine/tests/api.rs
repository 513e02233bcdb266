use std::time::Duration;

use jobscout_core::{ScrapeRequest, SubmissionFailure};
use jobscout_engine::{ApiFailure, ApiSettings, Credentials, HttpScraperApi, ScraperApi};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        session_id: "user-1".to_string(),
        bearer_token: "tok-123".to_string(),
    }
}

fn api_for(server: &MockServer) -> HttpScraperApi {
    HttpScraperApi::new(ApiSettings::with_base_url(&server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn start_posts_request_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraper/start"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({
            "platformId": "p1",
            "query": "Engineer",
            "location": "Toronto",
            "maxPages": 5,
            "profileKeywords": ["rust"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "started"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = ScrapeRequest::new("p1", "Engineer", "Toronto", 5).with_keyword(" rust ");
    api_for(&server)
        .start_session(&request, &credentials())
        .await
        .expect("start accepted");
}

#[tokio::test]
async fn start_surfaces_server_message_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraper/start"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "platform offline"})),
        )
        .mount(&server)
        .await;

    let request = ScrapeRequest::new("p1", "Engineer", "Toronto", 5);
    let err = api_for(&server)
        .start_session(&request, &credentials())
        .await
        .unwrap_err();
    assert_eq!(err.kind, SubmissionFailure::HttpStatus(500));
    assert_eq!(err.message, "platform offline");
}

#[tokio::test]
async fn start_maps_401_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraper/start"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let request = ScrapeRequest::new("p1", "Engineer", "Toronto", 5);
    let err = api_for(&server)
        .start_session(&request, &credentials())
        .await
        .unwrap_err();
    assert_eq!(err.kind, SubmissionFailure::Unauthorized);
    assert!(err.message.contains("401"));
}

#[tokio::test]
async fn start_times_out_on_slow_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraper/start"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let settings = ApiSettings {
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::with_base_url(&server.uri()).unwrap()
    };
    let api = HttpScraperApi::new(settings).unwrap();
    let request = ScrapeRequest::new("p1", "Engineer", "Toronto", 5);
    let err = api.start_session(&request, &credentials()).await.unwrap_err();
    assert_eq!(err.kind, SubmissionFailure::Timeout);
}

#[tokio::test]
async fn stop_posts_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraper/stop"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_string("{}"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .stop_session(&credentials())
        .await
        .expect("stop accepted");
}

#[tokio::test]
async fn stop_failure_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scraper/stop"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "not running"})))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .stop_session(&credentials())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(409));
    assert_eq!(err.message, "not running");
}

#[tokio::test]
async fn platforms_reads_common_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/platforms"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "common": [{
                    "publicId": "p1",
                    "name": "Indeed",
                    "type": "job_board",
                    "parserType": "html",
                    "notes": "Canada only"
                }],
                "custom": []
            }
        })))
        .mount(&server)
        .await;

    let platforms = api_for(&server).platforms(&credentials()).await.unwrap();
    assert_eq!(platforms.len(), 1);
    assert_eq!(platforms[0].public_id, "p1");
    assert_eq!(platforms[0].label(), "Indeed (JOB_BOARD, html) - Canada only");
}

#[tokio::test]
async fn history_tolerates_missing_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scraper/requests/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let history = api_for(&server).history(&credentials()).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn history_parses_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scraper/requests/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "publicId": "r1",
                "query": "Engineer",
                "location": "Toronto",
                "maxPages": 3,
                "customOptions": {"remote": "yes"},
                "created": "2024-05-01T10:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let history = api_for(&server).history(&credentials()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query.as_deref(), Some("Engineer"));
    assert_eq!(history[0].max_pages, Some(3));
    assert_eq!(
        history[0].custom_options_label().as_deref(),
        Some("remote: yes")
    );
}

#[tokio::test]
async fn history_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scraper/requests/my"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api_for(&server).history(&credentials()).await.unwrap_err();
    assert_eq!(err.kind, ApiFailure::InvalidResponse);
}

#[tokio::test]
async fn clear_history_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/scraper/requests/my"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server).clear_history(&credentials()).await.unwrap();
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let settings = ApiSettings::with_base_url("https://example.com/backend/").unwrap();
    let url = settings.endpoint(&["api", "scraper", "stream", "user 1"]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://example.com/backend/api/scraper/stream/user%201"
    );
}

#[test]
fn rejects_non_hierarchical_base_url() {
    assert!(ApiSettings::with_base_url("mailto:someone@example.com").is_err());
    assert!(ApiSettings::with_base_url("not a url").is_err());
}
