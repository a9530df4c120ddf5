//! Gemini Backend Contract Tests
//!
//! These tests verify the HTTP contract of the Gemini backend against a
//! mock server: request path, auth header, request body shape, response
//! parsing with grounding citations, and status-code error mapping. The
//! last tests drive whole batches through the dispatcher.

use std::time::Duration;

use finder_search::{
    CachedExtractor, ExtractConfig, Extractor, GeminiExtractor, ProgressStatus, SearchError,
    SearchItem, dispatch, normalize,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

fn config(server: &MockServer) -> ExtractConfig {
    ExtractConfig {
        base_url: server.uri(),
        ..ExtractConfig::default()
    }
}

fn extractor(server: &MockServer) -> GeminiExtractor {
    GeminiExtractor::new("test-key", &config(server)).expect("extractor")
}

fn iit_delhi() -> SearchItem {
    SearchItem::new("1", "IIT Delhi", "Delhi", Some("South Delhi".into()))
}

fn reply(record: Value) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": record.to_string() }]
            },
            "finishReason": "STOP",
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://home.iitd.ac.in", "title": "IIT Delhi" } },
                    { "web": { "uri": "not a url", "title": "Broken" } },
                    { "web": { "uri": "https://nirfindia.org" } }
                ]
            }
        }]
    })
}

fn iit_delhi_record() -> Value {
    json!({
        "collegeName": "Indian Institute of Technology Delhi",
        "state": "Delhi",
        "district": "South Delhi",
        "collegeType": "Government",
        "coursesOffered": ["B.Tech", "M.Tech", "PhD"],
        "officialWebsite": "home.iitd.ac.in",
        "yearOfEstablishment": 1961,
        "pinCode": "110016",
        "confidenceScore": 90
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Request Format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn request_targets_model_endpoint_with_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" },
            "tools": [{ "google_search": {} }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(iit_delhi_record())))
        .expect(1)
        .mount(&server)
        .await;

    let result = extractor(&server).extract(&iit_delhi()).await;
    assert!(result.is_ok(), "request should match: {result:?}");
}

#[tokio::test]
async fn request_prompt_and_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(iit_delhi_record())))
        .mount(&server)
        .await;

    extractor(&server)
        .extract(&iit_delhi())
        .await
        .expect("extract");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text");
    assert!(prompt.contains("IIT Delhi, South Delhi, Delhi"));
    assert!(prompt.contains("Do not infer or guess"));
    assert!(prompt.contains("Not Available"));

    let schema = &body["generationConfig"]["responseSchema"];
    assert_eq!(schema["type"], "OBJECT");
    assert_eq!(schema["properties"]["coursesOffered"]["type"], "ARRAY");
    assert_eq!(
        schema["required"],
        json!(["collegeName", "state", "confidenceScore"])
    );
}

#[tokio::test]
async fn web_search_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(iit_delhi_record())))
        .mount(&server)
        .await;

    let config = ExtractConfig {
        web_search: false,
        ..config(&server)
    };
    let extractor = GeminiExtractor::new("test-key", &config).expect("extractor");
    extractor.extract(&iit_delhi()).await.expect("extract");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert!(body.get("tools").is_none());
}

// ────────────────────────────────────────────────────────────────────────────
// Response Parsing
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn response_parsed_with_defaults_and_citations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(iit_delhi_record())))
        .mount(&server)
        .await;

    let record = extractor(&server)
        .extract(&iit_delhi())
        .await
        .expect("extract");

    assert_eq!(record.college_name, "Indian Institute of Technology Delhi");
    assert_eq!(record.confidence_score, 90);
    assert_eq!(record.courses_offered, vec!["B.Tech", "M.Tech", "PhD"]);
    assert_eq!(record.year_of_establishment, "1961");
    assert_eq!(record.principal_email, "Not Available");
    assert!(record.error.is_none());

    let uris: Vec<_> = record.sources.iter().map(|c| c.uri.as_str()).collect();
    assert_eq!(uris, vec!["https://home.iitd.ac.in", "https://nirfindia.org"]);
    assert_eq!(record.sources[1].title, "Source");
}

#[tokio::test]
async fn empty_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = extractor(&server).extract(&iit_delhi()).await.unwrap_err();
    assert!(matches!(err, SearchError::EmptyResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn non_json_candidate_text_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I could not find that college." }] } }]
        })))
        .mount(&server)
        .await;

    let err = extractor(&server).extract(&iit_delhi()).await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)), "got {err:?}");
}

// ────────────────────────────────────────────────────────────────────────────
// Error Mapping
// ────────────────────────────────────────────────────────────────────────────

async fn status_error(status: u16) -> SearchError {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": status, "message": "upstream says no" }
        })))
        .mount(&server)
        .await;
    extractor(&server).extract(&iit_delhi()).await.unwrap_err()
}

#[tokio::test]
async fn forbidden_maps_to_auth() {
    let err = status_error(403).await;
    assert!(matches!(err, SearchError::Auth(_)), "got {err:?}");
    assert!(err.to_string().contains("upstream says no"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let err = status_error(429).await;
    assert!(matches!(err, SearchError::RateLimited(_)), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn server_error_maps_to_http() {
    let err = status_error(500).await;
    assert!(err.to_string().starts_with("HTTP error: Gemini HTTP 500"));
}

#[tokio::test]
async fn slow_reply_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply(iit_delhi_record()))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ExtractConfig {
        timeout_seconds: 1,
        ..config(&server)
    };
    let extractor = GeminiExtractor::new("test-key", &config).expect("extractor");
    let err = extractor.extract(&iit_delhi()).await.unwrap_err();
    assert!(matches!(err, SearchError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn normalize_turns_http_failure_into_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let record = normalize(&extractor(&server), &iit_delhi()).await;
    assert!(record.is_error());
    assert_eq!(record.college_name, "IIT Delhi");
    assert_eq!(record.district, "South Delhi");
    assert_eq!(record.confidence_score, 0);
    assert!(record.sources.is_empty());
    assert!(record.error.as_deref().unwrap_or_default().starts_with("authentication failed"));
}

// ────────────────────────────────────────────────────────────────────────────
// Batches
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_with_one_success_and_one_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_string_contains("IIT Delhi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(iit_delhi_record())))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_string_contains("XYZ Fake College"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "no such institution" }] } }]
        })))
        .mount(&server)
        .await;

    let items = vec![
        iit_delhi(),
        SearchItem::new("2", "XYZ Fake College", "Goa", None),
    ];
    let outcome = dispatch(items, &extractor(&server), 8, None)
        .await
        .expect("dispatch");

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.progress.total, 2);
    assert_eq!(outcome.progress.completed, 2);
    assert_eq!(outcome.progress.status, ProgressStatus::Completed);

    let ok = outcome
        .records
        .iter()
        .find(|r| !r.is_error())
        .expect("success record");
    assert_eq!(ok.confidence_score, 90);
    let failed = outcome
        .records
        .iter()
        .find(|r| r.is_error())
        .expect("sentinel record");
    assert_eq!(failed.college_name, "XYZ Fake College");
    assert_eq!(failed.confidence_score, 0);
}

#[tokio::test]
async fn cache_serves_repeated_items() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(iit_delhi_record())))
        .expect(1)
        .mount(&server)
        .await;

    let cached = CachedExtractor::new(extractor(&server), 600);
    let first = cached.extract(&iit_delhi()).await.expect("first");
    let again = SearchItem::new("9", "  iit   delhi ", "DELHI", Some("south delhi".into()));
    let second = cached.extract(&again).await.expect("second");
    assert_eq!(first, second);
}
