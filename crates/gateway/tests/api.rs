//! Integration tests for the gateway REST API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use paperdash_common::{
    config::AppConfig,
    errors::{AppError, Result},
    papers::{PaperService, StaticSource},
    ratings::{RatingStore, DEFAULT_RATINGS_KEY},
    storage::{DurableSlot, FileSlot, MemorySlot},
};
use paperdash_gateway::{create_router, AppState, PROCESS_TIME_HEADER};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const FIRST_PAPER: &str = "http%3A%2F%2Farxiv.org%2Fabs%2F2411.13563v1";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = "memory".into();
    config.fetch.delay_ms = 0;
    config.chat.reply_delay_ms = 0;
    config
}

fn make_state(slot: Arc<dyn DurableSlot>) -> AppState {
    let ratings = RatingStore::load(slot, DEFAULT_RATINGS_KEY);
    let papers = PaperService::new(Arc::new(StaticSource::bundled().unwrap()), Duration::ZERO);
    AppState::new(test_config(), ratings, papers)
}

fn memory_state() -> AppState {
    make_state(Arc::new(MemorySlot::new()))
}

/// Slot whose backend is gone: every operation fails
struct UnreachableSlot;

impl DurableSlot for UnreachableSlot {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(AppError::Storage {
            message: "slot unreachable".to_string(),
        })
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(AppError::Storage {
            message: "slot unreachable".to_string(),
        })
    }

    fn remove(&self, _key: &str) -> Result<bool> {
        Err(AppError::Storage {
            message: "slot unreachable".to_string(),
        })
    }
}

async fn send_request(state: AppState, request: Request<Body>) -> Response {
    let app = create_router(state);
    ServiceExt::<Request<Body>>::oneshot(app, request)
        .await
        .unwrap()
}

async fn send(
    state: AppState,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let resp = send_request(state, builder.body(body).unwrap()).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// --- health ---

#[tokio::test]
async fn test_health() {
    let (status, json) = send(memory_state(), "GET", "/v2/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_checks() {
    let (status, json) = send(memory_state(), "GET", "/v2/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["paper_source"]["status"], "up");
    assert_eq!(json["checks"]["rating_store"]["status"], "up");
}

#[tokio::test]
async fn test_from_config_builds_state() {
    let state = AppState::from_config(test_config()).unwrap();
    let (status, json) = send(state, "GET", "/v2/papers?max_results=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_results"], 2);
}

#[tokio::test]
async fn test_ready_reports_unreachable_rating_slot() {
    let (status, json) = send(make_state(Arc::new(UnreachableSlot)), "GET", "/v2/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "not_ready");
    assert_eq!(json["checks"]["paper_source"]["status"], "up");
    assert_eq!(json["checks"]["rating_store"]["status"], "down");
    assert!(json["checks"]["rating_store"]["error"]
        .as_str()
        .unwrap()
        .contains("slot unreachable"));
}

#[tokio::test]
async fn test_failed_rating_write_is_not_served() {
    let state = make_state(Arc::new(UnreachableSlot));
    let (status, json) = send(
        state.clone(),
        "PUT",
        "/v2/ratings/p1",
        Some(serde_json::json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["code"], "STORAGE_ERROR");

    let (_, json) = send(state, "GET", "/v2/ratings/p1", None).await;
    assert_eq!(json["rating"], 3);
    assert_eq!(json["rated"], false);
}

// --- cross-cutting headers ---

#[tokio::test]
async fn test_process_time_header() {
    let request = Request::get("/v2/health").body(Body::empty()).unwrap();
    let resp = send_request(memory_state(), request).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let value = resp.headers()[PROCESS_TIME_HEADER].to_str().unwrap();
    let secs: f64 = value.parse().unwrap();
    assert!(secs >= 0.0);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/v2/papers")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .unwrap();
    let resp = send_request(memory_state(), request).await;

    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert!(headers["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("PUT"));
}

#[tokio::test]
async fn test_cors_rejects_other_origin() {
    let mut config = test_config();
    config.cors.origins = vec!["https://dash.example.org".into()];
    let state = AppState::new(
        config,
        RatingStore::load(Arc::new(MemorySlot::new()), DEFAULT_RATINGS_KEY),
        PaperService::new(Arc::new(StaticSource::bundled().unwrap()), Duration::ZERO),
    );

    let request = Request::get("/v2/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = send_request(state.clone(), request).await;
    assert!(!resp.headers().contains_key("access-control-allow-origin"));

    let request = Request::get("/v2/health")
        .header("origin", "https://dash.example.org")
        .body(Body::empty())
        .unwrap();
    let resp = send_request(state, request).await;
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "https://dash.example.org"
    );
}

// --- papers ---

#[tokio::test]
async fn test_papers_default_to_grid_size() {
    let (status, json) = send(memory_state(), "GET", "/v2/papers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_results"], 10);
    assert_eq!(json["papers"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_papers_are_enriched_in_order() {
    let (_, json) = send(memory_state(), "GET", "/v2/papers?max_results=5", None).await;
    let papers = json["papers"].as_array().unwrap();
    assert_eq!(papers.len(), 5);
    assert_eq!(papers[0]["id"], "http://arxiv.org/abs/2411.13563v1");
    assert_eq!(papers[1]["id"], "http://arxiv.org/abs/2411.13502v1");
    assert!(!papers[0]["summary"].as_str().unwrap().is_empty());
    assert_eq!(papers[3]["summary"], "");
    assert_eq!(papers[3]["insights"], "");
    assert!(papers[0].get("abstract").is_some());
}

#[tokio::test]
async fn test_papers_zero_and_overflow() {
    let (_, json) = send(memory_state(), "GET", "/v2/papers?max_results=0", None).await;
    assert_eq!(json["total_results"], 0);

    let (_, json) = send(memory_state(), "GET", "/v2/papers?max_results=40", None).await;
    assert_eq!(json["total_results"], 12);
}

#[tokio::test]
async fn test_papers_limit_enforced() {
    let (status, json) = send(memory_state(), "GET", "/v2/papers?max_results=1000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

// --- ratings ---

#[tokio::test]
async fn test_unrated_paper_is_neutral() {
    let (status, json) = send(memory_state(), "GET", "/v2/ratings/p1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["paperId"], "p1");
    assert_eq!(json["rating"], 3);
    assert_eq!(json["label"], "Neutral");
    assert_eq!(json["rated"], false);
}

#[tokio::test]
async fn test_update_and_read_rating() {
    let state = memory_state();
    let (status, json) = send(
        state.clone(),
        "PUT",
        "/v2/ratings/p1",
        Some(serde_json::json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rating"], 5);
    assert_eq!(json["label"], "Very Satisfied");
    assert_eq!(json["rated"], true);

    let (_, json) = send(state.clone(), "GET", "/v2/ratings/p1", None).await;
    assert_eq!(json["rating"], 5);

    let (_, json) = send(state, "GET", "/v2/ratings", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["paperId"], "p1");
}

#[tokio::test]
async fn test_rating_out_of_range_rejected() {
    let state = memory_state();
    let (status, json) = send(
        state.clone(),
        "PUT",
        "/v2/ratings/p1",
        Some(serde_json::json!({ "rating": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_RATING");

    let (_, json) = send(state, "GET", "/v2/ratings", None).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rating_for_url_id() {
    let state = memory_state();
    let uri = format!("/v2/ratings/{}", FIRST_PAPER);
    send(state.clone(), "PUT", &uri, Some(serde_json::json!({ "rating": 2 }))).await;

    let (_, json) = send(state, "GET", &uri, None).await;
    assert_eq!(json["paperId"], "http://arxiv.org/abs/2411.13563v1");
    assert_eq!(json["rating"], 2);
}

#[tokio::test]
async fn test_clear_ratings() {
    let slot = MemorySlot::new();
    let state = make_state(Arc::new(slot.clone()));
    send(state.clone(), "PUT", "/v2/ratings/p1", Some(serde_json::json!({ "rating": 1 }))).await;
    assert!(slot.contains(DEFAULT_RATINGS_KEY).unwrap());

    let (status, _) = send(state.clone(), "DELETE", "/v2/ratings", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!slot.contains(DEFAULT_RATINGS_KEY).unwrap());

    let (_, json) = send(state, "GET", "/v2/ratings", None).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ratings_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let state = make_state(Arc::new(FileSlot::new(dir.path())));
    send(state, "PUT", "/v2/ratings/p9", Some(serde_json::json!({ "rating": 4 }))).await;

    let restarted = make_state(Arc::new(FileSlot::new(dir.path())));
    let (_, json) = send(restarted, "GET", "/v2/ratings/p9", None).await;
    assert_eq!(json["rating"], 4);
    assert_eq!(json["rated"], true);
}

// --- chat ---

#[tokio::test]
async fn test_chat_first_turn() {
    let uri = format!("/v2/papers/{}/chat", FIRST_PAPER);
    let (status, json) = send(
        memory_state(),
        "POST",
        &uri,
        Some(serde_json::json!({ "message": "What is the main result?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages[0]["content"]
        .as_str()
        .unwrap()
        .contains("Magnetic Flux Emergence"));
    assert_eq!(messages[1]["sender"], "user");
    assert_eq!(
        json["reply"]["content"],
        "I'm analyzing the paper and will provide a response shortly..."
    );
}

#[tokio::test]
async fn test_chat_continues_transcript() {
    let uri = format!("/v2/papers/{}/chat", FIRST_PAPER);
    let (_, first) = send(
        memory_state(),
        "POST",
        &uri,
        Some(serde_json::json!({ "message": "Hello" })),
    )
    .await;

    let (_, second) = send(
        memory_state(),
        "POST",
        &uri,
        Some(serde_json::json!({ "message": "And then?", "messages": first["messages"] })),
    )
    .await;
    assert_eq!(second["messages"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_chat_blank_message() {
    let uri = format!("/v2/papers/{}/chat", FIRST_PAPER);
    let (status, json) = send(
        memory_state(),
        "POST",
        &uri,
        Some(serde_json::json!({ "message": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["reply"].is_null());
    assert_eq!(json["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_history_is_capped() {
    let uri = format!("/v2/papers/{}/chat", FIRST_PAPER);
    let history: Vec<serde_json::Value> = (0..201)
        .map(|i| {
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "content": format!("turn {}", i),
                "sender": "user",
                "timestamp": "2024-11-20T10:00:00Z"
            })
        })
        .collect();

    let (status, json) = send(
        memory_state(),
        "POST",
        &uri,
        Some(serde_json::json!({ "message": "hi", "messages": history })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "messages");
}

#[tokio::test]
async fn test_chat_unknown_paper() {
    let (status, json) = send(
        memory_state(),
        "POST",
        "/v2/papers/unknown/chat",
        Some(serde_json::json!({ "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "PAPER_NOT_FOUND");
}
