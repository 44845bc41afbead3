//! Integration tests for runlab-cs API endpoints
//!
//! Tests cover:
//! - Upsert create/replace/idempotence through `POST /v1/runs`
//! - Point reads, latest, and list ordering
//! - API key enforcement ahead of validation
//! - Validation failures leaving the store untouched

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use runlab_cs::{build_router, db, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const API_KEY: &str = "test-secret";

/// Test helper: app backed by a fresh SQLite file
async fn create_test_app() -> (Router, SqlitePool, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("runs.db").display());
    let pool = db::init_database(&url)
        .await
        .expect("Failed to initialize database");

    let app = build_router(AppState::new(pool.clone(), API_KEY));
    (app, pool, dir)
}

fn post_run(body: &Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/runs")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: send request, return status and JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

async fn run_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM runs")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn run_a() -> Value {
    json!({
        "id": "A",
        "items_processed": 120,
        "composition": [
            {"material": "PET", "percentage": 62.5},
            {"material": "HDPE", "percentage": 30.0},
            {"material": "PP", "percentage": 7.5}
        ]
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _pool, _dir) = create_test_app().await;

    let (status, body) = send(&app, get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

// =============================================================================
// Upsert
// =============================================================================

#[tokio::test]
async fn test_upsert_echoes_payload() {
    let (app, _pool, _dir) = create_test_app().await;

    let (status, body) = send(&app, post_run(&run_a(), Some(API_KEY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, run_a());
}

#[tokio::test]
async fn test_upsert_then_get_round_trips() {
    let (app, _pool, _dir) = create_test_app().await;

    send(&app, post_run(&run_a(), Some(API_KEY))).await;
    let (status, body) = send(&app, get("/v1/runs/A")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, run_a());
}

#[tokio::test]
async fn test_upsert_replaces_composition() {
    let (app, pool, _dir) = create_test_app().await;

    send(&app, post_run(&run_a(), Some(API_KEY))).await;

    let replacement = json!({
        "id": "A",
        "items_processed": 80,
        "composition": [{"material": "Glass", "percentage": 100.0}]
    });
    let (status, _) = send(&app, post_run(&replacement, Some(API_KEY))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/v1/runs/A")).await;
    assert_eq!(body, replacement);

    // No stale rows left behind
    let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM composition_entries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entries, 1);
    assert_eq!(run_count(&pool).await, 1);
}

#[tokio::test]
async fn test_upsert_with_empty_composition_clears_entries() {
    let (app, _pool, _dir) = create_test_app().await;

    send(&app, post_run(&run_a(), Some(API_KEY))).await;
    let cleared = json!({"id": "A", "items_processed": 0, "composition": []});
    send(&app, post_run(&cleared, Some(API_KEY))).await;

    let (_, body) = send(&app, get("/v1/runs/A")).await;
    assert_eq!(body, cleared);
}

#[tokio::test]
async fn test_upsert_twice_is_idempotent() {
    let (app, pool, _dir) = create_test_app().await;

    send(&app, post_run(&run_a(), Some(API_KEY))).await;
    let (_, first) = send(&app, get("/v1/runs/A")).await;
    let first_pk: i64 = sqlx::query_scalar("SELECT pk FROM runs WHERE run_id = 'A'")
        .fetch_one(&pool)
        .await
        .unwrap();

    send(&app, post_run(&run_a(), Some(API_KEY))).await;
    let (_, second) = send(&app, get("/v1/runs/A")).await;
    let second_pk: i64 = sqlx::query_scalar("SELECT pk FROM runs WHERE run_id = 'A'")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first_pk, second_pk);
    assert_eq!(run_count(&pool).await, 1);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_upsert_without_key_rejected() {
    let (app, pool, _dir) = create_test_app().await;

    let (status, body) = send(&app, post_run(&run_a(), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(run_count(&pool).await, 0);
}

#[tokio::test]
async fn test_upsert_with_wrong_key_rejected() {
    let (app, pool, _dir) = create_test_app().await;

    let (status, _) = send(&app, post_run(&run_a(), Some("wrong"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(run_count(&pool).await, 0);
}

#[tokio::test]
async fn test_auth_checked_before_validation() {
    let (app, _pool, _dir) = create_test_app().await;

    let invalid = json!({"id": "", "items_processed": -1, "composition": []});
    let (status, _) = send(&app, post_run(&invalid, Some("wrong"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reads_do_not_require_key() {
    let (app, _pool, _dir) = create_test_app().await;
    send(&app, post_run(&run_a(), Some(API_KEY))).await;

    for uri in ["/v1/runs", "/v1/runs/latest", "/v1/runs/A"] {
        let (status, _) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "GET {} should be public", uri);
    }
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_percentage_out_of_range_rejected_before_store() {
    let (app, pool, _dir) = create_test_app().await;

    let bad = json!({
        "id": "A",
        "items_processed": 1,
        "composition": [{"material": "PET", "percentage": 150}]
    });
    let (status, body) = send(&app, post_run(&bad, Some(API_KEY))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("composition[0].percentage"));
    assert_eq!(run_count(&pool).await, 0);
}

#[tokio::test]
async fn test_invalid_update_keeps_previous_state() {
    let (app, _pool, _dir) = create_test_app().await;
    send(&app, post_run(&run_a(), Some(API_KEY))).await;

    let bad = json!({
        "id": "A",
        "items_processed": 1,
        "composition": [{"material": "PET", "percentage": 150}]
    });
    send(&app, post_run(&bad, Some(API_KEY))).await;

    let (_, body) = send(&app, get("/v1/runs/A")).await;
    assert_eq!(body, run_a());
}

#[tokio::test]
async fn test_reserved_id_rejected() {
    let (app, pool, _dir) = create_test_app().await;

    let body = json!({"id": "latest", "items_processed": 1, "composition": []});
    let (status, response) = send(&app, post_run(&body, Some(API_KEY))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(run_count(&pool).await, 0);
}

#[tokio::test]
async fn test_negative_count_rejected() {
    let (app, _pool, _dir) = create_test_app().await;

    let bad = json!({"id": "A", "items_processed": -3, "composition": []});
    let (status, _) = send(&app, post_run(&bad, Some(API_KEY))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_field_rejected() {
    let (app, _pool, _dir) = create_test_app().await;

    let bad = json!({"id": "A", "composition": []});
    let (status, body) = send(&app, post_run(&bad, Some(API_KEY))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (app, _pool, _dir) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/runs")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_get_unknown_run_not_found() {
    let (app, _pool, _dir) = create_test_app().await;

    let (status, body) = send(&app, get("/v1/runs/never-submitted")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_latest_on_empty_store_not_found() {
    let (app, _pool, _dir) = create_test_app().await;

    let (status, _) = send(&app, get("/v1/runs/latest")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_latest_follows_insertion_order() {
    let (app, _pool, _dir) = create_test_app().await;

    let run_b = json!({
        "id": "B",
        "items_processed": 5,
        "composition": [{"material": "Steel", "percentage": 100}]
    });
    send(&app, post_run(&run_a(), Some(API_KEY))).await;
    send(&app, post_run(&run_b, Some(API_KEY))).await;

    let (status, body) = send(&app, get("/v1/runs/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "B");
    assert_eq!(body["items_processed"], 5);

    // Updating A does not make it the latest
    send(&app, post_run(&run_a(), Some(API_KEY))).await;
    let (_, body) = send(&app, get("/v1/runs/latest")).await;
    assert_eq!(body["id"], "B");
}

#[tokio::test]
async fn test_list_newest_first_without_composition() {
    let (app, _pool, _dir) = create_test_app().await;

    for (id, count) in [("r1", 1), ("r2", 2), ("r3", 3)] {
        let body = json!({"id": id, "items_processed": count, "composition": []});
        send(&app, post_run(&body, Some(API_KEY))).await;
    }

    let (status, body) = send(&app, get("/v1/runs")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": "r3", "items_processed": 3},
            {"id": "r2", "items_processed": 2},
            {"id": "r1", "items_processed": 1}
        ])
    );
}

#[tokio::test]
async fn test_list_respects_limit() {
    let (app, _pool, _dir) = create_test_app().await;

    for i in 0..5 {
        let body = json!({"id": format!("r{}", i), "items_processed": i, "composition": []});
        send(&app, post_run(&body, Some(API_KEY))).await;
    }

    let (_, body) = send(&app, get("/v1/runs?limit=2")).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();

    assert_eq!(ids, vec!["r4", "r3"]);
}

#[tokio::test]
async fn test_list_defaults_to_fifty_newest() {
    let (app, _pool, _dir) = create_test_app().await;

    for i in 0..51 {
        let body = json!({"id": format!("r{}", i), "items_processed": i, "composition": []});
        let (status, _) = send(&app, post_run(&body, Some(API_KEY))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/v1/runs")).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (1..51).rev().map(|i| format!("r{}", i)).collect();

    assert_eq!(ids.len(), 50);
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_list_rejects_bad_limit() {
    let (app, _pool, _dir) = create_test_app().await;

    let (status, _) = send(&app, get("/v1/runs?limit=0")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, get("/v1/runs?limit=abc")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let (app, _pool, _dir) = create_test_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/v1/runs")
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
