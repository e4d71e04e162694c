//! Integration tests for delivery recording
//!
//! The receipt commit is the one multi-row write in the system, so the
//! transactional guarantees get their own suite: atomic header+lines,
//! folio allocation and uniqueness, and validation before any write.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use dideco_server::{build_router, AppState};

async fn setup_test_db() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let pool = dideco_common::db::init_database(&dir.path().join("dideco.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db, None))
}

fn delivery_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/deliveries")
        .header("content-type", "application/json")
        .header("x-username", "admin")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_delivery() -> Value {
    json!({
        "beneficiaryRut": "12.345.678-5",
        "beneficiaryName": "Maria Soto",
        "date": "2026-04-15",
        "professionalRut": "11.111.111-1",
        "professionalName": "Ana Reyes",
        "observations": "Entrega mensual",
        "aidType": "Alimentos",
        "items": [
            { "name": "Caja de mercaderia", "quantity": 1, "value": 15000, "category": "Alimentos" },
            { "name": "Frazada", "quantity": 2, "value": 8000, "detail": "Polar" }
        ]
    })
}

#[tokio::test]
async fn test_delivery_commits_header_and_all_lines() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let response = app.oneshot(delivery_request(sample_delivery())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let data = &body["data"];
    assert_eq!(data["folio"], 1001);
    assert_eq!(data["beneficiaryRut"], "12.345.678-5");
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    // 1 * 15000 + 2 * 8000
    assert_eq!(data["totalValue"], 31000);

    let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delivery_lines WHERE folio = 1001")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(lines, 2);
}

#[tokio::test]
async fn test_folios_are_sequential_from_configured_start() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    for expected_folio in [1001, 1002, 1003] {
        let response = app
            .clone()
            .oneshot(delivery_request(sample_delivery()))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["data"]["folio"], expected_folio);
    }
}

#[tokio::test]
async fn test_folio_start_setting_is_honored() {
    let (_dir, db) = setup_test_db().await;
    sqlx::query("UPDATE settings SET value = '5000' WHERE key = 'folio_start'")
        .execute(&db)
        .await
        .unwrap();
    let app = setup_app(db);

    let response = app.oneshot(delivery_request(sample_delivery())).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["folio"], 5000);
}

#[tokio::test]
async fn test_empty_item_list_rejected_before_any_write() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let mut payload = sample_delivery();
    payload["items"] = json!([]);

    let response = app.oneshot(delivery_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(headers, 0);
}

#[tokio::test]
async fn test_missing_beneficiary_rejected_before_any_write() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let mut payload = sample_delivery();
    payload["beneficiaryRut"] = json!("  ");

    let response = app.oneshot(delivery_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().to_lowercase().contains("beneficiary"));

    let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(headers, 0);
}

#[tokio::test]
async fn test_malformed_item_rejected_without_partial_write() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let mut payload = sample_delivery();
    payload["items"][1]["quantity"] = json!(0);

    let response = app.oneshot(delivery_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(headers, 0, "No header may exist for a rejected delivery");
}

#[tokio::test]
async fn test_line_insert_failure_rolls_back_header() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    // Force the line insert to fail mid-transaction
    sqlx::query("DROP TABLE delivery_lines").execute(&db).await.unwrap();

    let response = app.oneshot(delivery_request(sample_delivery())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let headers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(headers, 0, "Header must roll back when a line fails");
}

#[tokio::test]
async fn test_receiver_defaults_to_beneficiary_name() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .clone()
        .oneshot(delivery_request(sample_delivery()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["receiverName"], "Maria Soto");

    // An explicit receiver (someone else picking up) wins
    let mut payload = sample_delivery();
    payload["receiverName"] = json!("Carlos Soto");
    let response = app.oneshot(delivery_request(payload)).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["receiverName"], "Carlos Soto");
}

#[tokio::test]
async fn test_racing_submissions_never_share_a_folio() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(delivery_request(sample_delivery())).await.unwrap()
        }));
    }
    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (total, distinct): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(DISTINCT folio) FROM deliveries")
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(total, 8);
    assert_eq!(distinct, 8, "Folios must be unique under concurrency");
}

#[tokio::test]
async fn test_listing_returns_full_receipts_newest_first() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    app.clone().oneshot(delivery_request(sample_delivery())).await.unwrap();
    app.clone().oneshot(delivery_request(sample_delivery())).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/api/deliveries")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["folio"], 1002);
    assert_eq!(records[1]["folio"], 1001);
    assert_eq!(records[0]["items"].as_array().unwrap().len(), 2);
}
