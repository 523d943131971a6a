//! HTTP API behaviour tests
//!
//! Drives the full router (CORS, request logging, fallback included) against
//! an in-memory store.

use std::sync::Arc;

use afterschool::http_server::{AppState, HttpServer, HttpServerConfig};
use afterschool::storage::{
    connect, BoxFuture, DocumentBackend, DocumentId, Mutation, Predicate, StorageError,
    StorageHandle, StorageResult, UpdateResult,
};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// Test Utilities
// =============================================================================

fn seed_lessons() -> Vec<Value> {
    vec![
        json!({"topic": "Mathematics", "location": "Hendon", "price": 100, "space": 5}),
        json!({"topic": "Science", "location": "Math Lab", "price": 90, "space": 5}),
        json!({"topic": "Chemistry", "location": "Colindale", "price": 95, "space": 5}),
        json!({"topic": "Art", "location": "Brent Cross", "price": 80, "space": 2, "image": "art.png"}),
    ]
}

async fn seeded_storage() -> (StorageHandle, Vec<DocumentId>) {
    let storage = StorageHandle::in_memory("afterschool");
    let ids = storage.lessons().insert_many(seed_lessons()).await.unwrap();
    (storage, ids)
}

fn app(storage: &StorageHandle) -> Router {
    app_with(AppState::new(storage.clone()), &HttpServerConfig::default())
}

fn app_with(state: AppState, config: &HttpServerConfig) -> Router {
    HttpServer::build_router(config, Arc::new(state))
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// A backend whose every operation fails, as when the disk goes away.
struct FailingBackend;

fn disk_unavailable() -> StorageError {
    StorageError::io_error_no_source("disk unavailable")
}

impl DocumentBackend for FailingBackend {
    fn kind(&self) -> &'static str {
        "failing"
    }

    fn find<'a>(
        &'a self,
        _collection: &'a str,
        _predicate: &'a Predicate,
    ) -> BoxFuture<'a, StorageResult<Vec<Value>>> {
        Box::pin(async { Err(disk_unavailable()) })
    }

    fn insert_one<'a>(
        &'a self,
        _collection: &'a str,
        _document: Value,
    ) -> BoxFuture<'a, StorageResult<DocumentId>> {
        Box::pin(async { Err(disk_unavailable()) })
    }

    fn update_one<'a>(
        &'a self,
        _collection: &'a str,
        _mutation: &'a Mutation,
    ) -> BoxFuture<'a, StorageResult<UpdateResult>> {
        Box::pin(async { Err(disk_unavailable()) })
    }

    fn count<'a>(&'a self, _collection: &'a str) -> BoxFuture<'a, StorageResult<usize>> {
        Box::pin(async { Err(disk_unavailable()) })
    }
}

fn topics(lessons: &Value) -> Vec<String> {
    let mut topics: Vec<String> = lessons
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["topic"].as_str().unwrap().to_string())
        .collect();
    topics.sort();
    topics
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_returns_seeded_set() {
    let (storage, ids) = seeded_storage().await;

    let (status, body) = send(app(&storage), Method::GET, "/lessons", None).await;

    assert_eq!(status, StatusCode::OK);
    let lessons = body.as_array().unwrap();
    assert_eq!(lessons.len(), 4);
    for id in &ids {
        assert!(lessons.iter().any(|l| l["_id"] == id.to_string()));
    }
    assert_eq!(topics(&body), vec!["Art", "Chemistry", "Mathematics", "Science"]);
    let art = lessons.iter().find(|l| l["topic"] == "Art").unwrap();
    assert_eq!(art["image"], "art.png");
}

#[tokio::test]
async fn test_list_empty_catalog() {
    let storage = StorageHandle::in_memory("afterschool");
    let (status, body) = send(app(&storage), Method::GET, "/lessons", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_matches_topic_or_location() {
    let (storage, _) = seeded_storage().await;

    let (status, body) = send(app(&storage), Method::GET, "/search?q=math", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(topics(&body), vec!["Mathematics", "Science"]);
}

#[tokio::test]
async fn test_search_is_literal() {
    let (storage, _) = seeded_storage().await;

    let (status, body) = send(app(&storage), Method::GET, "/search?q=.*", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_search_url_encoded_term() {
    let (storage, _) = seeded_storage().await;

    let (_, body) = send(app(&storage), Method::GET, "/search?q=brent%20CROSS", None).await;

    assert_eq!(topics(&body), vec!["Art"]);
}

#[tokio::test]
async fn test_search_requires_query() {
    let (storage, _) = seeded_storage().await;

    for uri in ["/search", "/search?q=", "/search?other=1"] {
        let (status, body) = send(app(&storage), Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({"error": "Query parameter required"}));
    }
}

#[tokio::test]
async fn test_search_repeated_query_is_client_error() {
    let (storage, _) = seeded_storage().await;

    let (status, body) = send(app(&storage), Method::GET, "/search?q=a&q=b", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));
}

// =============================================================================
// Update space
// =============================================================================

#[tokio::test]
async fn test_update_space_sets_only_space() {
    let (storage, ids) = seeded_storage().await;
    let id = ids[0];
    let before = storage.lessons().find_by_id(id).await.unwrap().unwrap();

    let (status, body) = send(
        app(&storage),
        Method::PUT,
        &format!("/lessons/{}", id),
        Some(json!({"space": 4})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Space updated successfully", "matchedCount": 1, "modifiedCount": 1})
    );

    let after = storage.lessons().find_by_id(id).await.unwrap().unwrap();
    let mut expected = before.clone();
    expected["space"] = json!(4);
    assert_eq!(after, expected);
}

#[tokio::test]
async fn test_update_space_is_idempotent() {
    let (storage, ids) = seeded_storage().await;
    let uri = format!("/lessons/{}", ids[1]);

    send(app(&storage), Method::PUT, &uri, Some(json!({"space": 3}))).await;
    let first = storage.lessons().find_all().await.unwrap();

    let (status, body) = send(app(&storage), Method::PUT, &uri, Some(json!({"space": 3}))).await;
    let second = storage.lessons().find_all().await.unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 0);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_update_unknown_id_is_generic_success() {
    let (storage, _) = seeded_storage().await;
    let before = storage.lessons().find_all().await.unwrap();

    let (status, body) = send(
        app(&storage),
        Method::PUT,
        &format!("/lessons/{}", DocumentId::generate()),
        Some(json!({"space": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Space updated successfully");
    assert_eq!(body["matchedCount"], 0);
    assert_eq!(storage.lessons().find_all().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_unknown_id_rejected_when_configured() {
    let (storage, _) = seeded_storage().await;
    let state = AppState::new(storage.clone()).with_reject_unmatched_updates(true);
    let missing = DocumentId::generate();

    let (status, body) = send(
        app_with(state, &HttpServerConfig::default()),
        Method::PUT,
        &format!("/lessons/{}", missing),
        Some(json!({"space": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": format!("Lesson {} not found", missing)}));
}

#[tokio::test]
async fn test_update_malformed_id_is_client_error() {
    let (storage, _) = seeded_storage().await;
    let before = storage.lessons().find_all().await.unwrap();

    let (status, body) = send(
        app(&storage),
        Method::PUT,
        "/lessons/not-an-id",
        Some(json!({"space": 4})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Malformed id"));
    assert_eq!(storage.lessons().find_all().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_undecodable_id_is_json_error() {
    let (storage, _) = seeded_storage().await;
    let before = storage.lessons().find_all().await.unwrap();

    let (status, body) = send(
        app(&storage),
        Method::PUT,
        "/lessons/%FF",
        Some(json!({"space": 4})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path"));
    assert_eq!(storage.lessons().find_all().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_rejects_bad_space() {
    let (storage, ids) = seeded_storage().await;
    let uri = format!("/lessons/{}", ids[0]);

    for body in [json!({}), json!({"space": -1}), json!({"space": 1.5}), json!({"space": "4"})] {
        let (status, response) = send(app(&storage), Method::PUT, &uri, Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert!(response["error"].as_str().unwrap().starts_with("Invalid space"));
    }

    let lesson = storage.lessons().find_by_id(ids[0]).await.unwrap().unwrap();
    assert_eq!(lesson["space"], 5);
}

#[tokio::test]
async fn test_update_rejects_non_json_body() {
    let (storage, ids) = seeded_storage().await;
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/lessons/{}", ids[0]))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{space: 4"))
        .unwrap();

    let response = app(&storage).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_insert_order_stores_verbatim() {
    let storage = StorageHandle::in_memory("afterschool");
    let order = json!({"name": "Alice", "lessons": ["id1"], "quantity": 2});

    let (status, body) = send(app(&storage), Method::POST, "/orders", Some(order.clone())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["acknowledged"], true);
    let id = DocumentId::parse(body["insertedId"].as_str().unwrap()).unwrap();

    assert_eq!(storage.orders().count().await.unwrap(), 1);
    let mut stored = storage.orders().find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored["_id"], id.to_string());
    stored.as_object_mut().unwrap().remove("_id");
    assert_eq!(stored, order);
}

#[tokio::test]
async fn test_insert_order_keeps_explicit_nulls() {
    let storage = StorageHandle::in_memory("afterschool");
    let order = json!({"name": "Bob", "phone": null, "lessons": ["id1"], "quantity": null});

    let (status, body) = send(app(&storage), Method::POST, "/orders", Some(order.clone())).await;

    assert_eq!(status, StatusCode::CREATED);
    let id = DocumentId::parse(body["insertedId"].as_str().unwrap()).unwrap();
    let mut stored = storage.orders().find_by_id(id).await.unwrap().unwrap();
    stored.as_object_mut().unwrap().remove("_id");
    assert_eq!(stored, order);
}

#[tokio::test]
async fn test_insert_order_rejects_bad_shape() {
    let storage = StorageHandle::in_memory("afterschool");

    for order in [
        json!({"lessons": ["id1"]}),
        json!({"name": "Alice", "lessons": []}),
        json!({"name": "Alice", "lessons": ["id1"], "quantity": -1}),
        json!(["Alice"]),
    ] {
        let (status, body) = send(app(&storage), Method::POST, "/orders", Some(order.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", order);
        assert!(body["error"].is_string());
    }
    assert_eq!(storage.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_order_requires_json_content_type() {
    let storage = StorageHandle::in_memory("afterschool");
    let request = Request::builder()
        .method(Method::POST)
        .uri("/orders")
        .body(Body::from(r#"{"name":"Alice","lessons":["id1"]}"#))
        .unwrap();

    let response = app(&storage).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(storage.orders().count().await.unwrap(), 0);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_updates_to_one_lesson() {
    let dir = TempDir::new().unwrap();
    let target = format!("file://{}", dir.path().display());
    let storage = connect(&target, "afterschool").await.unwrap();
    let ids = storage.lessons().insert_many(seed_lessons()).await.unwrap();
    let uri = format!("/lessons/{}", ids[0]);
    let router = app(&storage);

    let (first, second) = tokio::join!(
        send(router.clone(), Method::PUT, &uri, Some(json!({"space": 3}))),
        send(router.clone(), Method::PUT, &uri, Some(json!({"space": 1}))),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);
    assert_eq!(first.1["matchedCount"], 1);
    assert_eq!(second.1["matchedCount"], 1);

    let live = storage.lessons().find_by_id(ids[0]).await.unwrap().unwrap();
    assert!(live["space"] == 3 || live["space"] == 1, "{}", live);
    drop(router);
    drop(storage);

    let reopened = connect(&target, "afterschool").await.unwrap();
    let replayed = reopened.lessons().find_by_id(ids[0]).await.unwrap().unwrap();
    assert_eq!(replayed, live);
}

// =============================================================================
// Storage failures
// =============================================================================

fn failing_app() -> Router {
    let storage = StorageHandle::with_backend("afterschool", Arc::new(FailingBackend));
    app(&storage)
}

#[tokio::test]
async fn test_storage_failure_is_server_error_on_every_route() {
    let expected = json!({"error": disk_unavailable().to_string()});
    let lesson_uri = format!("/lessons/{}", DocumentId::generate());
    let requests = [
        (Method::GET, "/lessons", None),
        (Method::GET, "/search?q=math", None),
        (Method::PUT, lesson_uri.as_str(), Some(json!({"space": 2}))),
        (
            Method::POST,
            "/orders",
            Some(json!({"name": "Alice", "lessons": ["id1"]})),
        ),
    ];

    for (method, uri, body) in requests {
        let (status, response) = send(failing_app(), method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(response, expected, "{} {}", method, uri);
    }
}

// =============================================================================
// Health, images, fallback
// =============================================================================

#[tokio::test]
async fn test_health() {
    let storage = StorageHandle::in_memory("afterschool");
    let (status, body) = send(app(&storage), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "afterschool");
}

#[tokio::test]
async fn test_images_served_and_missing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("math.png"), b"png-bytes").unwrap();
    let config = HttpServerConfig {
        images_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let state = AppState::new(StorageHandle::in_memory("afterschool"));
    let router = app_with(state, &config);

    let (status, body) = send(router.clone(), Method::GET, "/images/math.png", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("png-bytes".to_string()));

    let (status, body) = send(router, Method::GET, "/images/missing.png", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::String("Image not found".to_string()));
}

#[tokio::test]
async fn test_unknown_route() {
    let storage = StorageHandle::in_memory("afterschool");
    let (status, body) = send(app(&storage), Method::GET, "/teachers", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Route not found: /teachers"}));
}
