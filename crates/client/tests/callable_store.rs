//! Integration tests for `CallableStore`.
//!
//! Each test serves a fake `manageNotifications` callable from an
//! in-process axum server bound to an ephemeral port.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use innohub_client::{CallableStore, ClientConfig};
use innohub_core::types::UserId;
use innohub_notifications::{
    NotificationStore, NotificationSync, StoreError, StoreRequest, SyncPhase,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Fake callable
// ---------------------------------------------------------------------------

/// Requests received by the fake callable: (authorization header, body).
type Received = Arc<Mutex<Vec<(Option<String>, Value)>>>;

#[derive(Clone)]
struct Fake {
    received: Received,
    items: Arc<Mutex<Vec<Value>>>,
}

fn notification(id: &str, read: bool) -> Value {
    json!({
        "id": id,
        "type": "info",
        "title": format!("Title {id}"),
        "message": "message",
        "read": read,
        "createdAt": "2026-05-01T09:30:00Z",
    })
}

async fn manage_notifications(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.received.lock().unwrap().push((auth, body.clone()));

    let data = &body["data"];
    let mut items = fake.items.lock().unwrap();
    match data["action"].as_str() {
        Some("get") => {
            let unread = items.iter().filter(|n| n["read"] == false).count();
            (
                StatusCode::OK,
                Json(json!({ "result": { "items": items.clone(), "unreadCount": unread } })),
            )
        }
        Some("markRead") => {
            let id = data["notificationId"].as_str().unwrap_or_default();
            match items.iter_mut().find(|n| n["id"] == id) {
                Some(n) => {
                    n["read"] = json!(true);
                    (StatusCode::OK, Json(json!({ "result": { "success": true } })))
                }
                None => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": { "status": "NOT_FOUND", "message": "no such notification" } })),
                ),
            }
        }
        Some("delete") => (StatusCode::OK, Json(json!({ "result": { "success": false } }))),
        Some("getPreferences") => (StatusCode::OK, Json(json!({ "data": {} }))),
        Some("updatePreferences") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": "UNAUTHENTICATED", "message": "token expired" } })),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "status": "INTERNAL", "message": "boom" } })),
        ),
    }
}

/// Serve the fake callable and return its base URL and shared state.
async fn spawn_fake(items: Vec<Value>) -> (String, Fake) {
    let fake = Fake {
        received: Arc::default(),
        items: Arc::new(Mutex::new(items)),
    };
    let app = Router::new()
        .route("/manageNotifications", post(manage_notifications))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), fake)
}

fn store_for(base_url: &str) -> CallableStore {
    let config = ClientConfig {
        functions_url: base_url.to_string(),
        notifications_function: "manageNotifications".into(),
        id_token: Some("id-token-123".into()),
        request_timeout_secs: 5,
    };
    CallableStore::new(&config).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_wraps_request_in_data_and_sends_bearer_token() {
    let (url, fake) = spawn_fake(vec![notification("n1", false), notification("n2", true)]).await;
    let store = store_for(&url);

    let response = store.call(StoreRequest::Get).await.unwrap();

    assert_eq!(response.unread_count, Some(1));
    assert_eq!(response.items.map(|i| i.len()), Some(2));

    let received = fake.received.lock().unwrap();
    let (auth, body) = &received[0];
    assert_eq!(auth.as_deref(), Some("Bearer id-token-123"));
    assert_eq!(body, &json!({ "data": { "action": "get" } }));
}

#[tokio::test]
async fn error_envelope_maps_to_remote_error() {
    let (url, _fake) = spawn_fake(vec![]).await;
    let store = store_for(&url);

    let err = store
        .call(StoreRequest::MarkRead {
            notification_id: "missing".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Remote {
            status: 404,
            message: "no such notification".into()
        }
    );
}

#[tokio::test]
async fn unauthenticated_status_maps_to_unauthenticated() {
    let (url, _fake) = spawn_fake(vec![]).await;
    let store = store_for(&url);

    let err = store
        .call(StoreRequest::UpdatePreferences {
            preferences: Default::default(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Unauthenticated);
}

#[tokio::test]
async fn response_without_result_is_malformed() {
    let (url, _fake) = spawn_fake(vec![]).await;
    let store = store_for(&url);

    let err = store.call(StoreRequest::GetPreferences).await.unwrap_err();

    assert_matches!(err, StoreError::Malformed(_));
}

#[tokio::test]
async fn unknown_notification_type_is_malformed() {
    let mut unknown = notification("n1", false);
    unknown["type"] = json!("challenge");
    let (url, _fake) = spawn_fake(vec![unknown]).await;
    let store = store_for(&url);

    let err = store.call(StoreRequest::Get).await.unwrap_err();

    assert_matches!(err, StoreError::Malformed(_));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = store_for(&format!("http://{addr}"));
    let err = store.call(StoreRequest::Get).await.unwrap_err();

    assert_matches!(err, StoreError::Transport(_));
}

#[tokio::test]
async fn engine_reconciles_against_callable() {
    let (url, fake) = spawn_fake(vec![notification("n1", false), notification("n2", false)]).await;
    let engine = NotificationSync::for_user(Arc::new(store_for(&url)), UserId::new("u1"));

    engine.refresh().await;
    assert_eq!(engine.snapshot().phase(), SyncPhase::Ready);
    assert_eq!(engine.snapshot().unread_count, 2);

    engine.mark_as_read(&"n1".into()).await;
    assert_eq!(engine.snapshot().unread_count, 1);

    // The fake answers `success: false` to deletes, so the engine refetches
    // and the optimistic removal is undone.
    engine.remove_notification(&"n2".into()).await;
    let state = engine.snapshot();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.unread_count, 1);

    let actions: Vec<String> = fake
        .received
        .lock()
        .unwrap()
        .iter()
        .map(|(_, body)| body["data"]["action"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(actions, ["get", "markRead", "delete", "get"]);
}
