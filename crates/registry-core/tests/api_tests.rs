//! Registry HTTP API tests, driven through the router without a socket

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;
use voicegw_registry_core::{SessionRegistry, SessionState, SessionType, api};

fn app() -> (Router, Arc<SessionRegistry>) {
    let registry = Arc::new(SessionRegistry::new());
    (api::router(registry.clone()), registry)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_create_and_get() {
    let (app, registry) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/sessions",
        Some(json!({"id": "a84b4c76e66710", "type": "SIP", "details": {"from": "alice"}})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"], "pending");
    assert_eq!(body["type"], "SIP");
    assert_eq!(body["details"]["from"], "alice");
    assert!(registry.contains("a84b4c76e66710"));

    let (status, body) = send(&app, Method::GET, "/sessions/a84b4c76e66710", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "a84b4c76e66710");
}

#[tokio::test]
async fn test_create_without_details_gets_empty_map() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/sessions",
        Some(json!({"id": "w1", "type": "WebRTC"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["details"], json!({}));
}

#[tokio::test]
async fn test_create_rejections() {
    let (app, registry) = app();
    registry.create("dup", SessionType::Sip, Default::default()).unwrap();

    let (status, _) = send(&app, Method::POST, "/sessions", Some(json!({"id": "dup", "type": "SIP"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, "/sessions", Some(json!({"id": "", "type": "SIP"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/sessions", Some(json!({"id": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/sessions", Some(json!({"id": "x", "type": "XMPP"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_update_state() {
    let (app, registry) = app();
    registry.create("s1", SessionType::Sip, Default::default()).unwrap();

    let (status, body) = send(&app, Method::PUT, "/sessions/s1/state", Some(json!({"state": "active"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "active");
    assert_eq!(registry.get("s1").unwrap().state, SessionState::Active);

    let (status, _) = send(&app, Method::PUT, "/sessions/s1/state", Some(json!({"state": "ringing"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PUT, "/sessions/s1/state", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PUT, "/sessions/nope/state", Some(json!({"state": "active"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_details() {
    let (app, registry) = app();
    registry
        .create(
            "s1",
            SessionType::WebRtc,
            [("user_agent".to_string(), "firefox".to_string())].into_iter().collect(),
        )
        .unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/sessions/s1/details",
        Some(json!({"details": {"codec": "opus"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"], json!({"user_agent": "firefox", "codec": "opus"}));

    let (status, _) = send(&app, Method::PUT, "/sessions/s1/details", Some(json!({"details": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::PUT, "/sessions/s1/details", Some(json!({"details": {}}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"], json!({"user_agent": "firefox", "codec": "opus"}));

    let (status, _) = send(&app, Method::PUT, "/sessions/ghost/details", Some(json!({"details": {}}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_final() {
    let (app, registry) = app();
    registry.create("s1", SessionType::Sip, Default::default()).unwrap();

    let (status, body) = send(&app, Method::DELETE, "/sessions/s1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, "/sessions/s1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/sessions/s1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_percent_encoded_call_id() {
    let (app, registry) = app();
    registry.create("abc@10.0.0.1", SessionType::Sip, Default::default()).unwrap();

    let (status, body) = send(&app, Method::GET, "/sessions/abc%4010.0.0.1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "abc@10.0.0.1");
}

#[tokio::test]
async fn test_list_with_filter_and_health() {
    let (app, registry) = app();
    registry.create("sip-1", SessionType::Sip, Default::default()).unwrap();
    registry.create("web-1", SessionType::WebRtc, Default::default()).unwrap();

    let (status, body) = send(&app, Method::GET, "/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/sessions?type=WebRTC", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["web-1"]);

    let (status, _) = send(&app, Method::GET, "/sessions?type=fax", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "sessions": 2}));
}
