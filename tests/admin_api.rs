//! Admin API tests, driven in-process through the router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use config_resolver::admin::handlers::TaskSummary;
use config_resolver::admin::{setup_admin_router, AdminState};
use config_resolver::resilience::{ResolveError, TaskState};
use config_resolver::store::{register_keys, KeySpec, MemoryStore, Store};
use config_resolver::Resolver;

mod common;

const API_KEY: &str = "test-admin-key";

fn app(store: &MemoryStore) -> (Router, Arc<Resolver>) {
    let resolver = Arc::new(common::resolver(store, true));
    let router = setup_admin_router(AdminState::new(resolver.clone(), API_KEY));
    (router, resolver)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_requires_api_key() {
    let (app, _) = app(&MemoryStore::new());

    let res = app
        .clone()
        .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(
            Request::get("/admin/status")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status() {
    let (app, _) = app(&MemoryStore::new());
    let res = app.oneshot(request(Method::GET, "/admin/status", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await;
    assert_eq!(body["status"], "operational");
    assert_eq!(body["tasks_in_flight"], 0);
}

#[tokio::test]
async fn test_entries_and_operator_write() {
    let store = MemoryStore::new();
    register_keys(&store, &[KeySpec::new("bot.token", "Telegram bot token")]).unwrap();
    let (app, _) = app(&store);

    let res = app.clone().oneshot(request(Method::GET, "/admin/entries", None)).await.unwrap();
    let body = json_body(res).await;
    assert_eq!(body[0]["key"], "bot.token");
    assert_eq!(body[0]["resolved"], false);

    let res = app
        .clone()
        .oneshot(request(
            Method::PUT,
            "/admin/config/bot.token",
            Some(serde_json::json!({ "value": "123:abc" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["description"], "Telegram bot token");
    assert_eq!(body["resolved"], true);
    assert_eq!(store.get("bot.token").unwrap().as_deref(), Some("123:abc"));

    let res = app.oneshot(request(Method::GET, "/admin/config/bot.token", None)).await.unwrap();
    let body = json_body(res).await;
    assert_eq!(body["value"], "123:abc");
    assert_eq!(body["resolved"], true);
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_value_defers_and_can_be_cancelled() {
    let store = MemoryStore::new();
    store.put("whisper.api.url", "", "").unwrap();
    let (app, resolver) = app(&store);

    let res = app
        .clone()
        .oneshot(request(Method::GET, "/admin/config/whisper.api.url", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["value"], "");
    assert_eq!(body["resolved"], false);

    let res = app.clone().oneshot(request(Method::GET, "/admin/tasks", None)).await.unwrap();
    let tasks = json_body(res).await;
    assert_eq!(tasks[0]["key"], "whisper.api.url");
    assert_eq!(tasks[0]["state"], "running");
    assert_eq!(tasks[0]["attached"], 0);

    let summaries: Vec<TaskSummary> = serde_json::from_value(tasks).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].state, TaskState::Running);
    assert_eq!(summaries[0].attempt_count, 1);

    let task = resolver.engine().tasks().pop().unwrap();
    let uri = format!("/admin/tasks/{}", task.id());
    let res = app.clone().oneshot(request(Method::DELETE, &uri, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(
        task.wait().await,
        Err(ResolveError::Cancelled {
            key: "whisper.api.url".into()
        })
    );

    let res = app.oneshot(request(Method::DELETE, &uri, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
