#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use meddonate::config::Config;
use meddonate::db::seed::seed_reference_data;
use meddonate::db::sqlite::Storage;
use meddonate::router::{AppState, app_router};
use meddonate::service::assistant::Assistant;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin";

pub struct TestApp {
    pub app: Router,
    pub storage: Storage,
    pub dir: TempDir,
}

/// Fresh seeded database in a temp dir, wired with `cfg` (paths are overridden).
pub async fn spawn_app(mut cfg: Config) -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    cfg.database_url = format!("sqlite:{}", dir.path().join("test.db").display());
    cfg.uploads_dir = dir.path().join("uploads");

    let storage = Storage::connect(&cfg.database_url)
        .await
        .expect("failed to open test database");
    storage.init_schema().await.expect("schema init failed");
    let today = chrono::Local::now().date_naive();
    seed_reference_data(&storage, false, today)
        .await
        .expect("seeding failed");

    let assistant = Assistant::from_config(&cfg).expect("assistant config");
    let state = AppState::new(storage.clone(), assistant, &cfg);
    TestApp {
        app: app_router(state),
        storage,
        dir,
    }
}

pub fn admin_config() -> Config {
    Config {
        admin_key: ADMIN_KEY.to_string(),
        ..Config::default()
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_str(&body_string(resp).await).expect("response body was not json")
}
