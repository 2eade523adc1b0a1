// Shared harness: an app over a scratch database, driven with oneshot requests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sheetkeep_api::{build_app, AppState, ServerConfig};
use sheetkeep_store::Database;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub dir: TempDir,
    pub app: Router,
}

pub fn setup_app() -> TestApp {
    setup_app_with(ServerConfig::default())
}

pub fn setup_app_with(mut config: ServerConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    config.database_path = dir.path().join("api.db");
    let db = Arc::new(Database::open(&config.database_path).unwrap());
    let app = build_app(AppState::new(db, &config));
    TestApp { dir, app }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(&body.to_string())).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send("PUT", uri, Some(&body.to_string())).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }
}
