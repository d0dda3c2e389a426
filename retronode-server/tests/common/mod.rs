//! Shared helpers for retronode-server integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    routing::post,
    Json, Router,
};
use retronode_common::config::TomlConfig;
use retronode_server::{build_router, AppState};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Address nothing listens on; requests to it fail fast
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9/unreachable";

/// Router plus the temp folders backing it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Data folder (games.json, platforms.json, settings.json)
    pub data_dir: TempDir,
    /// ROM base path the scanner is confined to
    pub roms_dir: TempDir,
}

impl TestApp {
    pub fn roms_path(&self) -> &Path {
        self.roms_dir.path()
    }

    /// Create `<roms>/<relative>` with empty files named `files`
    pub fn rom_folder(&self, relative: &str, files: &[&str]) -> PathBuf {
        let folder = self.roms_dir.path().join(relative);
        std::fs::create_dir_all(&folder).unwrap();
        for file in files {
            std::fs::write(folder.join(file), b"").unwrap();
        }
        folder
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.router, method, uri, body).await
    }
}

/// Test config: scanner confined to `roms_dir`, backends unreachable
pub fn test_config(roms_dir: &Path) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.scanner.roms_base_path = roms_dir.to_path_buf();
    config.scanner.rom_library_root = "/roms".to_string();
    config.identification.chat_endpoint = UNREACHABLE_ENDPOINT.to_string();
    config.identification.generative_endpoint = UNREACHABLE_ENDPOINT.to_string();
    config.identification.timeout_secs = 2;
    config
}

pub fn setup_app() -> TestApp {
    setup_app_with(|_| {})
}

/// Build an app after letting `adjust` tweak the test config
pub fn setup_app_with(adjust: impl FnOnce(&mut TomlConfig)) -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let roms_dir = TempDir::new().unwrap();
    let mut config = test_config(roms_dir.path());
    adjust(&mut config);

    let state = AppState::new(data_dir.path(), config);
    TestApp {
        router: build_router(state.clone()),
        state,
        data_dir,
        roms_dir,
    }
}

pub fn test_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(test_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

/// Store a GitHub token so the chat backend is selectable
pub async fn configure_chat_token(app: &TestApp) {
    let (status, _) = app
        .send("PUT", "/api/settings", Some(json!({"github_token": "test-token"})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

pub async fn create_platform(app: &TestApp, platform_id: &str, name: &str) {
    let (status, body) = app
        .send(
            "POST",
            "/api/platforms",
            Some(json!({"platform_id": platform_id, "name": name, "release_year": 1985})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

/// Serve a chat-completion endpoint whose reply content is `reply`
///
/// Returns the endpoint URL.
pub async fn spawn_mock_chat(reply: Value) -> String {
    let content = reply.to_string();
    let app = Router::new().route(
        "/chat",
        post(move || {
            let content = content.clone();
            async move {
                Json(json!({
                    "choices": [{
                        "message": {"role": "assistant", "content": content}
                    }]
                }))
            }
        }),
    );

    serve_mock(app, "/chat").await
}

/// Serve a generateContent endpoint that knows the titles in `known`
///
/// A prompt naming one of the `(filename, title)` pairs gets that title back,
/// wrapped in prose like a real model reply. Any other filename gets a 500,
/// so each call succeeds or fails on its own.
pub async fn spawn_mock_generative(known: Vec<(&'static str, &'static str)>) -> String {
    let app = Router::new().route(
        "/generate",
        post(move |Json(request): Json<Value>| {
            let known = known.clone();
            async move {
                let prompt = request["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let hit = known
                    .iter()
                    .find(|(filename, _)| prompt.contains(&format!("\"{filename}\"")));

                match hit {
                    Some((_, title)) => {
                        let text = format!(
                            "Here is the game:\n```json\n{}\n```",
                            json!({"name": title, "description": "Identified.", "success": true})
                        );
                        (
                            StatusCode::OK,
                            Json(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})),
                        )
                    }
                    None => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": {"message": "model overloaded"}})),
                    ),
                }
            }
        }),
    );
    serve_mock(app, "/generate").await
}

/// Serve a chat endpoint that answers correctly but only after `delay`
pub async fn spawn_slow_chat(delay: Duration, reply: Value) -> String {
    let content = reply.to_string();
    let app = Router::new().route(
        "/chat",
        post(move || {
            let content = content.clone();
            async move {
                tokio::time::sleep(delay).await;
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": content}}]
                }))
            }
        }),
    );
    serve_mock(app, "/chat").await
}

async fn serve_mock(app: Router, path: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}{}", addr, path)
}

/// Send a request and return the raw response, for non-JSON bodies
pub async fn send_raw(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    app.router
        .clone()
        .oneshot(test_request(method, uri, body))
        .await
        .unwrap()
}

/// Poll a scan session until it reaches COMPLETED or FAILED
pub async fn wait_for_session(app: &TestApp, session_id: &str) -> Value {
    for _ in 0..250 {
        let (status, body) = app
            .send("GET", &format!("/api/scan-sessions/{}", session_id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let state = body["data"]["state"].as_str().unwrap_or_default().to_string();
        if state == "COMPLETED" || state == "FAILED" {
            return body["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Scan session {} did not finish", session_id);
}
