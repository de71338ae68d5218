//! A canned-response stand-in for the in-guest HTTP server (C1), serving
//! the exact wire shapes `GuestClient` expects so episode/evaluator code
//! can be driven end to end without a real VM. Grounded on
//! `deskarena-guest`'s own `routes/` handlers -- every shape here mirrors
//! the one they return -- but this router lives in `deskarena-testing`
//! rather than depending on `deskarena-guest` directly, keeping the
//! `types -> guestio -> testing` layering intact.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine as _;
use deskarena_guestio::GuestClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// 1x1 transparent PNG, standing in for a real screenshot.
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63,
    0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60,
    0x82,
];

/// Mutable fixture state a test configures before or during a run, read
/// back by the canned handlers below.
#[derive(Debug, Default, Clone)]
pub struct FakeGuestState {
    pub probe_ok: bool,
    pub registry: HashMap<String, String>,
    pub files: HashMap<String, Vec<u8>>,
    pub folders: std::collections::HashSet<String>,
    pub world_clocks: HashMap<(String, String), String>,
    pub accessibility_tree: Option<String>,
    pub terminal_output: Option<String>,
    pub execute_status: u16,
    pub execute_body: Value,
}

impl FakeGuestState {
    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

fn default_state() -> FakeGuestState {
    FakeGuestState {
        probe_ok: true,
        execute_status: 200,
        execute_body: json!({"stdout": "", "stderr": "", "returncode": 0}),
        ..Default::default()
    }
}

type SharedState = Arc<RwLock<FakeGuestState>>;

/// A running fake guest server bound to an ephemeral localhost port.
/// Dropping it stops serving (the accept task is aborted).
pub struct FakeGuestServer {
    addr: std::net::SocketAddr,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl FakeGuestServer {
    /// Binds an ephemeral port and starts serving immediately.
    pub async fn start() -> Self {
        Self::start_with(default_state()).await
    }

    pub async fn start_with(initial: FakeGuestState) -> Self {
        let state: SharedState = Arc::new(RwLock::new(initial));
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake guest listener");
        let addr = listener.local_addr().expect("read bound addr");
        let router = router(state.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Self { addr, state, handle }
    }

    /// A `GuestClient` pointed at this server.
    pub fn client(&self) -> GuestClient {
        GuestClient::with_port(&self.addr.ip().to_string(), self.addr.port())
    }

    pub async fn set_registry(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state.write().await.registry.insert(key.into(), value.into());
    }

    pub async fn set_file(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.state.write().await.files.insert(path.into(), content.into());
    }

    pub async fn set_folder(&self, path: impl Into<String>) {
        self.state.write().await.folders.insert(path.into());
    }

    pub async fn set_world_clock(&self, city: impl Into<String>, country: impl Into<String>, label: impl Into<String>) {
        self.state.write().await.world_clocks.insert((city.into(), country.into()), label.into());
    }

    pub async fn set_accessibility_tree(&self, xml: impl Into<String>) {
        self.state.write().await.accessibility_tree = Some(xml.into());
    }

    pub async fn set_probe_ok(&self, ok: bool) {
        self.state.write().await.probe_ok = ok;
    }
}

impl Drop for FakeGuestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/probe", get(probe))
        .route("/update_computer", post(update_computer))
        .route("/screenshot", get(screenshot))
        .route("/terminal", get(terminal))
        .route("/obs_winagent", get(obs_winagent))
        .route("/accessibility", get(accessibility))
        .route("/file", post(file))
        .route("/file_exists", post(file_exists))
        .route("/folder_exists", post(folder_exists))
        .route("/list_directory", post(list_directory))
        .route("/execute_windows", post(execute_windows))
        .route("/setup/{primitive}", post(setup))
        .route("/start_recording", post(ok_status))
        .route("/end_recording", post(end_recording))
        .route("/check_if_world_clock_exists", post(world_clock))
        .route("/registry", post(registry))
        .with_state(state)
}

async fn probe(State(state): State<SharedState>) -> axum::http::StatusCode {
    if state.read().await.probe_ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn update_computer() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn screenshot() -> Vec<u8> {
    BLANK_PNG.to_vec()
}

async fn terminal(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({"output": state.read().await.terminal_output}))
}

async fn obs_winagent() -> Json<Value> {
    Json(json!({
        "image": base64::engine::general_purpose::STANDARD.encode(BLANK_PNG),
        "window_title": Value::Null,
        "rect": Value::Null,
        "window_names_str": Value::Null,
        "computer_clipboard": Value::Null,
        "human_input": Value::Null,
    }))
}

#[derive(Debug, Deserialize)]
struct AccessibilityQuery {
    #[serde(default)]
    #[allow(dead_code)]
    backend: Option<String>,
}

async fn accessibility(State(state): State<SharedState>, Query(_query): Query<AccessibilityQuery>) -> Json<Value> {
    Json(json!({"AT": state.read().await.accessibility_tree}))
}

#[derive(Debug, Deserialize)]
struct FilePathRequest {
    file_path: String,
}

async fn file(State(state): State<SharedState>, Json(req): Json<FilePathRequest>) -> Vec<u8> {
    state.read().await.files.get(&req.file_path).cloned().unwrap_or_default()
}

async fn file_exists(State(state): State<SharedState>, Json(req): Json<FilePathRequest>) -> Json<Value> {
    Json(json!({"exists": state.read().await.file_exists(&req.file_path)}))
}

#[derive(Debug, Deserialize)]
struct FolderPathRequest {
    folder_path: String,
}

async fn folder_exists(State(state): State<SharedState>, Json(req): Json<FolderPathRequest>) -> Json<Value> {
    Json(json!({"exists": state.read().await.folders.contains(&req.folder_path)}))
}

async fn list_directory(State(state): State<SharedState>, Json(req): Json<FolderPathRequest>) -> Json<Value> {
    let guard = state.read().await;
    let prefix = format!("{}/", req.folder_path.trim_end_matches('/'));
    let mut entries: Vec<String> = guard
        .files
        .keys()
        .filter_map(|path| path.strip_prefix(&prefix))
        .filter(|rest| !rest.contains('/'))
        .map(str::to_string)
        .collect();
    entries.sort();
    Json(json!({"entries": entries}))
}

#[derive(Debug, Deserialize)]
struct ExecuteWindowsRequest {
    #[allow(dead_code)]
    command: String,
}

async fn execute_windows(State(state): State<SharedState>, Json(_req): Json<ExecuteWindowsRequest>) -> Json<Value> {
    Json(state.read().await.execute_body.clone())
}

async fn setup() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn ok_status() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn end_recording() -> Vec<u8> {
    Vec::new()
}

#[derive(Debug, Deserialize)]
struct WorldClockRequest {
    city: String,
    country: String,
}

async fn world_clock(State(state): State<SharedState>, Json(req): Json<WorldClockRequest>) -> Json<Value> {
    let guard = state.read().await;
    let label = guard.world_clocks.get(&(req.city, req.country)).cloned();
    Json(json!({"label": label}))
}

#[derive(Debug, Deserialize)]
struct RegistryRequest {
    key: String,
}

async fn registry(State(state): State<SharedState>, Json(req): Json<RegistryRequest>) -> Json<Value> {
    Json(json!({"value": state.read().await.registry.get(&req.key).cloned()}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_reports_ok_by_default() {
        let server = FakeGuestServer::start().await;
        assert!(server.client().probe().await.unwrap());
    }

    #[tokio::test]
    async fn registry_round_trips_through_set_registry() {
        let server = FakeGuestServer::start().await;
        server.set_registry("HKCU\\Control Panel\\Desktop\\Wallpaper", "C:\\bg.jpg").await;
        let value = server.client().registry_value("HKCU\\Control Panel\\Desktop\\Wallpaper").await.unwrap();
        assert_eq!(value.as_deref(), Some("C:\\bg.jpg"));
    }

    #[tokio::test]
    async fn file_exists_reflects_set_file() {
        let server = FakeGuestServer::start().await;
        assert!(!server.client().file_exists("C:\\foo.txt").await.unwrap());
        server.set_file("C:\\foo.txt", b"hello".to_vec()).await;
        assert!(server.client().file_exists("C:\\foo.txt").await.unwrap());
        assert_eq!(server.client().file("C:\\foo.txt").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn world_clock_matches_configured_city_and_country() {
        let server = FakeGuestServer::start().await;
        server.set_world_clock("Tokyo", "Japan", "Tokyo, Japan").await;
        let label = server.client().check_world_clock_exists("Tokyo", "Japan").await.unwrap();
        assert_eq!(label.as_deref(), Some("Tokyo, Japan"));
        assert!(server.client().check_world_clock_exists("Paris", "France").await.unwrap().is_none());
    }
}
