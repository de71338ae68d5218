//! `/screenshot`, `/accessibility`, `/obs_winagent`, `/terminal`,
//! `/update_computer` (§4.1): the read side of the guest contract, plus
//! the one write that refreshes the shared `computer` facade.

use crate::a11y::{render_tree, AccessibilityProvider, SyntheticAccessibilityProvider};
use crate::error::AppResult;
use crate::platform;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use base64::Engine as _;
use deskarena_types::observation::Rect;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 1x1 transparent PNG, used when no real display can be captured
/// (headless hosts). Keeps the endpoint's contract (a PNG body) intact
/// even when `screenshots::Screen::all()` can't find a display.
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63,
    0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60,
    0x82,
];

fn capture_screen_png() -> Vec<u8> {
    match screenshots::Screen::all() {
        Ok(screens) => match screens.first().and_then(|s| s.capture().ok()) {
            Some(image) => image.to_png(None).unwrap_or_else(|_| BLANK_PNG.to_vec()),
            None => BLANK_PNG.to_vec(),
        },
        Err(_) => BLANK_PNG.to_vec(),
    }
}

pub async fn screenshot() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], capture_screen_png())
}

#[derive(Debug, Deserialize)]
pub struct AccessibilityQuery {
    #[serde(default)]
    pub backend: Option<String>,
}

pub async fn accessibility(Query(query): Query<AccessibilityQuery>) -> AppResult<Json<Value>> {
    let backend = query.backend.as_deref().unwrap_or("uia");
    let provider = SyntheticAccessibilityProvider;
    let xml = render_tree(&provider.root(backend), backend);
    Ok(Json(json!({ "AT": xml })))
}

#[derive(Debug, Serialize)]
pub struct ObsWinagentResponse {
    pub image: String,
    pub window_title: Option<String>,
    pub rect: Option<Rect>,
    pub window_names_str: Option<String>,
    pub computer_clipboard: Option<String>,
    pub human_input: Option<Value>,
}

pub async fn obs_winagent(State(state): State<AppState>) -> AppResult<Json<ObsWinagentResponse>> {
    let facade = state.computer.read().await;
    let image_bytes = capture_screen_png();
    Ok(Json(ObsWinagentResponse {
        image: base64::engine::general_purpose::STANDARD.encode(image_bytes),
        window_title: None,
        rect: facade.window_rect,
        window_names_str: None,
        computer_clipboard: facade.clipboard.clone(),
        human_input: None,
    }))
}

pub async fn terminal() -> Json<Value> {
    Json(json!({ "output": Value::Null }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateComputerRequest {
    #[serde(default)]
    pub rects: Vec<Value>,
    #[serde(default)]
    pub window_rect: Option<Rect>,
    #[serde(default)]
    pub screenshot: String,
    #[serde(default)]
    pub scale: Option<(f64, f64)>,
    #[serde(default)]
    pub clipboard_content: Option<String>,
    #[serde(default)]
    pub swap_ctrl_alt: bool,
}

/// Takes the write lock and swaps the facade's contents atomically
/// (§4.1.1): no caller can observe a torn mix of old/new fields.
pub async fn update_computer(State(state): State<AppState>, Json(req): Json<UpdateComputerRequest>) -> Json<Value> {
    let mut facade = state.computer.write().await;
    facade.rects = req.rects;
    facade.window_rect = req.window_rect;
    if !req.screenshot.is_empty() {
        facade.screenshot_b64 = Some(req.screenshot);
    }
    facade.scale = req.scale;
    facade.clipboard = req.clipboard_content;
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct ScreenSizeResponse {
    pub width: u32,
    pub height: u32,
}

pub async fn screen_size(State(state): State<AppState>) -> Json<ScreenSizeResponse> {
    let (width, height) = platform::screen_size(state.default_screen_size);
    Json(ScreenSizeResponse { width, height })
}

pub async fn window_size() -> Json<Value> {
    Json(json!({ "width": Value::Null, "height": Value::Null }))
}

pub async fn wallpaper() -> Json<Value> {
    Json(json!({ "path": platform::wallpaper_path() }))
}

pub async fn desktop_path() -> Json<Value> {
    Json(json!({ "path": platform::desktop_path().to_string_lossy() }))
}

pub async fn documents_path() -> Json<Value> {
    Json(json!({ "path": platform::documents_path().to_string_lossy() }))
}
