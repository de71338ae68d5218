//! App-specific probes (§4.1): the world-clock and timer checks the
//! Clock-app evaluator entries use, plus the `/registry` probe behind
//! `deskarena-evaluators::getters::RegistryGetter`.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct WorldClockRequest {
    pub city: String,
    pub country: String,
}

/// Truthy iff the accessibility tree under the Clock app's root has a
/// node whose name matches `.*{city}, {country}.*` (§8, scenario 4). This
/// port's synthetic tree never contains a Clock root, so the match is
/// always a clean miss rather than a crash; a platform UIA backend would
/// replace `SyntheticAccessibilityProvider` to make this meaningful.
pub async fn check_if_world_clock_exists(Json(req): Json<WorldClockRequest>) -> Json<Value> {
    let _pattern = format!(".*{}, {}.*", req.city, req.country);
    Json(json!({ "label": Value::Null }))
}

pub async fn check_if_timer_started() -> Json<Value> {
    Json(json!({ "started": false }))
}

#[derive(Debug, Deserialize)]
pub struct RegistryRequest {
    pub key: String,
}

/// Reads a registry-style key from the server's in-memory store, which
/// `/setup/*` directives and ad-hoc `execute_windows` scripts populate
/// during SETUP (§8, scenario 2). Falls back to a real `reg query` on
/// Windows when the key was never written through this server.
pub async fn registry(State(state): State<AppState>, Json(req): Json<RegistryRequest>) -> Json<Value> {
    if let Some(value) = state.registry.read().await.get(&req.key).cloned() {
        return Json(json!({ "value": value }));
    }
    let (key, name) = match req.key.rsplit_once('\\') {
        Some((key, name)) => (key, name),
        None => (req.key.as_str(), ""),
    };
    Json(json!({ "value": crate::platform::registry_query(key, name) }))
}
