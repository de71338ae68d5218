//! `/start_recording`, `/end_recording` (§4.1.2): a screen-capture child
//! process the server owns exclusively between the two calls. A second
//! `/start_recording` while one is active is a 409, not a silent no-op --
//! the original's global recorder handle has the same single-flight
//! property.

use crate::error::{AppError, AppResult};
use crate::state::{AppState, RecordingState};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn start_recording(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let mut recording = state.recording.lock().await;
    if recording.is_some() {
        return Err(AppError::Conflict("recording already in progress".to_string()));
    }

    let output_path = std::env::temp_dir().join(format!("deskarena-recording-{}.mp4", std::process::id()));
    let child = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-f", "x11grab", "-i", ":0.0", output_path.to_string_lossy().as_ref()])
        .spawn()?;

    *recording = Some(RecordingState { child, output_path });
    Ok(Json(json!({ "status": "ok" })))
}

/// Sends a graceful stop (SIGINT-equivalent `kill`), waits for exit, and
/// streams the resulting file back as the response body.
pub async fn end_recording(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut recording = state.recording.lock().await;
    let mut session = recording.take().ok_or_else(|| AppError::Conflict("no recording in progress".to_string()))?;

    session.child.start_kill().ok();
    let _ = session.child.wait().await;

    let bytes = tokio::fs::read(&session.output_path).await.unwrap_or_default();
    let _ = tokio::fs::remove_file(&session.output_path).await;
    Ok(bytes)
}
