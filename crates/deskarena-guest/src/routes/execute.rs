//! `/execute` and `/execute_windows` (§4.1): run a shell command, or
//! evaluate a `pyautogui`/`code_block` fragment against the `computer`/
//! `human` facades.

use crate::error::{AppError, AppResult};
use crate::platform;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
    #[serde(default)]
    pub shell: Option<String>,
}

pub async fn execute(Json(req): Json<ExecuteRequest>) -> AppResult<Json<Value>> {
    let output = platform::run_shell(&req.command, req.shell.as_deref()).await?;
    Ok(Json(json!({
        "stdout": String::from_utf8_lossy(&output.stdout),
        "stderr": String::from_utf8_lossy(&output.stderr),
        "returncode": output.status.code().unwrap_or(-1),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ExecuteWindowsRequest {
    pub command: String,
}

/// Runs `command` as a `pyautogui`-flavoured script against an in-guest
/// Python interpreter, with `computer`/`human` bound from a read-cloned
/// facade snapshot (§4.1.1). Any non-zero exit is surfaced as a 500 with
/// the captured stderr as the traceback, matching "Any exception => 500
/// with captured traceback".
pub async fn execute_windows(State(state): State<AppState>, Json(req): Json<ExecuteWindowsRequest>) -> AppResult<Json<Value>> {
    let facade = state.computer.read().await.clone();
    let preamble = format!(
        "import pyautogui\npyautogui.FAILSAFE = False\n__computer_rects__ = {rects}\n__computer_clipboard__ = {clipboard}\n",
        rects = serde_json::to_string(&facade.rects).unwrap_or_else(|_| "[]".to_string()),
        clipboard = serde_json::to_string(&facade.clipboard).unwrap_or_else(|_| "null".to_string()),
    );
    let script = format!("{preamble}\n{}\n", req.command);

    let script_path = std::env::temp_dir().join(format!("deskarena-exec-{}.py", uuid_like()));
    tokio::fs::write(&script_path, script).await?;
    let output = tokio::process::Command::new("python3").arg(&script_path).output().await;
    let _ = tokio::fs::remove_file(&script_path).await;
    let output = output?;

    if !output.status.success() {
        return Err(AppError::Internal(String::from_utf8_lossy(&output.stderr).to_string()));
    }
    Ok(Json(json!({
        "stdout": String::from_utf8_lossy(&output.stdout),
        "stderr": String::from_utf8_lossy(&output.stderr),
        "returncode": output.status.code().unwrap_or(0),
    })))
}

/// Cheap, dependency-free unique-enough suffix for scratch script paths;
/// this isn't an identity, just collision avoidance for concurrent calls.
fn uuid_like() -> String {
    let nanos = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    format!("{nanos:x}-{:x}", std::process::id())
}
