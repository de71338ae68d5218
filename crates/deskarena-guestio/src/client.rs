//! Guest HTTP client (C3): thin wrappers over the in-guest server's REST
//! surface. Each method serializes a request, posts or gets it, parses the
//! response, and logs the outcome -- grounded on `PythonController` in
//! `controllers/python.py`. Failures are logged and surfaced as an `Err`;
//! callers (the engine) decide whether to retry or skip.

use crate::error::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const EXECUTE_TIMEOUT: Duration = Duration::from_secs(90);
const ACCESSIBILITY_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize)]
pub struct ComputerUpdatePayload {
    pub rects: Vec<Value>,
    pub window_rect: Option<Value>,
    pub screenshot: String,
    pub scale: Option<(f64, f64)>,
    pub clipboard_content: Option<String>,
    pub swap_ctrl_alt: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObsWinagent {
    pub image: Vec<u8>,
    pub window_title: Option<String>,
    pub rect: Option<Value>,
    pub window_names_str: Option<String>,
    pub computer_clipboard: Option<String>,
    pub human_input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ObsWinagentWire {
    image: String,
    window_title: Option<String>,
    rect: Option<Value>,
    window_names_str: Option<String>,
    computer_clipboard: Option<String>,
    human_input: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ExecuteOutcome {
    pub status_code: u16,
    pub body: Value,
}

pub struct GuestClient {
    base_url: String,
    http: reqwest::Client,
}

impl GuestClient {
    pub fn new(vm_ip: &str) -> Self {
        Self::with_port(vm_ip, 5000)
    }

    pub fn with_port(vm_ip: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{vm_ip}:{port}"),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /probe. `Ok(true)` on HTTP 200, `Ok(false)` on any other status,
    /// `Err` only on transport failure.
    pub async fn probe(&self) -> Result<bool> {
        let response = self
            .http
            .get(self.url("/probe"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    pub async fn update_computer(&self, payload: &ComputerUpdatePayload) -> Result<()> {
        let response = self
            .http
            .post(self.url("/update_computer"))
            .timeout(DEFAULT_TIMEOUT)
            .json(payload)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.url("/screenshot"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::GuestApplication(format!(
                "screenshot request failed with status {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn terminal_output(&self) -> Result<Option<String>> {
        let response = self
            .http
            .get(self.url("/terminal"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value.get("output").and_then(Value::as_str).map(str::to_string))
    }

    pub async fn obs_winagent(&self) -> Result<ObsWinagent> {
        let response = self
            .http
            .get(self.url("/obs_winagent"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        let wire: ObsWinagentWire = response.json().await?;
        let image = base64::engine::general_purpose::STANDARD
            .decode(wire.image)
            .map_err(|e| Error::GuestApplication(format!("bad base64 image payload: {e}")))?;
        Ok(ObsWinagent {
            image,
            window_title: wire.window_title,
            rect: wire.rect,
            window_names_str: wire.window_names_str,
            computer_clipboard: wire.computer_clipboard,
            human_input: wire.human_input,
        })
    }

    /// GET /accessibility. `backend` selects `uia` or `win32`; this call
    /// gets the extended 300s timeout (large trees).
    pub async fn accessibility_tree(&self, backend: Option<&str>) -> Result<Option<String>> {
        let path = match backend {
            Some(b) => format!("/accessibility?backend={b}"),
            None => "/accessibility".to_string(),
        };
        let response = self
            .http
            .get(self.url(&path))
            .timeout(ACCESSIBILITY_TIMEOUT)
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value.get("AT").and_then(Value::as_str).map(str::to_string))
    }

    pub async fn file(&self, file_path: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(self.url("/file"))
            .timeout(DEFAULT_TIMEOUT)
            .form(&[("file_path", file_path)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::GuestApplication(format!(
                "file request failed with status {}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn file_exists(&self, file_path: &str) -> Result<bool> {
        let response = self
            .http
            .post(self.url("/file_exists"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&json!({ "file_path": file_path }))
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value.get("exists").and_then(Value::as_bool).unwrap_or(false))
    }

    pub async fn folder_exists(&self, folder_path: &str) -> Result<bool> {
        let response = self
            .http
            .post(self.url("/folder_exists"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&json!({ "folder_path": folder_path }))
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value.get("exists").and_then(Value::as_bool).unwrap_or(false))
    }

    pub async fn list_directory(&self, folder_path: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .post(self.url("/list_directory"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&json!({ "folder_path": folder_path }))
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value
            .get("entries")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// POST /execute_windows, 90s timeout. `WAIT`/`FAIL`/`DONE` sentinel
    /// commands never reach the wire -- the engine filters those before
    /// calling this method.
    pub async fn execute_windows(&self, command: &str) -> Result<ExecuteOutcome> {
        let response = self
            .http
            .post(self.url("/execute_windows"))
            .timeout(EXECUTE_TIMEOUT)
            .json(&json!({ "command": command }))
            .send()
            .await?;
        let status_code = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(ExecuteOutcome { status_code, body })
    }

    /// POST /setup/{primitive}, one shared entry point for every setter
    /// primitive the in-guest server exposes (`create_folder`,
    /// `create_file`, `upload`, `download_file`, `recycle`, `launch`,
    /// `activate_window`, `close_window`, `close_all`, `change_wallpaper`,
    /// `open_file`, `clear_task_files`).
    pub async fn setup(&self, primitive: &str, payload: Value) -> Result<Value> {
        let response = self
            .http
            .post(self.url(&format!("/setup/{primitive}")))
            .timeout(DEFAULT_TIMEOUT)
            .json(&payload)
            .send()
            .await?;
        check_status(response).await
    }

    pub async fn start_recording(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url("/start_recording"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// POST /check_if_world_clock_exists. Returns the clock's display
    /// label (e.g. `"Tokyo, Japan"`) if a matching clock is configured.
    pub async fn check_world_clock_exists(&self, city: &str, country: &str) -> Result<Option<String>> {
        let response = self
            .http
            .post(self.url("/check_if_world_clock_exists"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&json!({ "city": city, "country": country }))
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value.get("label").and_then(Value::as_str).map(str::to_string))
    }

    /// POST /registry, reading a single key from the registry-style nested
    /// string map the guest exposes.
    pub async fn registry_value(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .http
            .post(self.url("/registry"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&json!({ "key": key }))
            .send()
            .await?;
        let value = check_status(response).await?;
        Ok(value.get("value").and_then(Value::as_str).map(str::to_string))
    }

    pub async fn end_recording(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url("/end_recording"))
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::GuestApplication(format!("guest responded with status {status}")));
    }
    Ok(response.json::<Value>().await.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let client = GuestClient::new("20.20.20.21");
        assert_eq!(client.url("/probe"), "http://20.20.20.21:5000/probe");
    }

    #[test]
    fn with_port_overrides_default() {
        let client = GuestClient::with_port("10.0.0.5", 6000);
        assert_eq!(client.url("/probe"), "http://10.0.0.5:6000/probe");
    }
}
