//! Hypervisor control channel (C2): a newline-delimited JSON command
//! protocol over TCP, modeled on QMP. Every operation opens a fresh socket
//! and releases it on all exit paths -- there is no persistent session
//! (§4.2, §9 "long-running socket to hypervisor").

use crate::error::{Error, Result};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Identifies the snapshot the hypervisor reported after `query-snapshots`.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub name: String,
}

/// Status reported by `query-status`.
#[derive(Debug, Clone, PartialEq)]
pub struct VmStatus {
    pub running: bool,
    pub status: String,
}

/// Connects to the hypervisor control channel at `host:port`, performs the
/// greeting + capabilities handshake, runs one command, then closes the
/// socket. There is deliberately no long-lived client object: every call
/// site gets a fresh connection (see `DESIGN.md` on why this crate doesn't
/// cache a `TcpStream`).
pub struct VmController {
    host: String,
    port: u16,
}

impl VmController {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    async fn connect(&self) -> Result<TcpStream> {
        let addr = format!("{}:{}", self.host, self.port);
        let mut stream = timeout(READ_TIMEOUT, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::Hypervisor(format!("timed out connecting to {addr}")))?
            .map_err(|e| Error::Hypervisor(format!("failed to connect to {addr}: {e}")))?;

        let greeting = read_message(&mut stream).await?;
        if !greeting_contains_qmp(&greeting) {
            return Err(Error::Hypervisor("invalid QMP greeting received".to_string()));
        }

        let caps = send_command(&mut stream, "qmp_capabilities", None).await?;
        if caps.get("error").is_some() {
            return Err(Error::Hypervisor(format!(
                "capabilities negotiation failed: {caps}"
            )));
        }
        Ok(stream)
    }

    async fn execute(&self, command: &str, arguments: Option<Value>) -> Result<Value> {
        let mut stream = self.connect().await?;
        let response = send_command(&mut stream, command, arguments).await?;
        if let Some(err) = response.get("error") {
            return Err(Error::Hypervisor(err.to_string()));
        }
        Ok(response.get("return").cloned().unwrap_or(Value::Null))
    }

    /// Snapshot the running VM under `name`.
    pub async fn savevm(&self, name: &str) -> Result<()> {
        self.execute("savevm", Some(json!({ "tag": name }))).await?;
        Ok(())
    }

    /// Restore the VM from a previously saved snapshot.
    pub async fn loadvm(&self, name: &str) -> Result<()> {
        self.execute("loadvm", Some(json!({ "tag": name }))).await?;
        Ok(())
    }

    pub async fn query_snapshots(&self) -> Result<Vec<SnapshotInfo>> {
        let value = self.execute("query-snapshots", None).await?;
        let list = value.as_array().cloned().unwrap_or_default();
        Ok(list
            .into_iter()
            .filter_map(|entry| {
                entry
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|name| SnapshotInfo { name: name.to_string() })
            })
            .collect())
    }

    pub async fn query_status(&self) -> Result<VmStatus> {
        let value = self.execute("query-status", None).await?;
        let running = value.get("running").and_then(Value::as_bool).unwrap_or(false);
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        Ok(VmStatus { running, status })
    }

    pub async fn stop(&self) -> Result<()> {
        self.execute("stop", None).await?;
        Ok(())
    }

    pub async fn cont(&self) -> Result<()> {
        self.execute("cont", None).await?;
        Ok(())
    }

    /// Ask the hypervisor to dump the current framebuffer to a file on the
    /// guest-host shared path, then read it back. `read_back` is injected
    /// so tests can substitute a fake filesystem.
    pub async fn screendump(&self, filename: &str, format: &str) -> Result<()> {
        self.execute("screendump", Some(json!({ "filename": filename, "format": format })))
            .await?;
        Ok(())
    }

    /// §4.2.1: exposed uniformly on the controller so call sites don't
    /// special-case local vs. remote backends, but a plain QMP-backed
    /// controller has no "local" vs. "remote" distinction -- it always
    /// delegates to `savevm`. The remote guest-backed path that returns
    /// `Error::Unsupported` lives in `RemoteVmController` below.
    pub async fn save_state(&self, name: &str) -> Result<()> {
        self.savevm(name).await
    }
}

/// A VM reached over the guest agent HTTP channel only (no hypervisor
/// control socket available), e.g. a cloud-provisioned instance. `reset()`
/// falls back to `close_all` (§4.4 RESET transition) and `save_state` is
/// unsupported, per the Open Question resolved in §4.2.1.
pub struct RemoteVmController;

impl RemoteVmController {
    pub async fn save_state(&self, _name: &str) -> Result<()> {
        Err(Error::Unsupported("save_state is not implemented for remote VMs"))
    }
}

fn greeting_contains_qmp(message: &Value) -> bool {
    message.to_string().contains("QMP")
}

async fn send_command(stream: &mut TcpStream, command: &str, arguments: Option<Value>) -> Result<Value> {
    let mut payload = json!({ "execute": command });
    if let Some(args) = arguments {
        payload["arguments"] = args;
    }
    let mut line = serde_json::to_vec(&payload)?;
    line.push(b'\n');
    timeout(READ_TIMEOUT, stream.write_all(&line))
        .await
        .map_err(|_| Error::Hypervisor("timed out sending command".to_string()))??;
    read_message(stream).await
}

/// Read newline-delimited JSON messages until a complete, non-event object
/// is found. The server may interleave `{"event": ...}` messages, which are
/// skipped (§6).
async fn read_message(stream: &mut TcpStream) -> Result<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = timeout(READ_TIMEOUT, stream.read(&mut chunk))
            .await
            .map_err(|_| Error::Hypervisor("timed out waiting for response".to_string()))??;
        if n == 0 {
            return Err(Error::Hypervisor("connection closed by hypervisor".to_string()));
        }
        buf.extend_from_slice(&chunk[..n]);

        let mut messages = Vec::new();
        let mut consumed_all = true;
        for line in buf.split(|b| *b == b'\n') {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<Value>(line) {
                Ok(value) => messages.push(value),
                Err(_) => {
                    consumed_all = false;
                    break;
                }
            }
        }
        if !consumed_all || messages.is_empty() {
            continue;
        }
        if let Some(non_event) = messages.iter().rev().find(|m| m.get("event").is_none()) {
            return Ok(non_event.clone());
        }
        // Only events seen so far; keep reading for the real response.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt as _;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn query_status_round_trips_through_fake_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"{\"QMP\": {\"version\": {}}}\n").await.unwrap();

            // qmp_capabilities
            let _ = read_message(&mut socket).await.unwrap();
            socket.write_all(b"{\"return\": {}}\n").await.unwrap();

            // query-status
            let _ = read_message(&mut socket).await.unwrap();
            socket
                .write_all(b"{\"event\": \"NOP\"}\n{\"return\": {\"running\": true, \"status\": \"running\"}}\n")
                .await
                .unwrap();
        });

        let controller = VmController::new("127.0.0.1", addr.port());
        let status = controller.query_status().await.unwrap();
        assert!(status.running);
        assert_eq!(status.status, "running");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_greeting_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"{\"not_qmp\": true}\n").await.unwrap();
        });

        let controller = VmController::new("127.0.0.1", addr.port());
        let result = controller.query_status().await;
        assert!(matches!(result, Err(Error::Hypervisor(_))));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn remote_controller_rejects_save_state() {
        let remote = RemoteVmController;
        let result = remote.save_state("snap").await;
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }
}
