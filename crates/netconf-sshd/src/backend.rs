// Copyright 2024-2026 Farlight Networks, LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Backend device-agent client.
//!
//! The switch itself is driven by a separate agent process reached over a
//! unix domain socket. Requests are JSON envelopes
//! `{"method":"call","params":{"uid":...,"arg":...},"id":N}`; the response
//! carries either a `result` value or an `error` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::{debug, warn};

const DIAL_TIMEOUT: Duration = Duration::from_secs(2);
const IO_TIMEOUT: Duration = Duration::from_secs(5);

static REQUEST_IDS: AtomicU32 = AtomicU32::new(1);

/// Errors from a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The agent socket could not be reached.
    #[error("failed to connect to device agent: {0}")]
    Connect(std::io::Error),

    /// The call did not complete within the I/O deadline.
    #[error("device agent timed out")]
    Timeout,

    /// Socket I/O failed mid-call.
    #[error("device agent I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response was not a valid envelope.
    #[error("invalid response from device agent: {0}")]
    Decode(#[from] serde_json::Error),

    /// The agent reported a device-level failure.
    #[error("{message} (code: {code})")]
    Device {
        /// Agent error code.
        code: i64,
        /// Agent error message.
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    method: &'static str,
    params: Params<'a>,
    id: u32,
}

#[derive(Debug, Serialize)]
struct Params<'a> {
    uid: &'a str,
    arg: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Fault>,
}

#[derive(Debug, Deserialize)]
struct Fault {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Client for the device agent socket.
///
/// Cheap to construct; each call opens a fresh connection, like the
/// agent expects.
pub struct AgentClient<'a> {
    socket_path: &'a str,
}

impl<'a> AgentClient<'a> {
    /// Creates a client for the agent at `socket_path`.
    #[must_use]
    pub fn new(socket_path: &'a str) -> Self {
        Self { socket_path }
    }

    /// Calls one agent method and returns its `result` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket is unreachable, the call times out,
    /// the response cannot be decoded, or the agent reports a failure.
    pub async fn call(&self, uid: &str, arg: Value) -> Result<Value, BackendError> {
        let envelope = Envelope {
            method: "call",
            params: Params { uid, arg },
            id: REQUEST_IDS.fetch_add(1, Ordering::Relaxed),
        };

        debug!(uid, socket = self.socket_path, "calling device agent");
        let mut stream = timeout(DIAL_TIMEOUT, UnixStream::connect(self.socket_path))
            .await
            .map_err(|_| BackendError::Timeout)?
            .map_err(BackendError::Connect)?;

        let mut request = serde_json::to_vec(&envelope)?;
        request.push(b'\n');

        let response = timeout(IO_TIMEOUT, async {
            stream.write_all(&request).await?;
            read_response(&mut stream).await
        })
        .await
        .map_err(|_| BackendError::Timeout)??;

        if let Some(fault) = response.error {
            warn!(uid, code = fault.code, message = %fault.message, "device agent error");
            return Err(BackendError::Device {
                code: fault.code,
                message: fault.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Reads until one complete JSON envelope has arrived.
async fn read_response(stream: &mut UnixStream) -> Result<Response, BackendError> {
    let mut collected = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            // Stream ended; whatever we have must parse now.
            return Ok(serde_json::from_slice(&collected)?);
        }
        collected.extend_from_slice(&buf[..n]);

        match serde_json::from_slice::<Response>(&collected) {
            Ok(response) => return Ok(response),
            Err(error) if error.is_eof() => {} // partial envelope, keep reading
            Err(error) => return Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::UnixListener;

    /// Starts a scripted agent that answers every connection with `reply`.
    fn scripted_agent(dir: &tempfile::TempDir, reply: String) -> String {
        let path = dir
            .path()
            .join("agent.sock")
            .to_string_lossy()
            .into_owned();
        let listener = UnixListener::bind(&path).expect("bind");

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let reply = reply.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    // One request per connection.
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(reply.as_bytes()).await;
                });
            }
        });
        path
    }

    #[tokio::test]
    async fn result_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scripted_agent(
            &dir,
            r#"{"result": {"1": "Default", "2": "Account"}, "id": 1}"#.to_owned(),
        );

        let client = AgentClient::new(&path);
        let result = client
            .call("Agent.Switch.Get.VLAN.Table", Value::Null)
            .await
            .expect("call");

        assert_eq!(result, json!({"1": "Default", "2": "Account"}));
    }

    #[tokio::test]
    async fn device_error_is_surfaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scripted_agent(
            &dir,
            r#"{"error": {"code": -32000, "message": "vlan exists"}, "id": 2}"#.to_owned(),
        );

        let client = AgentClient::new(&path);
        let result = client
            .call("Agent.Switch.Set.VLAN.Create", json!({"vlan_id": 7}))
            .await;

        match result {
            Err(BackendError::Device { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "vlan exists");
            }
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_socket_is_a_connect_error() {
        let client = AgentClient::new("/nonexistent/agent.sock");
        let result = client.call("Agent.Switch.Get.VLAN.Table", Value::Null).await;
        assert!(matches!(result, Err(BackendError::Connect(_))));
    }
}
