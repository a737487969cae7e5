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

//! Minimal RPC request parsing.
//!
//! Only what routing needs is extracted: the message identifier, the
//! position of the `<rpc` element, and the operation kind. Handlers
//! re-parse the raw bytes themselves, so nothing more is materialised here.

use crate::RpcError;

const MESSAGE_ID_ATTR: &[u8] = b"message-id=\"";

/// The NETCONF operations this engine routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `<get>` — retrieve running state.
    Get,
    /// `<get-config>` — retrieve configuration.
    GetConfig,
    /// `<edit-config>` — modify configuration.
    EditConfig,
}

impl Operation {
    /// Returns the wire name of the operation element.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::GetConfig => "get-config",
            Self::EditConfig => "edit-config",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed view of one request frame, sufficient for routing.
#[derive(Debug)]
pub struct RpcRequest<'a> {
    /// The `message-id` attribute value, `"1"` if absent.
    pub message_id: String,
    /// The classified operation, `None` if unrecognised.
    pub operation: Option<Operation>,
    /// The full frame as received.
    pub raw: &'a [u8],
    /// The frame from the `<rpc` element onward.
    pub rpc: &'a [u8],
}

impl<'a> RpcRequest<'a> {
    /// Parses a request frame.
    ///
    /// Leading garbage before the `<rpc` element (an XML prolog, stray
    /// bytes) is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::NoRpcElement`] if the frame contains no `<rpc`
    /// element anywhere.
    pub fn parse(raw: &'a [u8]) -> Result<Self, RpcError> {
        let message_id = extract_message_id(raw);
        let start = find(raw, b"<rpc").ok_or(RpcError::NoRpcElement)?;
        let rpc = &raw[start..];
        Ok(Self {
            message_id,
            operation: classify(rpc),
            raw,
            rpc,
        })
    }
}

/// Extracts the `message-id="..."` attribute value, defaulting to `"1"`.
#[must_use]
pub fn extract_message_id(request: &[u8]) -> String {
    if let Some(start) = find(request, MESSAGE_ID_ATTR) {
        let value = &request[start + MESSAGE_ID_ATTR.len()..];
        if let Some(end) = value.iter().position(|&b| b == b'"') {
            return String::from_utf8_lossy(&value[..end]).into_owned();
        }
    }
    "1".to_owned()
}

/// Skips leading whitespace and an XML prolog, if present.
#[must_use]
pub fn strip_prolog(frame: &[u8]) -> &[u8] {
    let mut rest = skip_whitespace(frame);
    if rest.starts_with(b"<?xml") {
        match find(rest, b"?>") {
            Some(end) => rest = skip_whitespace(&rest[end + 2..]),
            None => return rest,
        }
    }
    rest
}

/// Returns true if the frame begins with an `<rpc` element once any XML
/// prolog is stripped.
///
/// Used for the handshake leniency: a client that skips its hello and sends
/// an RPC straight away is still served.
#[must_use]
pub fn looks_like_rpc(frame: &[u8]) -> bool {
    strip_prolog(frame).starts_with(b"<rpc")
}

/// Classifies the operation by presence of a matching tag pair.
fn classify(rpc: &[u8]) -> Option<Operation> {
    if contains(rpc, b"<get>") && contains(rpc, b"</get>") {
        Some(Operation::Get)
    } else if contains(rpc, b"<get-config>") && contains(rpc, b"</get-config>") {
        Some(Operation::GetConfig)
    } else if contains(rpc, b"<edit-config") {
        Some(Operation::EditConfig)
    } else {
        None
    }
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}
