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

//! rpc-reply builders.
//!
//! Three reply shapes exist: a bare `<ok/>` acknowledgement, a data-bearing
//! reply, and a structured error. Every builder prepends the XML
//! declaration, carries the message-id through as a reply attribute, and
//! appends the session's frame terminator.

/// The NETCONF base namespace carried on every reply envelope.
pub const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// The XML declaration prepended to every reply.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// NETCONF error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Framing or parse failures.
    Protocol,
    /// Everything the operation layer rejects.
    Application,
}

impl ErrorType {
    /// Returns the wire value of the error type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Application => "application",
        }
    }
}

/// The fixed error-tag vocabulary this engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTag {
    /// The frame is not a well-formed RPC.
    MalformedMessage,
    /// A required sub-element is absent.
    MissingElement,
    /// An attribute value is unusable.
    BadAttribute,
    /// An element value is out of range or otherwise unacceptable.
    InvalidValue,
    /// The operation or filter is not implemented.
    OperationNotSupported,
    /// The operation was attempted and failed.
    OperationFailed,
}

impl ErrorTag {
    /// Returns the wire value of the error tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedMessage => "malformed-message",
            Self::MissingElement => "missing-element",
            Self::BadAttribute => "bad-attribute",
            Self::InvalidValue => "invalid-value",
            Self::OperationNotSupported => "operation-not-supported",
            Self::OperationFailed => "operation-failed",
        }
    }
}

/// Escapes `&`, `<` and `>` for embedding in XML text.
///
/// The ampersand is replaced first so already-escaped entities are not
/// double-escaped.
#[must_use]
pub fn escape_text(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builds a minimal success reply.
#[must_use]
pub fn ok(message_id: &str, terminator: &str) -> Vec<u8> {
    format!(
        "{XML_DECLARATION}\n<rpc-reply message-id=\"{id}\" xmlns=\"{BASE_NAMESPACE}\"><ok/></rpc-reply>\n{terminator}",
        id = escape_text(message_id),
    )
    .into_bytes()
}

/// Builds a data-bearing reply wrapping `body` in a `<data>` element.
///
/// `body` must already be well-formed XML; it is embedded verbatim.
#[must_use]
pub fn data(message_id: &str, body: &str, terminator: &str) -> Vec<u8> {
    format!(
        "{XML_DECLARATION}\n<rpc-reply message-id=\"{id}\" xmlns=\"{BASE_NAMESPACE}\">\n  <data>\n{body}\n  </data>\n</rpc-reply>\n{terminator}",
        id = escape_text(message_id),
    )
    .into_bytes()
}

/// Builds a structured error reply.
#[must_use]
pub fn error(
    message_id: &str,
    error_type: ErrorType,
    tag: ErrorTag,
    message: &str,
    terminator: &str,
) -> Vec<u8> {
    format!(
        "{XML_DECLARATION}\n\
         <rpc-reply message-id=\"{id}\" xmlns=\"{BASE_NAMESPACE}\">\n\
         \x20 <rpc-error>\n\
         \x20   <error-type>{error_type}</error-type>\n\
         \x20   <error-tag>{tag}</error-tag>\n\
         \x20   <error-severity>error</error-severity>\n\
         \x20   <error-message xml:lang=\"en\">{message}</error-message>\n\
         \x20 </rpc-error>\n\
         </rpc-reply>\n{terminator}",
        id = escape_text(message_id),
        error_type = error_type.as_str(),
        tag = tag.as_str(),
        message = escape_text(message),
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERM: &str = "]]>]]>";

    #[test]
    fn ok_reply_shape() {
        let reply = String::from_utf8(ok("5", TERM)).expect("utf8");
        assert!(reply.starts_with(XML_DECLARATION));
        assert!(reply.contains(r#"message-id="5""#));
        assert!(reply.contains("<ok/>"));
        assert!(reply.ends_with(TERM));
    }

    #[test]
    fn data_reply_wraps_body() {
        let reply = String::from_utf8(data("2", "<vlans/>", TERM)).expect("utf8");
        assert!(reply.contains("<data>"));
        assert!(reply.contains("<vlans/>"));
        assert!(reply.contains("</data>"));
        assert!(reply.ends_with(TERM));
    }

    #[test]
    fn error_reply_shape() {
        let reply = String::from_utf8(error(
            "1",
            ErrorType::Application,
            ErrorTag::OperationFailed,
            "device unreachable",
            TERM,
        ))
        .expect("utf8");
        assert!(reply.contains("<error-type>application</error-type>"));
        assert!(reply.contains("<error-tag>operation-failed</error-tag>"));
        assert!(reply.contains("<error-severity>error</error-severity>"));
        assert!(reply.contains("device unreachable"));
        assert!(reply.ends_with(TERM));
    }

    #[test]
    fn error_message_is_escaped() {
        let reply = String::from_utf8(error(
            "1",
            ErrorType::Protocol,
            ErrorTag::MalformedMessage,
            "bad <element> & friends",
            TERM,
        ))
        .expect("utf8");
        assert!(reply.contains("bad &lt;element&gt; &amp; friends"));
    }

    #[test]
    fn ampersand_escaped_before_angle_brackets() {
        // Replacing & last would turn &lt; into &amp;lt;.
        assert_eq!(escape_text("a<b"), "a&lt;b");
        assert_eq!(escape_text("&<"), "&amp;&lt;");
    }
}
