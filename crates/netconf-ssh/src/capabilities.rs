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

//! Capability advertisement and the hello document.

use netconf_ssh_frame::reply::XML_DECLARATION;
use std::fmt::Write as _;

/// The base NETCONF capability, always advertised first.
pub const BASE_CAPABILITY: &str = "urn:ietf:params:netconf:base:1.0";

/// The namespace of the hello envelope.
const HELLO_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// The static set of data-model capability URIs advertised in the hello.
///
/// Built once at startup and immutable for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    uris: Vec<String>,
}

impl CapabilitySet {
    /// Creates an empty capability set (the base capability is implicit).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a data-model capability URI.
    #[must_use]
    pub fn with(mut self, uri: impl Into<String>) -> Self {
        self.uris.push(uri.into());
        self
    }

    /// Returns the advertised data-model URIs, in advertisement order.
    #[must_use]
    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Renders the hello document for one session, framed with the
    /// session's terminator.
    #[must_use]
    pub fn hello_document(&self, session_id: u64, terminator: &str) -> Vec<u8> {
        let mut hello = String::with_capacity(256);
        let _ = writeln!(hello, "{XML_DECLARATION}");
        let _ = writeln!(hello, "<hello xmlns=\"{HELLO_NAMESPACE}\">");
        let _ = writeln!(hello, "  <capabilities>");
        let _ = writeln!(hello, "    <capability>{BASE_CAPABILITY}</capability>");
        for uri in &self.uris {
            let _ = writeln!(hello, "    <capability>{uri}</capability>");
        }
        let _ = writeln!(hello, "  </capabilities>");
        let _ = writeln!(hello, "  <session-id>{session_id}</session-id>");
        let _ = writeln!(hello, "</hello>");
        hello.push_str(terminator);
        hello.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_advertises_base_and_models() {
        let capabilities = CapabilitySet::new()
            .with("yang:get_vlan")
            .with("yang:interfaces");
        let hello =
            String::from_utf8(capabilities.hello_document(1001, "]]>]]>")).expect("utf8");

        assert!(hello.starts_with(XML_DECLARATION));
        assert!(hello.contains(&format!("<capability>{BASE_CAPABILITY}</capability>")));
        assert!(hello.contains("<capability>yang:get_vlan</capability>"));
        assert!(hello.contains("<capability>yang:interfaces</capability>"));
        assert!(hello.contains("<session-id>1001</session-id>"));
        assert!(hello.ends_with("]]>]]>"));
    }

    #[test]
    fn base_capability_comes_first() {
        let capabilities = CapabilitySet::new().with("yang:get_vlan");
        let hello = String::from_utf8(capabilities.hello_document(1, "]]>]]>")).expect("utf8");
        let base = hello.find(BASE_CAPABILITY).expect("base");
        let vlan = hello.find("yang:get_vlan").expect("vlan");
        assert!(base < vlan);
    }
}
