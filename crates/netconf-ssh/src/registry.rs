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

//! Handler registry and data-model resolution.
//!
//! The registry maps (operation, data model) to a handler. A data model is
//! recognised in a request by its [`ModelMarker`] — the element name plus
//! one of its namespaces, matched as raw byte patterns against the request.
//! Markers are checked in registration order and the first match wins; a
//! request carrying markers for two models routes to whichever was
//! registered first. Built once at startup and read-only afterwards, the
//! registry is shared by all sessions without locking.

use netconf_ssh_frame::Operation;
use std::sync::Arc;

/// Everything a handler receives for one request.
#[derive(Debug)]
pub struct HandlerContext<'a> {
    /// Identifier of the backend device agent (socket path).
    pub backend_endpoint: &'a str,
    /// The session's frame terminator; the reply must end with it.
    pub terminator: &'a str,
    /// The request's message-id (`"1"` if the request carried none).
    pub message_id: &'a str,
    /// The raw request frame, for handlers that re-parse it.
    pub request: &'a [u8],
}

/// A pluggable per-data-model handler.
///
/// A handler must always return a fully framed reply — success, data, or
/// error — rather than failing; backend trouble becomes an `rpc-error`
/// reply, never a panic or a silent drop.
#[async_trait::async_trait]
pub trait RpcHandler: Send + Sync {
    /// Produces the framed reply for one request.
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8>;
}

/// Identifies a data model inside a request.
///
/// Matches when the request contains the opening element (`<vlans`, ...)
/// and, if namespaces were given, any of them in either attribute quote
/// style. The byte patterns are precomputed at registration so matching
/// allocates nothing.
#[derive(Debug, Clone)]
pub struct ModelMarker {
    element: String,
    element_needle: Vec<u8>,
    namespace_needles: Vec<Vec<u8>>,
}

impl ModelMarker {
    /// Creates a marker for `element` qualified by any of `namespaces`.
    #[must_use]
    pub fn new<I, S>(element: &str, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut namespace_needles = Vec::new();
        for ns in namespaces {
            let ns = ns.as_ref();
            namespace_needles.push(format!("xmlns=\"{ns}\"").into_bytes());
            namespace_needles.push(format!("xmlns='{ns}'").into_bytes());
        }
        Self {
            element: element.to_owned(),
            element_needle: format!("<{element}").into_bytes(),
            namespace_needles,
        }
    }

    /// Returns the element name this marker looks for.
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Returns true if the request contains this marker.
    #[must_use]
    pub fn matches(&self, request: &[u8]) -> bool {
        if !contains(request, &self.element_needle) {
            return false;
        }
        if self.namespace_needles.is_empty() {
            return true;
        }
        self.namespace_needles
            .iter()
            .any(|needle| contains(request, needle))
    }
}

/// One registered handler.
pub struct Registration {
    operation: Operation,
    model: String,
    marker: ModelMarker,
    handler: Arc<dyn RpcHandler>,
}

impl Registration {
    /// Returns the data-model key this registration serves.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the registered handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn RpcHandler> {
        &self.handler
    }
}

/// Ordered mapping from (operation, data-model marker) to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Vec<Registration>,
}

impl HandlerRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder {
            entries: Vec::new(),
        }
    }

    /// Resolves the handler for an operation by scanning the registered
    /// markers in registration order; the first match wins.
    #[must_use]
    pub fn resolve(&self, operation: Operation, request: &[u8]) -> Option<&Registration> {
        self.entries
            .iter()
            .find(|entry| entry.operation == operation && entry.marker.matches(request))
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`HandlerRegistry`].
pub struct HandlerRegistryBuilder {
    entries: Vec<Registration>,
}

impl HandlerRegistryBuilder {
    /// Registers a handler for (operation, model), recognised by `marker`.
    ///
    /// Registration order is the resolution precedence.
    #[must_use]
    pub fn register(
        mut self,
        operation: Operation,
        model: impl Into<String>,
        marker: ModelMarker,
        handler: Arc<dyn RpcHandler>,
    ) -> Self {
        self.entries.push(Registration {
            operation,
            model: model.into(),
            marker,
            handler,
        });
        self
    }

    /// Finalises the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            entries: self.entries,
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandlerContext;

    struct Named(&'static str);

    #[async_trait::async_trait]
    impl RpcHandler for Named {
        async fn handle(&self, _ctx: HandlerContext<'_>) -> Vec<u8> {
            self.0.as_bytes().to_vec()
        }
    }

    fn registry() -> HandlerRegistry {
        HandlerRegistry::builder()
            .register(
                Operation::Get,
                "vlan",
                ModelMarker::new("vlans", ["yang:vlan", "yang:get_vlan"]),
                Arc::new(Named("vlan")),
            )
            .register(
                Operation::Get,
                "interface",
                ModelMarker::new("interfaces", ["yang:interfaces"]),
                Arc::new(Named("interface")),
            )
            .build()
    }

    #[test]
    fn resolves_by_marker() {
        let registry = registry();
        let request = br#"<rpc><get><vlans xmlns="yang:vlan"/></get></rpc>"#;
        let entry = registry.resolve(Operation::Get, request).expect("match");
        assert_eq!(entry.model(), "vlan");
    }

    #[test]
    fn single_quoted_namespace_matches() {
        let registry = registry();
        let request = br#"<rpc><get><vlans xmlns='yang:get_vlan'/></get></rpc>"#;
        assert!(registry.resolve(Operation::Get, request).is_some());
    }

    #[test]
    fn element_without_namespace_does_not_match() {
        let registry = registry();
        let request = br#"<rpc><get><vlans xmlns="urn:other"/></get></rpc>"#;
        assert!(registry.resolve(Operation::Get, request).is_none());
    }

    #[test]
    fn operation_must_match() {
        let registry = registry();
        let request = br#"<rpc><get><vlans xmlns="yang:vlan"/></get></rpc>"#;
        assert!(registry.resolve(Operation::EditConfig, request).is_none());
    }

    #[test]
    fn first_registration_wins_on_ambiguity() {
        let registry = registry();
        // Both model markers present; the vlan entry was registered first.
        let request = br#"<rpc><get><vlans xmlns="yang:vlan"/><interfaces xmlns="yang:interfaces"/></get></rpc>"#;
        let entry = registry.resolve(Operation::Get, request).expect("match");
        assert_eq!(entry.model(), "vlan");
    }

    #[test]
    fn interfaces_does_not_shadow_prefix_elements() {
        // "<interfaces" must not match a request that only has "<interface-state".
        let marker = ModelMarker::new("interfaces", ["yang:interfaces"]);
        assert!(!marker.matches(br#"<interface-state xmlns="yang:interfaces"/>"#));
    }
}
