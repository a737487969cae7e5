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

//! Data-model handlers and their registration.
//!
//! Each handler serves one configuration area against the backend agent.
//! Registration order is the dispatch precedence; it follows the order the
//! device firmware checks filters in. Further models (routing, IP
//! addressing, port configuration, STP, LAG, port telemetry) plug in
//! through the same registration call.

pub mod interface;
pub mod mgmt;
pub mod vlan;
pub mod xml;

use netconf_ssh::{CapabilitySet, HandlerRegistry, ModelMarker, Operation};
use std::sync::Arc;

/// Builds the full handler registry.
#[must_use]
pub fn build_registry() -> HandlerRegistry {
    let vlan_get = Arc::new(vlan::VlanGet);
    let interface_get = Arc::new(interface::InterfaceGet);
    let ssh_get = Arc::new(mgmt::SshGet);
    let telnet_get = Arc::new(mgmt::TelnetGet);

    let vlan_marker = || {
        ModelMarker::new(
            "vlans",
            [vlan::VLAN_FILTER_NAMESPACE, vlan::VLAN_NAMESPACE],
        )
    };
    let interface_marker =
        || ModelMarker::new("interfaces", ["yang:get_interface", interface::INTERFACE_NAMESPACE]);
    let ssh_marker = || ModelMarker::new("ssh", ["yang:get_ssh", mgmt::SSH_CONFIG_NAMESPACE]);
    let telnet_marker =
        || ModelMarker::new("telnet", ["yang:get_telnet", mgmt::TELNET_CONFIG_NAMESPACE]);

    let mut builder = HandlerRegistry::builder();
    for operation in [Operation::Get, Operation::GetConfig] {
        builder = builder
            .register(operation, "vlan", vlan_marker(), vlan_get.clone())
            .register(operation, "interface", interface_marker(), interface_get.clone())
            .register(operation, "ssh", ssh_marker(), ssh_get.clone())
            .register(operation, "telnet", telnet_marker(), telnet_get.clone());
    }

    builder
        .register(
            Operation::EditConfig,
            "vlan",
            ModelMarker::new(
                "vlans",
                [vlan::VLAN_EDIT_NAMESPACE, vlan::VLAN_NAMESPACE],
            ),
            Arc::new(vlan::VlanEdit),
        )
        .register(
            Operation::EditConfig,
            "ssh",
            ModelMarker::new("ssh", ["yang:set_ssh", mgmt::SSH_CONFIG_NAMESPACE]),
            Arc::new(mgmt::SshEdit),
        )
        .register(
            Operation::EditConfig,
            "telnet",
            ModelMarker::new("telnet", ["yang:set_telnet", mgmt::TELNET_CONFIG_NAMESPACE]),
            Arc::new(mgmt::TelnetEdit),
        )
        .build()
}

/// Builds the capability set advertised in the hello.
#[must_use]
pub fn capabilities() -> CapabilitySet {
    CapabilitySet::new()
        .with(vlan::VLAN_NAMESPACE)
        .with(interface::INTERFACE_NAMESPACE)
        .with(mgmt::SSH_CONFIG_NAMESPACE)
        .with(mgmt::TELNET_CONFIG_NAMESPACE)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    /// Starts a scripted agent answering every connection with `reply`.
    pub fn scripted_agent(dir: &tempfile::TempDir, reply: &str) -> String {
        let path = dir
            .path()
            .join("agent.sock")
            .to_string_lossy()
            .into_owned();
        let listener = UnixListener::bind(&path).expect("bind");
        let reply = reply.to_owned();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let reply = reply.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf).await;
                    let _ = stream.write_all(reply.as_bytes()).await;
                });
            }
        });
        path
    }

    /// Starts a scripted agent answering every call with a device error.
    pub fn failing_agent(dir: &tempfile::TempDir, code: i64, message: &str) -> String {
        scripted_agent(
            dir,
            &format!(r#"{{"error": {{"code": {code}, "message": "{message}"}}, "id": 1}}"#),
        )
    }

    #[test]
    fn registry_covers_all_served_models() {
        let registry = build_registry();
        // vlan/interface/ssh/telnet on get and get-config, plus three edits.
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn vlan_precedes_other_models() {
        let registry = build_registry();
        let request = br#"<rpc><get><vlans xmlns="yang:vlan"/><interfaces xmlns="yang:interfaces"/></get></rpc>"#;
        let entry = registry
            .resolve(Operation::Get, request)
            .expect("resolution");
        assert_eq!(entry.model(), "vlan");
    }

    #[test]
    fn capabilities_cover_served_models() {
        let uris = capabilities();
        assert_eq!(uris.uris().len(), 4);
        assert!(uris.uris().contains(&"yang:get_vlan".to_owned()));
    }
}
