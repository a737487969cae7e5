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

//! VLAN handlers.

use crate::backend::AgentClient;
use crate::handlers::xml;
use netconf_ssh::reply::{self, ErrorTag, ErrorType};
use netconf_ssh::{HandlerContext, RpcHandler};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Namespace VLAN data is returned under.
pub const VLAN_NAMESPACE: &str = "yang:get_vlan";
/// Namespace accepted on `<get>`/`<get-config>` filters.
pub const VLAN_FILTER_NAMESPACE: &str = "yang:vlan";
/// Namespace accepted on `<edit-config>` payloads.
pub const VLAN_EDIT_NAMESPACE: &str = "yang:set_vlan";

/// Serves the VLAN table.
pub struct VlanGet;

#[async_trait::async_trait]
impl RpcHandler for VlanGet {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        let client = AgentClient::new(ctx.backend_endpoint);
        let result = match client.call("Agent.Switch.Get.VLAN.Table", Value::Null).await {
            Ok(result) => result,
            Err(error) => {
                warn!(%error, "VLAN table retrieval failed");
                return reply::error(
                    ctx.message_id,
                    ErrorType::Application,
                    ErrorTag::OperationFailed,
                    &format!("Failed to retrieve VLANs from device: {error}"),
                    ctx.terminator,
                );
            }
        };

        // The agent returns a flat map of VLAN id (as a string) to name.
        let table: BTreeMap<String, String> = match serde_json::from_value(result) {
            Ok(table) => table,
            Err(error) => {
                warn!(%error, "unexpected VLAN table shape");
                return reply::error(
                    ctx.message_id,
                    ErrorType::Application,
                    ErrorTag::OperationFailed,
                    "Failed to parse VLAN data from device",
                    ctx.terminator,
                );
            }
        };

        let mut vlans: Vec<(u32, String)> = Vec::with_capacity(table.len());
        for (id, name) in table {
            match id.parse::<u32>() {
                Ok(id) => vlans.push((id, name)),
                Err(_) => warn!(%id, "skipping VLAN with non-numeric id"),
            }
        }
        vlans.sort_unstable_by_key(|(id, _)| *id);
        debug!(count = vlans.len(), "VLAN table retrieved");

        let mut body = format!("    <vlans xmlns=\"{VLAN_NAMESPACE}\">\n");
        for (id, name) in vlans {
            body.push_str(&format!(
                "      <vlan>\n        <id>{id}</id>\n        <name>{}</name>\n      </vlan>\n",
                reply::escape_text(&name),
            ));
        }
        body.push_str("    </vlans>");

        reply::data(ctx.message_id, &body, ctx.terminator)
    }
}

/// Applies VLAN configuration.
///
/// Entries are treated as create-or-update; `nc:operation` attributes
/// (merge, replace, delete) are not interpreted.
pub struct VlanEdit;

#[async_trait::async_trait]
impl RpcHandler for VlanEdit {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        let request = String::from_utf8_lossy(ctx.request);

        let Some(vlans) = xml::section(&request, "vlans") else {
            return reply::error(
                ctx.message_id,
                ErrorType::Protocol,
                ErrorTag::MissingElement,
                "Missing <vlans> element in edit-config",
                ctx.terminator,
            );
        };

        let entries = xml::sections(vlans, "vlan");
        if entries.is_empty() {
            debug!("edit-config carried no <vlan> entries");
        }

        let client = AgentClient::new(ctx.backend_endpoint);
        for entry in entries {
            let id = match xml::element_text(entry, "id").map(str::parse::<u32>) {
                Some(Ok(id)) => id,
                _ => {
                    return reply::error(
                        ctx.message_id,
                        ErrorType::Protocol,
                        ErrorTag::MissingElement,
                        "Each <vlan> entry requires a numeric <id>",
                        ctx.terminator,
                    );
                }
            };
            if id == 0 {
                return reply::error(
                    ctx.message_id,
                    ErrorType::Application,
                    ErrorTag::InvalidValue,
                    "VLAN ID '0' is not allowed",
                    ctx.terminator,
                );
            }
            let name = xml::element_text(entry, "name").unwrap_or_default();

            debug!(vlan = id, name, "configuring VLAN");
            let call = client
                .call(
                    "Agent.Switch.Set.VLAN.Create",
                    json!({ "name": name, "vlan_id": id }),
                )
                .await;
            if let Err(error) = call {
                warn!(vlan = id, %error, "VLAN configuration failed");
                return reply::error(
                    ctx.message_id,
                    ErrorType::Application,
                    ErrorTag::OperationFailed,
                    &format!("Failed to configure VLAN {id} ({name}) on device: {error}"),
                    ctx.terminator,
                );
            }
        }

        reply::ok(ctx.message_id, ctx.terminator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::tests::{failing_agent, scripted_agent};

    const TERM: &str = "]]>]]>";

    fn ctx<'a>(backend: &'a str, request: &'a [u8]) -> HandlerContext<'a> {
        HandlerContext {
            backend_endpoint: backend,
            terminator: TERM,
            message_id: "7",
            request,
        }
    }

    #[tokio::test]
    async fn get_renders_sorted_vlan_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scripted_agent(
            &dir,
            r#"{"result": {"10": "Voice", "2": "Account", "1": "Default"}, "id": 1}"#,
        );

        let response = VlanGet.handle(ctx(&path, b"")).await;
        let response = String::from_utf8(response).expect("utf8");

        assert!(response.contains("<vlans xmlns=\"yang:get_vlan\">"));
        let first = response.find("<id>1</id>").expect("vlan 1");
        let second = response.find("<id>2</id>").expect("vlan 2");
        let third = response.find("<id>10</id>").expect("vlan 10");
        assert!(first < second && second < third, "numeric order expected");
        assert!(response.ends_with(TERM));
    }

    #[tokio::test]
    async fn get_reports_unreachable_device() {
        let response = VlanGet.handle(ctx("/nonexistent/agent.sock", b"")).await;
        let response = String::from_utf8(response).expect("utf8");

        assert!(response.contains("<error-tag>operation-failed</error-tag>"));
        assert!(response.contains("Failed to retrieve VLANs"));
        assert!(response.ends_with(TERM));
    }

    #[tokio::test]
    async fn edit_creates_each_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scripted_agent(&dir, r#"{"result": true, "id": 1}"#);

        let request = br#"<rpc><edit-config><target><running/></target><config><vlans xmlns="yang:set_vlan"><vlan><id>30</id><name>Lab</name></vlan></vlans></config></edit-config></rpc>"#;
        let response = VlanEdit.handle(ctx(&path, request)).await;
        let response = String::from_utf8(response).expect("utf8");

        assert!(response.contains("<ok/>"));
    }

    #[tokio::test]
    async fn edit_rejects_vlan_zero() {
        let request = br#"<rpc><edit-config><config><vlans xmlns="yang:set_vlan"><vlan><id>0</id><name>bad</name></vlan></vlans></config></edit-config></rpc>"#;
        let response = VlanEdit.handle(ctx("/unused", request)).await;
        let response = String::from_utf8(response).expect("utf8");

        assert!(response.contains("<error-tag>invalid-value</error-tag>"));
        assert!(response.contains("VLAN ID &apos;0&apos;") || response.contains("VLAN ID '0'"));
    }

    #[tokio::test]
    async fn edit_without_vlans_is_missing_element() {
        let request = br#"<rpc><edit-config><config/></edit-config></rpc>"#;
        let response = VlanEdit.handle(ctx("/unused", request)).await;
        let response = String::from_utf8(response).expect("utf8");

        assert!(response.contains("<error-tag>missing-element</error-tag>"));
    }

    #[tokio::test]
    async fn edit_surfaces_device_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = failing_agent(&dir, -32000, "vlan exists");

        let request = br#"<rpc><edit-config><config><vlans xmlns="yang:set_vlan"><vlan><id>30</id><name>Lab</name></vlan></vlans></config></edit-config></rpc>"#;
        let response = VlanEdit.handle(ctx(&path, request)).await;
        let response = String::from_utf8(response).expect("utf8");

        assert!(response.contains("<error-tag>operation-failed</error-tag>"));
        assert!(response.contains("vlan exists"));
    }
}
