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

//! Interface table handler.

use crate::backend::AgentClient;
use netconf_ssh::reply::{self, ErrorTag, ErrorType};
use netconf_ssh::{HandlerContext, RpcHandler};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Namespace interface data is returned under.
pub const INTERFACE_NAMESPACE: &str = "yang:interfaces";

/// Serves the physical interface table.
pub struct InterfaceGet;

#[async_trait::async_trait]
impl RpcHandler for InterfaceGet {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        let client = AgentClient::new(ctx.backend_endpoint);
        let result = match client
            .call("Agent.Switch.Get.Interface.Table", Value::Null)
            .await
        {
            Ok(result) => result,
            Err(error) => {
                warn!(%error, "interface table retrieval failed");
                return reply::error(
                    ctx.message_id,
                    ErrorType::Application,
                    ErrorTag::OperationFailed,
                    &format!("Failed to retrieve interfaces from device: {error}"),
                    ctx.terminator,
                );
            }
        };

        let Value::Object(table) = result else {
            warn!("unexpected interface table shape");
            return reply::error(
                ctx.message_id,
                ErrorType::Application,
                ErrorTag::OperationFailed,
                "Failed to parse interface data from device",
                ctx.terminator,
            );
        };

        // Port names sort by prefix then by the numeric path, so te1/0/10
        // follows te1/0/9 rather than te1/0/1.
        let mut names: Vec<&String> = table.keys().collect();
        names.sort_by_key(|name| sort_key(name));
        debug!(count = names.len(), "interface table retrieved");

        let mut body = format!("    <interfaces xmlns=\"{INTERFACE_NAMESPACE}\">\n");
        for name in names {
            let detail = table.get(name).and_then(Value::as_object);
            body.push_str(&render_interface(name, detail));
        }
        body.push_str("    </interfaces>");

        reply::data(ctx.message_id, &body, ctx.terminator)
    }
}

fn render_interface(name: &str, detail: Option<&Map<String, Value>>) -> String {
    let text = |key: &str| -> String {
        detail
            .and_then(|d| d.get(key))
            .map_or_else(String::new, scalar)
    };
    let status = |key: &str| -> String {
        detail
            .and_then(|d| d.get(key))
            .and_then(|v| v.get("description"))
            .map_or_else(String::new, scalar)
    };

    format!(
        "      <interface>\n\
         \x20       <name>{name}</name>\n\
         \x20       <description>{description}</description>\n\
         \x20       <admin-status>{admin}</admin-status>\n\
         \x20       <oper-status>{oper}</oper-status>\n\
         \x20       <speed>{speed}</speed>\n\
         \x20       <mtu>{mtu}</mtu>\n\
         \x20       <phys-address>{mac}</phys-address>\n\
         \x20     </interface>\n",
        name = reply::escape_text(name),
        description = reply::escape_text(&text("if_description")),
        admin = reply::escape_text(&status("ifAdminStatus")),
        oper = reply::escape_text(&status("ifOperStatus")),
        speed = reply::escape_text(&text("ifSpeed")),
        mtu = reply::escape_text(&text("ifMtu")),
        mac = reply::escape_text(&text("ifPhysAddress")),
    )
}

/// Renders a JSON scalar as element text; null becomes an empty element.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Splits a port name into its alphabetic prefix and numeric components.
fn sort_key(name: &str) -> (String, Vec<u64>) {
    let prefix: String = name
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let numbers = name
        .chars()
        .skip(prefix.len())
        .collect::<String>()
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse().ok())
        .collect();
    (prefix, numbers)
}
