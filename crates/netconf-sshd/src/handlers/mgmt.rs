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

//! Management-plane service handlers: SSH and telnet server state.
//!
//! Both models are a single boolean. The agent reports 1 for enabled and
//! 2 for disabled, and exposes separate enable/disable methods.

use crate::backend::AgentClient;
use crate::handlers::xml;
use netconf_ssh::reply::{self, ErrorTag, ErrorType};
use netconf_ssh::{HandlerContext, RpcHandler};
use serde_json::Value;
use tracing::{debug, warn};

/// Namespace SSH server state is returned under.
pub const SSH_NAMESPACE: &str = "yang:ssh";
/// Long-form SSH configuration namespace.
pub const SSH_CONFIG_NAMESPACE: &str = "urn:example:params:xml:ns:yang:ssh-server-config";
/// Namespace telnet server state is returned under.
pub const TELNET_NAMESPACE: &str = "yang:telnet";
/// Long-form telnet configuration namespace.
pub const TELNET_CONFIG_NAMESPACE: &str = "urn:example:params:xml:ns:yang:telnet-server-config";

/// Which management service a handler instance drives.
#[derive(Debug, Clone, Copy)]
enum Service {
    Ssh,
    Telnet,
}

impl Service {
    const fn element(self) -> &'static str {
        match self {
            Self::Ssh => "ssh-server-config",
            Self::Telnet => "telnet-server-config",
        }
    }

    const fn short_element(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Telnet => "telnet",
        }
    }

    const fn namespace(self) -> &'static str {
        match self {
            Self::Ssh => SSH_NAMESPACE,
            Self::Telnet => TELNET_NAMESPACE,
        }
    }

    const fn get_uid(self) -> &'static str {
        match self {
            Self::Ssh => "Agent.Switch.Get.SSH.Server.Enabled",
            Self::Telnet => "Agent.Switch.Get.Telnet.Enabled",
        }
    }

    const fn set_uid(self, enable: bool) -> &'static str {
        match self {
            Self::Ssh => {
                if enable {
                    "Agent.Switch.Set.SSH.Enable"
                } else {
                    "Agent.Switch.Set.SSH.Disable"
                }
            }
            Self::Telnet => {
                if enable {
                    "Agent.Switch.Set.TelnetServerEnable"
                } else {
                    "Agent.Switch.Set.TelnetServerDisable"
                }
            }
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Ssh => "SSH",
            Self::Telnet => "telnet",
        }
    }
}

/// Serves the SSH server enabled flag.
pub struct SshGet;
/// Applies the SSH server enabled flag.
pub struct SshEdit;
/// Serves the telnet server enabled flag.
pub struct TelnetGet;
/// Applies the telnet server enabled flag.
pub struct TelnetEdit;

#[async_trait::async_trait]
impl RpcHandler for SshGet {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        get_enabled(Service::Ssh, ctx).await
    }
}

#[async_trait::async_trait]
impl RpcHandler for SshEdit {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        edit_enabled(Service::Ssh, ctx).await
    }
}

#[async_trait::async_trait]
impl RpcHandler for TelnetGet {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        get_enabled(Service::Telnet, ctx).await
    }
}

#[async_trait::async_trait]
impl RpcHandler for TelnetEdit {
    async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
        edit_enabled(Service::Telnet, ctx).await
    }
}

async fn get_enabled(service: Service, ctx: HandlerContext<'_>) -> Vec<u8> {
    let client = AgentClient::new(ctx.backend_endpoint);
    let result = match client.call(service.get_uid(), Value::Null).await {
        Ok(result) => result,
        Err(error) => {
            warn!(service = service.label(), %error, "status retrieval failed");
            return reply::error(
                ctx.message_id,
                ErrorType::Application,
                ErrorTag::OperationFailed,
                "Error communicating with device agent",
                ctx.terminator,
            );
        }
    };

    let Some(status) = result.as_i64() else {
        warn!(service = service.label(), "unexpected status shape");
        return reply::error(
            ctx.message_id,
            ErrorType::Application,
            ErrorTag::OperationFailed,
            &format!("Failed to parse {} status from device", service.label()),
            ctx.terminator,
        );
    };
    let enabled = status == 1;
    debug!(service = service.label(), enabled, "status retrieved");

    let body = format!(
        "    <{element} xmlns=\"{ns}\">\n      <enabled>{enabled}</enabled>\n    </{element}>",
        element = service.element(),
        ns = service.namespace(),
    );
    reply::data(ctx.message_id, &body, ctx.terminator)
}

async fn edit_enabled(service: Service, ctx: HandlerContext<'_>) -> Vec<u8> {
    let request = String::from_utf8_lossy(ctx.request);

    let Some(config) = xml::section(&request, "config") else {
        return reply::error(
            ctx.message_id,
            ErrorType::Protocol,
            ErrorTag::MalformedMessage,
            "Malformed <edit-config> request",
            ctx.terminator,
        );
    };

    // Both the long config element and the short marker element are
    // accepted, matching what clients actually send.
    let payload = xml::section(config, service.element())
        .or_else(|| xml::section(config, service.short_element()));
    let enabled_text = payload.and_then(|p| xml::element_text(p, "enabled"));

    let Some(enabled_text) = enabled_text else {
        return reply::error(
            ctx.message_id,
            ErrorType::Protocol,
            ErrorTag::MissingElement,
            &format!("<{}><enabled> is required", service.element()),
            ctx.terminator,
        );
    };

    let enabled = match enabled_text {
        "true" | "1" => true,
        "false" | "0" => false,
        other => {
            return reply::error(
                ctx.message_id,
                ErrorType::Application,
                ErrorTag::InvalidValue,
                &format!("<enabled> must be a boolean, got '{other}'"),
                ctx.terminator,
            );
        }
    };

    debug!(service = service.label(), enabled, "applying service state");
    let client = AgentClient::new(ctx.backend_endpoint);
    if let Err(error) = client.call(service.set_uid(enabled), Value::Null).await {
        warn!(service = service.label(), %error, "service state change failed");
        return reply::error(
            ctx.message_id,
            ErrorType::Application,
            ErrorTag::OperationFailed,
            &format!(
                "Error communicating with device agent to set {} status: {error}",
                service.label()
            ),
            ctx.terminator,
        );
    }

    reply::ok(ctx.message_id, ctx.terminator)
}
