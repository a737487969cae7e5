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

//! Operation dispatch.
//!
//! Turns one request frame into one reply frame: extract the message-id,
//! locate the `<rpc` element, classify the operation, resolve the data
//! model through the registry, and invoke the handler — or build the
//! matching protocol/application error. All error classification happens
//! here; the session loop forwards whatever bytes come back.

use crate::registry::{HandlerContext, HandlerRegistry};
use netconf_ssh_frame::reply::{self, ErrorTag, ErrorType};
use netconf_ssh_frame::{Operation, RpcRequest};
use tracing::{debug, instrument, warn};

/// Routes decoded requests to registered handlers.
pub struct Dispatcher {
    registry: HandlerRegistry,
    backend_endpoint: String,
    terminator: String,
}

impl Dispatcher {
    /// Creates a dispatcher over an immutable registry.
    #[must_use]
    pub fn new(
        registry: HandlerRegistry,
        backend_endpoint: impl Into<String>,
        terminator: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            backend_endpoint: backend_endpoint.into(),
            terminator: terminator.into(),
        }
    }

    /// Dispatches one request frame, always returning a framed reply.
    #[instrument(skip_all)]
    pub async fn dispatch(&self, request: &[u8]) -> Vec<u8> {
        let parsed = match RpcRequest::parse(request) {
            Ok(parsed) => parsed,
            Err(error) => {
                let message_id = netconf_ssh_frame::extract_message_id(request);
                warn!(%error, "malformed request frame");
                return reply::error(
                    &message_id,
                    ErrorType::Protocol,
                    ErrorTag::MalformedMessage,
                    "Request frame does not contain an <rpc> element.",
                    &self.terminator,
                );
            }
        };

        let Some(operation) = parsed.operation else {
            warn!(message_id = %parsed.message_id, "unrecognised operation");
            return reply::error(
                &parsed.message_id,
                ErrorType::Application,
                ErrorTag::OperationNotSupported,
                "Operation not supported or request malformed.",
                &self.terminator,
            );
        };

        match self.registry.resolve(operation, parsed.raw) {
            Some(entry) => {
                debug!(
                    message_id = %parsed.message_id,
                    %operation,
                    model = entry.model(),
                    "dispatching request"
                );
                entry
                    .handler()
                    .handle(HandlerContext {
                        backend_endpoint: &self.backend_endpoint,
                        terminator: &self.terminator,
                        message_id: &parsed.message_id,
                        request: parsed.raw,
                    })
                    .await
            }
            None => self.unresolved(operation, &parsed.message_id),
        }
    }

    /// Builds the error reply for an operation with no matching data model.
    fn unresolved(&self, operation: Operation, message_id: &str) -> Vec<u8> {
        warn!(message_id, %operation, "no handler for request filter");
        match operation {
            Operation::Get | Operation::GetConfig => reply::error(
                message_id,
                ErrorType::Application,
                ErrorTag::OperationNotSupported,
                &format!(
                    "The <{operation}> operation with the specified filter is not supported."
                ),
                &self.terminator,
            ),
            Operation::EditConfig => reply::error(
                message_id,
                ErrorType::Application,
                ErrorTag::OperationFailed,
                "Unsupported configuration target in <edit-config>.",
                &self.terminator,
            ),
        }
    }
}
