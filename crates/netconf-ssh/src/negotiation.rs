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

//! Subsystem negotiation.
//!
//! Before a NETCONF session starts, the client must request the `netconf`
//! subsystem on its channel. Other requests arriving first are rejected
//! without ending the wait; everything after the match is drained and
//! rejected in the background so the remote peer is never left blocking on
//! an unanswered request. The caller bounds the whole wait with the
//! connection deadline.

use crate::error::NegotiationError;
use crate::NETCONF_SUBSYSTEM;
use netconf_ssh_transport::{ChannelRequest, RequestKind};
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Waits for the client's `netconf` subsystem request.
///
/// On success the request is acknowledged and the remaining request stream
/// is handed to a background drain task.
///
/// # Errors
///
/// Returns [`NegotiationError::ChannelClosed`] if the request stream ends
/// before a matching request arrives.
#[instrument(skip_all, name = "negotiate_subsystem")]
pub async fn negotiate_subsystem(
    mut requests: mpsc::Receiver<ChannelRequest>,
) -> Result<(), NegotiationError> {
    while let Some(request) = requests.recv().await {
        match request.kind() {
            RequestKind::Subsystem(name) if name == NETCONF_SUBSYSTEM => {
                debug!("netconf subsystem requested");
                request.accept();
                tokio::spawn(drain(requests));
                return Ok(());
            }
            other => {
                debug!(request = ?other, "rejecting non-netconf channel request");
                request.reject();
            }
        }
    }
    Err(NegotiationError::ChannelClosed)
}

/// Discards (and rejects) any requests arriving after negotiation.
async fn drain(mut requests: mpsc::Receiver<ChannelRequest>) {
    while let Some(request) = requests.recv().await {
        debug!(request = ?request.kind(), "discarding post-negotiation channel request");
        request.reject();
    }
}
