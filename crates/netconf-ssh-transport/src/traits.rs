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

//! Transport trait definitions.

use std::future::Future;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Byte-level I/O over one SSH channel.
///
/// Blanket-implemented for anything that reads and writes asynchronously;
/// the engine splits it into read and write halves.
pub trait ChannelIo: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin + 'static> ChannelIo for T {}

/// The request types a client can issue on a session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `subsystem` request naming an application protocol.
    Subsystem(String),
    /// Interactive shell request.
    Shell,
    /// Command execution request.
    Exec(Vec<u8>),
    /// Anything else (pty-req, env, ...), identified by its wire name.
    Other(String),
}

/// One in-band channel request awaiting an accept/reject decision.
#[derive(Debug)]
pub struct ChannelRequest {
    kind: RequestKind,
    reply: Option<oneshot::Sender<bool>>,
}

impl ChannelRequest {
    /// Creates a request carrying a reply channel.
    #[must_use]
    pub fn new(kind: RequestKind, reply: oneshot::Sender<bool>) -> Self {
        Self {
            kind,
            reply: Some(reply),
        }
    }

    /// Returns the request type.
    #[must_use]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Acknowledges the request as accepted.
    pub fn accept(mut self) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(true);
        }
    }

    /// Acknowledges the request as rejected.
    pub fn reject(mut self) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(false);
        }
    }
}

/// An accepted `session` channel, ready for subsystem negotiation.
#[derive(Debug)]
pub struct SessionChannel<C> {
    /// Remote peer address, for logging.
    pub peer: String,
    /// In-band requests from the client, in arrival order.
    pub requests: mpsc::Receiver<ChannelRequest>,
    /// The channel's byte stream.
    pub io: C,
    /// Connection-wide deadline established at handshake success.
    ///
    /// All channels on one connection share the same deadline; it bounds
    /// subsystem negotiation only.
    pub deadline: Option<Instant>,
}

/// A source of accepted session channels.
///
/// Implementations own the accept loop and the SSH handshake; the engine
/// only ever sees channels whose connections authenticated successfully.
pub trait ChannelSource: Send {
    /// The channel I/O type this source produces.
    type Io: ChannelIo;
    /// Error type for accepting channels.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Waits for the next accepted channel.
    ///
    /// Returns `None` when the listener has closed — a clean shutdown
    /// signal, not an error.
    fn next_channel(
        &mut self,
    ) -> impl Future<Output = Result<Option<SessionChannel<Self::Io>>, Self::Error>> + Send;
}

/// Outcome of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials accepted.
    Accept,
    /// Credentials rejected (or the credential store was unreachable —
    /// the client is never told which).
    Reject,
}

/// Credential validation capability consulted during the SSH handshake.
///
/// Implementations may perform network calls (e.g. to a credential store)
/// but must complete within the connection's handshake phase.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Checks a username/password pair.
    async fn verify(&self, username: &str, password: &str) -> AuthOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accept_resolves_reply_channel() {
        let (tx, rx) = oneshot::channel();
        let request = ChannelRequest::new(RequestKind::Subsystem("netconf".into()), tx);
        assert_eq!(
            request.kind(),
            &RequestKind::Subsystem("netconf".to_owned())
        );
        request.accept();
        assert_eq!(rx.await, Ok(true));
    }

    #[tokio::test]
    async fn reject_resolves_reply_channel() {
        let (tx, rx) = oneshot::channel();
        let request = ChannelRequest::new(RequestKind::Shell, tx);
        request.reject();
        assert_eq!(rx.await, Ok(false));
    }

    #[tokio::test]
    async fn dropped_request_closes_reply_channel() {
        let (tx, rx) = oneshot::channel();
        let request = ChannelRequest::new(RequestKind::Other("pty-req".into()), tx);
        drop(request);
        assert!(rx.await.is_err());
    }
}
