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

//! russh-backed transport.
//!
//! Runs a russh SSH server on a bound listener, delegating credential
//! checks to the supplied [`Authenticator`], and surfaces each accepted
//! `session` channel as a [`SessionChannel`]. Channel requests
//! (subsystem/shell/exec/pty) are forwarded to the channel's request
//! stream and acknowledged on the wire with whatever decision the consumer
//! takes. Channels of other types are rejected outright.

use crate::{AuthOutcome, Authenticator, ChannelRequest, ChannelSource, RequestKind, SessionChannel};
use russh::keys::PrivateKey;
use russh::server::{Auth, Config, Handler, Msg, Server, Session};
use russh::{Channel, ChannelId, ChannelStream};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Configuration for the SSH transport.
#[derive(Debug)]
pub struct SshTransportConfig {
    /// Server identification banner (e.g. `SSH-2.0-netconf-sshd_0.1`).
    pub banner: Option<String>,
    /// Host keys offered during the handshake.
    pub keys: Vec<PrivateKey>,
    /// Connection-wide deadline, measured from handshake completion.
    ///
    /// Bounds subsystem negotiation on every channel of the connection.
    pub connection_timeout: Duration,
}

impl Default for SshTransportConfig {
    fn default() -> Self {
        Self {
            banner: None,
            keys: Vec::new(),
            connection_timeout: Duration::from_secs(900),
        }
    }
}

/// The channel I/O type produced by this transport.
pub type SshChannelIo = ChannelStream<Msg>;

/// A [`ChannelSource`] fed by a running russh server.
pub struct SshChannelSource {
    rx: mpsc::Receiver<SessionChannel<SshChannelIo>>,
}

/// Error type for the SSH source; accept failures are handled inside the
/// server task, so this is never produced.
#[derive(Debug, thiserror::Error)]
#[error("ssh channel source error")]
pub struct SshSourceError;

impl ChannelSource for SshChannelSource {
    type Io = SshChannelIo;
    type Error = SshSourceError;

    async fn next_channel(
        &mut self,
    ) -> Result<Option<SessionChannel<Self::Io>>, Self::Error> {
        Ok(self.rx.recv().await)
    }
}

/// Starts an SSH server on the given listener.
///
/// Accepts connections until the listener closes; handshake failures drop
/// only the offending connection. The returned source yields accepted
/// `session` channels in arrival order.
#[must_use]
pub fn serve(
    listener: TcpListener,
    config: SshTransportConfig,
    authenticator: Arc<dyn Authenticator>,
) -> SshChannelSource {
    let (tx, rx) = mpsc::channel(16);

    let mut ssh_config = Config {
        keys: config.keys,
        ..Config::default()
    };
    if let Some(banner) = config.banner {
        ssh_config.server_id = russh::SshId::Standard(banner);
    }
    let ssh_config = Arc::new(ssh_config);

    let shared = Arc::new(Shared {
        authenticator,
        tx,
        connection_timeout: config.connection_timeout,
    });

    tokio::spawn(async move {
        let mut factory = ChannelFactory { shared };
        if let Err(error) = factory.run_on_socket(ssh_config, &listener).await {
            warn!(%error, "ssh server stopped");
        }
    });

    SshChannelSource { rx }
}

/// State shared by all connections of one server.
struct Shared {
    authenticator: Arc<dyn Authenticator>,
    tx: mpsc::Sender<SessionChannel<SshChannelIo>>,
    connection_timeout: Duration,
}

/// Produces one [`ClientHandler`] per inbound connection.
struct ChannelFactory {
    shared: Arc<Shared>,
}

impl Server for ChannelFactory {
    type Handler = ClientHandler;

    fn new_client(&mut self, peer: Option<SocketAddr>) -> ClientHandler {
        debug!(?peer, "inbound ssh connection");
        ClientHandler {
            shared: Arc::clone(&self.shared),
            peer: peer.map_or_else(|| "unknown".to_owned(), |p| p.to_string()),
            deadline: Instant::now() + self.shared.connection_timeout,
            channels: HashMap::new(),
        }
    }

    fn handle_session_error(&mut self, error: <Self::Handler as Handler>::Error) {
        // Handshake and protocol failures land here; they are not fatal to
        // the accept loop.
        warn!(%error, "ssh connection error");
    }
}

/// Per-connection handler translating russh callbacks into the transport
/// contract.
struct ClientHandler {
    shared: Arc<Shared>,
    peer: String,
    deadline: Instant,
    channels: HashMap<ChannelId, mpsc::Sender<ChannelRequest>>,
}

impl ClientHandler {
    /// Forwards one channel request to its consumer and mirrors the
    /// decision back onto the wire.
    async fn forward_request(
        &mut self,
        channel: ChannelId,
        kind: RequestKind,
        session: &mut Session,
    ) -> Result<(), russh::Error> {
        let Some(requests) = self.channels.get(&channel) else {
            session.channel_failure(channel)?;
            return Ok(());
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if requests
            .send(ChannelRequest::new(kind, reply_tx))
            .await
            .is_err()
        {
            session.channel_failure(channel)?;
            return Ok(());
        }

        // A discarded request counts as rejected.
        let accepted = reply_rx.await.unwrap_or(false);
        if accepted {
            session.channel_success(channel)?;
        } else {
            session.channel_failure(channel)?;
        }
        Ok(())
    }
}

impl Handler for ClientHandler {
    type Error = russh::Error;

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        match self.shared.authenticator.verify(user, password).await {
            AuthOutcome::Accept => {
                info!(
                    user,
                    method = "password",
                    remote = %self.peer,
                    "authentication succeeded"
                );
                Ok(Auth::Accept)
            }
            AuthOutcome::Reject => {
                warn!(
                    user,
                    method = "password",
                    remote = %self.peer,
                    "authentication failed"
                );
                Ok(Auth::Reject {
                    proceed_with_methods: None,
                    partial_success: false,
                })
            }
        }
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        let (request_tx, request_rx) = mpsc::channel(8);
        self.channels.insert(channel.id(), request_tx);

        debug!(remote = %self.peer, channel = %channel.id(), "session channel accepted");

        let accepted = SessionChannel {
            peer: self.peer.clone(),
            requests: request_rx,
            io: channel.into_stream(),
            deadline: Some(self.deadline),
        };

        if self.shared.tx.send(accepted).await.is_err() {
            warn!(remote = %self.peer, "channel consumer gone, rejecting session channel");
            return Ok(false);
        }
        Ok(true)
    }

    async fn channel_open_direct_tcpip(
        &mut self,
        _channel: Channel<Msg>,
        _host_to_connect: &str,
        _port_to_connect: u32,
        _originator_address: &str,
        _originator_port: u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        warn!(remote = %self.peer, "rejected unsupported channel type direct-tcpip");
        Ok(false)
    }

    async fn subsystem_request(
        &mut self,
        channel: ChannelId,
        name: &str,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!(remote = %self.peer, subsystem = name, "subsystem request");
        self.forward_request(channel, RequestKind::Subsystem(name.to_owned()), session)
            .await
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.forward_request(channel, RequestKind::Shell, session)
            .await
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.forward_request(channel, RequestKind::Exec(data.to_vec()), session)
            .await
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        _term: &str,
        _col_width: u32,
        _row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(russh::Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.forward_request(channel, RequestKind::Other("pty-req".to_owned()), session)
            .await
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.channels.remove(&channel);
        Ok(())
    }
}
