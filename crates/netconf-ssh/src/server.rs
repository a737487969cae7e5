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

//! The serving loop.
//!
//! `Server::serve` consumes accepted channels from a [`ChannelSource`] and
//! runs one concurrent session task per channel: deadline-bounded
//! subsystem negotiation, then the session loop. A failure on one channel
//! is logged and drops only that channel; the accept loop keeps going
//! until the source reports the listener closed, which is a clean
//! shutdown, not an error.

use crate::capabilities::CapabilitySet;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{Error, TimeoutKind};
use crate::negotiation::negotiate_subsystem;
use crate::registry::HandlerRegistry;
use crate::session::{Session, SessionIds};
use netconf_ssh_transport::{ChannelIo, ChannelSource, SessionChannel};
use std::sync::Arc;
use tokio::time::timeout_at;
use tracing::{info, instrument, warn};

struct ServerInner {
    config: Config,
    dispatcher: Dispatcher,
    capabilities: CapabilitySet,
    session_ids: SessionIds,
}

/// A NETCONF server: dispatcher, capability set and session-id allocator
/// behind a cheaply cloneable handle.
#[derive(Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

impl Server {
    /// Creates a server from a validated configuration, an immutable
    /// handler registry and the capability set to advertise.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: Config,
        registry: HandlerRegistry,
        capabilities: CapabilitySet,
    ) -> Result<Self, Error> {
        config.validate()?;
        let dispatcher = Dispatcher::new(
            registry,
            config.backend_endpoint.clone(),
            config.frame_terminator.clone(),
        );
        Ok(Self {
            inner: Arc::new(ServerInner {
                config,
                dispatcher,
                capabilities,
                session_ids: SessionIds::new(),
            }),
        })
    }

    /// Accepts channels until the source is exhausted.
    ///
    /// Each accepted channel runs in its own task; the accept loop never
    /// waits on an individual channel.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level accept failures; a closed
    /// listener terminates the loop cleanly.
    pub async fn serve<S: ChannelSource>(&self, mut channels: S) -> Result<(), Error> {
        info!("accepting netconf session channels");
        loop {
            match channels.next_channel().await.map_err(Error::transport)? {
                Some(channel) => {
                    let server = self.clone();
                    tokio::spawn(async move {
                        server.handle_channel(channel).await;
                    });
                }
                None => {
                    info!("channel source closed, shutting down accept loop");
                    return Ok(());
                }
            }
        }
    }

    /// Negotiates and runs one session; all failures end here.
    #[instrument(skip_all, fields(peer = %channel.peer))]
    async fn handle_channel<C: ChannelIo>(&self, channel: SessionChannel<C>) {
        let session_id = self.inner.session_ids.next_session_id();
        let SessionChannel {
            peer,
            requests,
            io,
            deadline,
        } = channel;

        let negotiated = match deadline {
            Some(deadline) => match timeout_at(deadline, negotiate_subsystem(requests)).await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => Err(Error::Timeout(TimeoutKind::Negotiation)),
            },
            None => negotiate_subsystem(requests).await.map_err(Error::from),
        };

        if let Err(error) = negotiated {
            warn!(session = session_id, %peer, %error, "subsystem negotiation failed");
            return;
        }
        info!(session = session_id, %peer, "netconf subsystem established");

        let session = Session::new(
            session_id,
            io,
            self.inner.config.frame_terminator.clone(),
            self.inner.config.read_timeout,
        );
        match session
            .run(&self.inner.dispatcher, &self.inner.capabilities)
            .await
        {
            Ok(()) => info!(session = session_id, %peer, "session closed"),
            Err(error) => {
                warn!(session = session_id, %peer, %error, "session terminated with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{HandlerContext, ModelMarker, RpcHandler};
    use netconf_ssh_frame::{reply, FrameReader, Operation};
    use netconf_ssh_transport::mock::mock_channel_source;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    const TERM: &str = "]]>]]>";

    struct OkHandler;

    #[async_trait::async_trait]
    impl RpcHandler for OkHandler {
        async fn handle(&self, ctx: HandlerContext<'_>) -> Vec<u8> {
            reply::ok(ctx.message_id, ctx.terminator)
        }
    }

    fn server() -> Server {
        let registry = HandlerRegistry::builder()
            .register(
                Operation::Get,
                "vlan",
                ModelMarker::new("vlans", ["yang:vlan"]),
                Arc::new(OkHandler),
            )
            .build();
        Server::new(
            Config::new().with_backend_endpoint("/run/agent.sock"),
            registry,
            CapabilitySet::new().with("yang:get_vlan"),
        )
        .expect("valid config")
    }

    #[tokio::test]
    async fn full_flow_over_mock_transport() {
        let (feeder, source) = mock_channel_source();
        let server = server();
        let serving = tokio::spawn(async move { server.serve(source).await });

        let client = feeder.connect().await;
        assert!(client.request_subsystem("netconf").await);

        let (read_half, mut write_half) = tokio::io::split(client.io);
        let mut frames = FrameReader::new(read_half, TERM);

        let hello = frames.read_frame().await.expect("read").expect("hello");
        let hello = String::from_utf8(hello).expect("utf8");
        assert!(hello.contains("<session-id>"));

        write_half.write_all(b"<hello/>]]>]]>").await.expect("write");
        write_half
            .write_all(
                b"<rpc message-id=\"4\"><get><vlans xmlns=\"yang:vlan\"/></get></rpc>]]>]]>",
            )
            .await
            .expect("write");

        let response = frames.read_frame().await.expect("read").expect("reply");
        let response = String::from_utf8(response).expect("utf8");
        assert!(response.contains("<ok/>"));
        assert!(response.contains("message-id=\"4\""));

        // Closing the feeder ends the accept loop cleanly.
        drop(feeder);
        drop(write_half);
        serving
            .await
            .expect("serve task")
            .expect("clean shutdown");
    }

    #[tokio::test]
    async fn expired_deadline_fails_negotiation() {
        let (feeder, source) = mock_channel_source();
        let server = server();
        let serving = tokio::spawn(async move { server.serve(source).await });

        // Connect but never request the subsystem; the deadline must fire
        // and the channel must be dropped without a session starting.
        let deadline = tokio::time::Instant::now() + Duration::from_millis(20);
        let client = feeder.connect_with_deadline(deadline).await;

        let (read_half, _write_half) = tokio::io::split(client.io);
        let mut frames = FrameReader::new(read_half, TERM);
        let result = frames.read_frame().await.expect("read");
        assert_eq!(result, None, "no hello may be sent, only channel close");

        drop(feeder);
        serving.await.expect("serve task").expect("clean shutdown");
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_ids() {
        let (feeder, source) = mock_channel_source();
        let server = server();
        let serving = tokio::spawn(async move { server.serve(source).await });

        let mut ids = Vec::new();
        for _ in 0..3 {
            let client = feeder.connect().await;
            assert!(client.request_subsystem("netconf").await);

            let (read_half, _write_half) = tokio::io::split(client.io);
            let mut frames = FrameReader::new(read_half, TERM);
            let hello = frames.read_frame().await.expect("read").expect("hello");
            let hello = String::from_utf8(hello).expect("utf8");

            let start = hello.find("<session-id>").expect("id tag") + "<session-id>".len();
            let end = hello.find("</session-id>").expect("id close");
            ids.push(hello[start..end].parse::<u64>().expect("numeric id"));
        }

        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3, "session ids must be distinct");

        drop(feeder);
        serving.await.expect("serve task").expect("clean shutdown");
    }
}
