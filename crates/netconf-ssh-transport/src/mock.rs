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

//! Mock transport implementation for testing.
//!
//! Provides in-memory channels and a channel source for use in unit and
//! integration tests without a real SSH stack.

use crate::{ChannelRequest, ChannelSource, RequestKind, SessionChannel};
use tokio::io::DuplexStream;
use tokio::sync::{mpsc, oneshot};

/// Buffer size for the in-memory byte pipe.
const PIPE_CAPACITY: usize = 16 * 1024;

/// Creates one mock session channel and its client-side handle.
///
/// Bytes written by the client are read by the session and vice versa;
/// channel requests issued through the handle arrive on the session's
/// request stream.
#[must_use]
pub fn mock_channel() -> (MockClient, SessionChannel<DuplexStream>) {
    let (client_io, server_io) = tokio::io::duplex(PIPE_CAPACITY);
    let (request_tx, request_rx) = mpsc::channel(8);

    let client = MockClient {
        io: client_io,
        requests: request_tx,
    };

    let channel = SessionChannel {
        peer: "mock:0".to_owned(),
        requests: request_rx,
        io: server_io,
        deadline: None,
    };

    (client, channel)
}

/// Client-side handle to a mock channel.
pub struct MockClient {
    /// The client end of the byte pipe.
    pub io: DuplexStream,
    requests: mpsc::Sender<ChannelRequest>,
}

impl MockClient {
    /// Issues a channel request and waits for the accept/reject decision.
    ///
    /// Returns `false` if the request was rejected or discarded.
    pub async fn request(&self, kind: RequestKind) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .requests
            .send(ChannelRequest::new(kind, reply_tx))
            .await
            .is_err()
        {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }

    /// Issues a `subsystem` request by name.
    pub async fn request_subsystem(&self, name: &str) -> bool {
        self.request(RequestKind::Subsystem(name.to_owned())).await
    }
}

/// Creates a mock channel source and a feeder to push channels into it.
#[must_use]
pub fn mock_channel_source() -> (MockChannelFeeder, MockChannelSource) {
    let (tx, rx) = mpsc::channel(8);
    (MockChannelFeeder { tx }, MockChannelSource { rx })
}

/// Pushes accepted channels into a [`MockChannelSource`].
///
/// Dropping the feeder closes the source, simulating a closed listener.
#[derive(Clone)]
pub struct MockChannelFeeder {
    tx: mpsc::Sender<SessionChannel<DuplexStream>>,
}

impl MockChannelFeeder {
    /// Creates a fresh channel pair and feeds the server side to the source.
    ///
    /// # Panics
    ///
    /// Panics if the source has been dropped.
    pub async fn connect(&self) -> MockClient {
        let (client, channel) = mock_channel();
        self.tx
            .send(channel)
            .await
            .expect("mock channel source dropped");
        client
    }

    /// Like [`connect`](Self::connect), but with a connection deadline on
    /// the fed channel.
    ///
    /// # Panics
    ///
    /// Panics if the source has been dropped.
    pub async fn connect_with_deadline(&self, deadline: tokio::time::Instant) -> MockClient {
        let (client, mut channel) = mock_channel();
        channel.deadline = Some(deadline);
        self.tx
            .send(channel)
            .await
            .expect("mock channel source dropped");
        client
    }
}

/// A [`ChannelSource`] backed by an in-memory queue.
pub struct MockChannelSource {
    rx: mpsc::Receiver<SessionChannel<DuplexStream>>,
}

/// Error type for the mock source; never actually produced.
#[derive(Debug, thiserror::Error)]
#[error("mock channel source error")]
pub struct MockSourceError;

impl ChannelSource for MockChannelSource {
    type Io = DuplexStream;
    type Error = MockSourceError;

    async fn next_channel(
        &mut self,
    ) -> Result<Option<SessionChannel<Self::Io>>, Self::Error> {
        Ok(self.rx.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn bytes_flow_both_ways() {
        let (mut client, mut channel) = mock_channel();

        client.io.write_all(b"ping").await.expect("write");
        let mut buf = [0u8; 4];
        channel.io.read_exact(&mut buf).await.expect("read");
        assert_eq!(&buf, b"ping");

        channel.io.write_all(b"pong").await.expect("write");
        client.io.read_exact(&mut buf).await.expect("read");
        assert_eq!(&buf, b"pong");
    }

    #[tokio::test]
    async fn requests_arrive_in_order() {
        let (client, mut channel) = mock_channel();

        let issuer = tokio::spawn(async move {
            let shell = client.request(RequestKind::Shell).await;
            let subsystem = client.request_subsystem("netconf").await;
            (shell, subsystem)
        });

        let first = channel.requests.recv().await.expect("first request");
        assert_eq!(first.kind(), &RequestKind::Shell);
        first.reject();

        let second = channel.requests.recv().await.expect("second request");
        assert_eq!(
            second.kind(),
            &RequestKind::Subsystem("netconf".to_owned())
        );
        second.accept();

        let (shell, subsystem) = issuer.await.expect("issuer task");
        assert!(!shell);
        assert!(subsystem);
    }

    #[tokio::test]
    async fn source_closes_when_feeder_dropped() {
        let (feeder, mut source) = mock_channel_source();
        let _client = feeder.connect().await;
        assert!(source.next_channel().await.expect("accept").is_some());

        drop(feeder);
        drop(_client);
        assert!(source.next_channel().await.expect("accept").is_none());
    }
}
