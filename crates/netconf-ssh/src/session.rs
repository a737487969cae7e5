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

//! The NETCONF session loop.
//!
//! One session owns one SSH channel and progresses through three states:
//!
//! ```text
//! Handshake ──► Active ──► Closed
//! ```
//!
//! Handshake writes the hello and reads the client's; Active runs the
//! strictly sequential read→dispatch→write loop — the next frame is not
//! read until the previous reply is fully written, so exactly one reply is
//! produced per request, in request order. A clean end of stream ends the
//! session normally; any other read error terminates it with an error.

use crate::capabilities::CapabilitySet;
use crate::dispatch::Dispatcher;
use crate::error::{Error, TimeoutKind};
use netconf_ssh_frame::{looks_like_rpc, FrameReader};
use netconf_ssh_transport::ChannelIo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Session identifiers start above this value.
const SESSION_ID_BASE: u64 = 1000;

/// Process-wide session identifier allocator.
///
/// Identifiers are unique and strictly increasing for the process
/// lifetime; allocation is a single atomic increment, safe under
/// concurrent session creation.
#[derive(Debug)]
pub struct SessionIds {
    next: AtomicU64,
}

impl SessionIds {
    /// Creates an allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(SESSION_ID_BASE + 1),
        }
    }

    /// Returns the next session identifier.
    pub fn next_session_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SessionIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Hello exchange in progress.
    Handshake,
    /// Serving requests.
    Active,
    /// Channel closed, buffers discarded.
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Handshake => write!(f, "handshake"),
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// One NETCONF conversation over one SSH channel.
///
/// Owned exclusively by its session task; nothing here is shared.
pub struct Session<C> {
    id: u64,
    state: SessionState,
    reader: FrameReader<ReadHalf<C>>,
    writer: WriteHalf<C>,
    terminator: String,
    read_timeout: Option<Duration>,
}

impl<C: ChannelIo> Session<C> {
    /// Creates a session over a negotiated channel.
    pub fn new(
        id: u64,
        io: C,
        terminator: impl Into<String>,
        read_timeout: Option<Duration>,
    ) -> Self {
        let terminator = terminator.into();
        let (read_half, write_half) = tokio::io::split(io);
        Self {
            id,
            state: SessionState::Handshake,
            reader: FrameReader::new(read_half, terminator.as_bytes().to_vec()),
            writer: write_half,
            terminator,
            read_timeout,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion.
    ///
    /// # Errors
    ///
    /// Returns an error for I/O or framing failures; a client closing its
    /// stream cleanly is a normal termination, not an error.
    #[instrument(skip_all, fields(session = self.id))]
    pub async fn run(
        mut self,
        dispatcher: &Dispatcher,
        capabilities: &CapabilitySet,
    ) -> Result<(), Error> {
        let hello = capabilities.hello_document(self.id, &self.terminator);
        self.writer.write_all(&hello).await?;
        self.writer.flush().await?;
        debug!("hello sent");

        // The client hello is logged but not required to be well-formed.
        let Some(client_hello) = self.read_next().await? else {
            debug!("channel closed before client hello");
            self.state = SessionState::Closed;
            return Ok(());
        };
        debug!(len = client_hello.len(), "client hello received");

        // Leniency: a client that skips its hello and sends an RPC right
        // away is answered before the main loop starts.
        if looks_like_rpc(&client_hello) {
            debug!("first client frame is an RPC, dispatching immediately");
            let response = dispatcher.dispatch(&client_hello).await;
            self.writer.write_all(&response).await?;
            self.writer.flush().await?;
        }

        self.state = SessionState::Active;
        debug!("session active");

        loop {
            let Some(request) = self.read_next().await? else {
                info!("client closed the channel");
                break;
            };

            let response = dispatcher.dispatch(&request).await;
            self.writer.write_all(&response).await?;
            self.writer.flush().await?;
        }

        self.state = SessionState::Closed;
        Ok(())
    }

    /// Reads the next frame, applying the per-read deadline if configured.
    async fn read_next(&mut self) -> Result<Option<Vec<u8>>, Error> {
        match self.read_timeout {
            Some(limit) => match timeout(limit, self.reader.read_frame()).await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => {
                    warn!("read deadline elapsed");
                    Err(Error::Timeout(TimeoutKind::Read))
                }
            },
            None => self.reader.read_frame().await.map_err(Error::from),
        }
    }
}
