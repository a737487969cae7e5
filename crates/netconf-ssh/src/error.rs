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

//! Error types for the engine.

use netconf_ssh_frame::FrameError;
use thiserror::Error;

/// Errors that can occur while serving NETCONF sessions.
#[derive(Debug, Error)]
pub enum Error {
    /// Subsystem negotiation failed.
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    /// An operation exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(TimeoutKind),

    /// Framing failure on the channel.
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),

    /// I/O failure writing a reply or the hello.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level error from the channel source.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    /// Creates a transport error from any error type.
    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(error))
    }
}

/// Errors that can occur during subsystem negotiation.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The request stream ended before a netconf subsystem request arrived.
    #[error("channel closed before the netconf subsystem was requested")]
    ChannelClosed,
}

/// Types of timeout that can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// The connection deadline elapsed during subsystem negotiation.
    Negotiation,
    /// A per-frame read deadline elapsed.
    Read,
}

impl std::fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negotiation => write!(f, "negotiation"),
            Self::Read => write!(f, "read"),
        }
    }
}
