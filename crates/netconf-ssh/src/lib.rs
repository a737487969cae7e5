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

//! NETCONF-over-SSH protocol engine.
//!
//! `netconf-ssh` exposes a network device's configuration surface through
//! the NETCONF protocol carried over an SSH transport. The library owns the
//! protocol mechanics — subsystem negotiation, the hello/capability
//! exchange, terminator-delimited framing, and the per-session
//! read→dispatch→write loop — while three collaborators stay pluggable:
//!
//! - the **transport** (`netconf-ssh-transport`), which accepts connections
//!   and performs the SSH handshake,
//! - the **authenticator**, consulted during that handshake,
//! - the **handlers**, one per data model, which turn a decoded request
//!   into a framed reply using the backend device agent.
//!
//! # Example
//!
//! ```ignore
//! use netconf_ssh::{CapabilitySet, Config, HandlerRegistry, Server};
//!
//! let registry = HandlerRegistry::builder()
//!     .register(Operation::Get, "vlan", vlan_marker, vlan_handler)
//!     .build();
//!
//! let server = Server::new(Config::new(), registry, capabilities)?;
//! server.serve(channel_source).await?;
//! ```

pub use netconf_ssh_frame::{
    extract_message_id, looks_like_rpc, reply, strip_prolog, FrameError, FrameReader, Operation,
    RpcRequest, DEFAULT_TERMINATOR,
};
pub use netconf_ssh_transport::{
    AuthOutcome, Authenticator, ChannelIo, ChannelRequest, ChannelSource, RequestKind,
    SessionChannel,
};

mod capabilities;
mod config;
mod dispatch;
mod error;
mod negotiation;
mod registry;
mod server;
mod session;

pub use capabilities::{CapabilitySet, BASE_CAPABILITY};
pub use config::{Config, ConfigError};
pub use dispatch::Dispatcher;
pub use error::{Error, NegotiationError, TimeoutKind};
pub use registry::{
    HandlerContext, HandlerRegistry, HandlerRegistryBuilder, ModelMarker, Registration, RpcHandler,
};
pub use server::Server;
pub use session::{Session, SessionIds, SessionState};

/// The subsystem name clients must request before NETCONF starts.
pub const NETCONF_SUBSYSTEM: &str = "netconf";
