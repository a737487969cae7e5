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

//! SSH transport abstraction for netconf-ssh.
//!
//! These traits abstract over the SSH server implementation, enabling the
//! engine to run against different transports — a real SSH stack in
//! production, an in-memory mock in tests. A transport accepts connections,
//! performs the SSH handshake against a pluggable [`Authenticator`], and
//! hands each accepted `session` channel to the engine together with its
//! request stream and the connection-wide deadline.

mod error;
pub mod mock;
#[cfg(feature = "russh")]
mod russh_adapter;
mod traits;

pub use error::TransportError;
pub use traits::{
    AuthOutcome, Authenticator, ChannelIo, ChannelRequest, ChannelSource, RequestKind,
    SessionChannel,
};

#[cfg(feature = "russh")]
pub use russh_adapter::{serve, SshChannelSource, SshTransportConfig};
