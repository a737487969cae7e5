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

//! NETCONF wire-level building blocks for netconf-ssh.
//!
//! This crate provides the message layer shared by the engine and by
//! handler implementations: the terminator-delimited frame codec, the
//! minimal RPC request parser used for routing, and the rpc-reply builders.

mod error;
mod framing;
pub mod reply;
mod rpc;

pub use error::{FrameError, RpcError};
pub use framing::{encode_frame, FrameBuffer, FrameReader, DEFAULT_TERMINATOR, MAX_FRAME_SIZE};
pub use rpc::{extract_message_id, looks_like_rpc, strip_prolog, Operation, RpcRequest};
