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

//! Error types for framing and request parsing.

use thiserror::Error;

/// Errors that can occur while reading frames from the wire.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The receive buffer grew past the maximum frame size without a
    /// terminator appearing.
    #[error("frame size {size} exceeds maximum {max}", max = crate::MAX_FRAME_SIZE)]
    FrameTooLarge {
        /// Bytes buffered when the limit was hit.
        size: usize,
    },

    /// The stream ended while a partial frame was still buffered.
    #[error("stream ended with {buffered} bytes of partial frame")]
    TruncatedFrame {
        /// Bytes left in the buffer at end of stream.
        buffered: usize,
    },

    /// I/O error from the underlying channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while parsing a request frame for routing.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The frame carries no `<rpc` element at all.
    #[error("request frame does not contain an <rpc> element")]
    NoRpcElement,
}
