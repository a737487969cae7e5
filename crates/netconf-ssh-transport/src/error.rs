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

//! Error types for transport implementations.

use thiserror::Error;

/// Errors surfaced by transport implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error on the listener or a connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SSH protocol error.
    #[cfg(feature = "russh")]
    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),
}
