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

//! Engine configuration.

use netconf_ssh_frame::DEFAULT_TERMINATOR;
use std::time::Duration;

/// Configuration for a netconf-ssh server.
#[derive(Debug, Clone)]
pub struct Config {
    /// The frame terminator appended after every message.
    ///
    /// Must not appear inside a well-formed request's content other than
    /// as the terminator itself.
    pub frame_terminator: String,

    /// Identifier of the backend device agent, passed to every handler.
    ///
    /// For the stock handlers this is a unix socket path.
    pub backend_endpoint: String,

    /// Optional per-frame read deadline for active sessions.
    ///
    /// `None` leaves an idle session open indefinitely once it passes
    /// handshake; setting a duration bounds each read instead.
    pub read_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_terminator: DEFAULT_TERMINATOR.to_owned(),
            backend_endpoint: String::new(),
            read_timeout: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the frame terminator.
    #[must_use]
    pub fn with_frame_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.frame_terminator = terminator.into();
        self
    }

    /// Sets the backend agent endpoint.
    #[must_use]
    pub fn with_backend_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.backend_endpoint = endpoint.into();
        self
    }

    /// Sets the per-frame read deadline.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_terminator.is_empty() {
            return Err(ConfigError::EmptyTerminator);
        }
        if let Some(timeout) = self.read_timeout {
            if timeout.is_zero() {
                return Err(ConfigError::ZeroReadTimeout);
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The frame terminator must be non-empty.
    #[error("frame terminator must not be empty")]
    EmptyTerminator,

    /// A zero read timeout would fail every read.
    #[error("read timeout must be greater than zero")]
    ZeroReadTimeout,
}
