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

//! Daemon configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Daemon configuration, loadable from a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// TCP port the SSH listener binds (IANA assigns 830 for NETCONF).
    pub ssh_port: u16,
    /// SSH identification banner.
    pub server_banner: String,
    /// NETCONF frame terminator.
    pub frame_end: String,
    /// Connection-wide deadline in seconds, bounding subsystem negotiation.
    pub connection_timeout_secs: u64,
    /// Optional per-frame read deadline for active sessions, in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Path of the OpenSSH host key; generated if absent.
    pub host_key_path: PathBuf,
    /// Unix socket of the backend device agent.
    pub backend_socket_path: String,
    /// Credential store: usernames with SHA-1 password digests.
    pub users: Vec<UserEntry>,
}

/// One credential-store entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    /// Login name.
    pub username: String,
    /// Lowercase hex SHA-1 digest of the password.
    pub password_sha1: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            ssh_port: 830,
            server_banner: "SSH-2.0-netconf-sshd_0.1".to_owned(),
            frame_end: "]]>]]>".to_owned(),
            connection_timeout_secs: 900,
            read_timeout_secs: None,
            host_key_path: PathBuf::from("./netconf_host_key"),
            backend_socket_path: "/var/run/miyagi.sock".to_owned(),
            users: Vec::new(),
        }
    }
}

/// Loads the configuration.
///
/// With no path given, built-in defaults are used.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: Option<&Path>) -> anyhow::Result<DaemonConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("read config {}: {e}", path.display()))?;
            let config: DaemonConfig = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => {
            info!("no configuration file given, using defaults");
            Ok(DaemonConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let config = DaemonConfig::default();
        assert_eq!(config.ssh_port, 830);
        assert_eq!(config.frame_end, "]]>]]>");
        assert_eq!(config.connection_timeout_secs, 900);
        assert_eq!(config.backend_socket_path, "/var/run/miyagi.sock");
        assert!(config.users.is_empty());
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let parsed: DaemonConfig = serde_json::from_str(
            r#"{"ssh_port": 8830, "users": [{"username": "admin", "password_sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709"}]}"#,
        )
        .expect("parse");

        assert_eq!(parsed.ssh_port, 8830);
        assert_eq!(parsed.users.len(), 1);
        assert_eq!(parsed.users[0].username, "admin");
        // Unspecified fields keep their defaults.
        assert_eq!(parsed.frame_end, "]]>]]>");
    }
}
