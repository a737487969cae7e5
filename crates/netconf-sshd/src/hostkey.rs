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

//! Host-key provisioning.
//!
//! Loads the daemon's OpenSSH host key, generating and persisting a fresh
//! ed25519 key (owner-readable only) when none exists yet.

use anyhow::Context;
use russh::keys::ssh_key::LineEnding;
use russh::keys::{Algorithm, PrivateKey};
use std::path::Path;
use tracing::info;

/// Returns the host key at `path`, generating one if the file is missing.
///
/// # Errors
///
/// Returns an error if the key cannot be loaded, generated, or persisted.
pub fn ensure_host_key(path: &Path) -> anyhow::Result<PrivateKey> {
    if path.exists() {
        let key = russh::keys::load_secret_key(path, None)
            .with_context(|| format!("load host key {}", path.display()))?;
        info!(path = %path.display(), "host key loaded");
        return Ok(key);
    }

    info!(path = %path.display(), "host key not found, generating a new one");
    let key = PrivateKey::random(&mut rand::rngs::OsRng, Algorithm::Ed25519)
        .context("generate ed25519 host key")?;
    let encoded = key
        .to_openssh(LineEnding::LF)
        .context("encode host key")?;

    write_private(path, encoded.as_bytes())
        .with_context(|| format!("write host key {}", path.display()))?;
    info!(path = %path.display(), "host key generated and saved");
    Ok(key)
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
