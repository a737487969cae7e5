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

//! Credential validation.
//!
//! The switch exports its management users as SHA-1 password digests; the
//! daemon carries that list in its configuration and compares the digest
//! of the presented password against it. The client is never told whether
//! the user exists.

use crate::config::UserEntry;
use netconf_ssh::{AuthOutcome, Authenticator};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Authenticator backed by the configured credential list.
pub struct StaticAuthenticator {
    digests: HashMap<String, String>,
}

impl StaticAuthenticator {
    /// Builds the authenticator from configured entries.
    #[must_use]
    pub fn new(users: &[UserEntry]) -> Self {
        let digests = users
            .iter()
            .map(|u| {
                (
                    u.username.trim().to_owned(),
                    u.password_sha1.trim().trim_start_matches('#').to_lowercase(),
                )
            })
            .collect();
        Self { digests }
    }
}

/// Returns the lowercase hex SHA-1 digest of a password.
#[must_use]
pub fn sha1_hex(password: &str) -> String {
    let digest = Sha1::digest(password.trim().as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn verify(&self, username: &str, password: &str) -> AuthOutcome {
        debug!(user = username, "validating credentials");
        match self.digests.get(username.trim()) {
            Some(expected) if *expected == sha1_hex(password) => AuthOutcome::Accept,
            _ => {
                warn!(user = username, "invalid login attempt");
                AuthOutcome::Reject
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> StaticAuthenticator {
        StaticAuthenticator::new(&[UserEntry {
            username: "admin".to_owned(),
            // sha1("switchpass")
            password_sha1: sha1_hex("switchpass"),
        }])
    }

    #[test]
    fn sha1_matches_known_vector() {
        // sha1("") per RFC 3174.
        assert_eq!(sha1_hex(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[tokio::test]
    async fn valid_credentials_accepted() {
        let auth = authenticator();
        assert_eq!(auth.verify("admin", "switchpass").await, AuthOutcome::Accept);
    }

    #[tokio::test]
    async fn wrong_password_rejected() {
        let auth = authenticator();
        assert_eq!(auth.verify("admin", "nope").await, AuthOutcome::Reject);
    }

    #[tokio::test]
    async fn unknown_user_rejected() {
        let auth = authenticator();
        assert_eq!(auth.verify("ghost", "switchpass").await, AuthOutcome::Reject);
    }

    #[tokio::test]
    async fn whitespace_and_hash_prefix_tolerated() {
        // The switch export sometimes prefixes digests with '#'.
        let auth = StaticAuthenticator::new(&[UserEntry {
            username: " admin ".to_owned(),
            password_sha1: format!("#{}", sha1_hex("secret")),
        }]);
        assert_eq!(auth.verify("admin", "secret").await, AuthOutcome::Accept);
    }
}
