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

//! netconf-sshd — NETCONF-over-SSH management daemon.
//!
//! Wires the protocol engine to the russh transport, the configured
//! credential store and the backend agent handlers, then serves until
//! interrupted.

mod auth;
mod backend;
mod config;
mod handlers;
mod hostkey;

use anyhow::Context;
use netconf_ssh::{Config, Server};
use netconf_ssh_transport::SshTransportConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let daemon_config = config::load(config_path.as_deref())?;

    let host_key = hostkey::ensure_host_key(&daemon_config.host_key_path)?;
    let authenticator = Arc::new(auth::StaticAuthenticator::new(&daemon_config.users));

    let engine_config = {
        let mut engine_config = Config::new()
            .with_frame_terminator(&daemon_config.frame_end)
            .with_backend_endpoint(&daemon_config.backend_socket_path);
        if let Some(secs) = daemon_config.read_timeout_secs {
            engine_config = engine_config.with_read_timeout(Duration::from_secs(secs));
        }
        engine_config
    };

    let server = Server::new(
        engine_config,
        handlers::build_registry(),
        handlers::capabilities(),
    )?;

    let listener = TcpListener::bind(("0.0.0.0", daemon_config.ssh_port))
        .await
        .with_context(|| format!("bind port {}", daemon_config.ssh_port))?;
    info!(port = daemon_config.ssh_port, "listening for NETCONF-over-SSH");

    let transport = netconf_ssh_transport::serve(
        listener,
        SshTransportConfig {
            banner: Some(daemon_config.server_banner.clone()),
            keys: vec![host_key],
            connection_timeout: Duration::from_secs(daemon_config.connection_timeout_secs),
        },
        authenticator,
    );

    tokio::select! {
        result = server.serve(transport) => {
            result.context("serve loop failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("shutdown complete");
    Ok(())
}
