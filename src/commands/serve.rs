use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    aws::{RoleSet, StsAssumeRole},
    config::{self, Config},
    server::MetadataServer,
};

#[derive(Debug, Clone, Default, Args)]
pub struct ServeCommand {
    #[arg(short = 'l', long, help = "Address to listen on (overrides the config file)")]
    pub listen: Option<String>,

    #[arg(
        short = 'r',
        long,
        help = "Role served first (overrides default_role from the config file)"
    )]
    pub default_role: Option<String>,
}

impl ServeCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = config::load(config_path).await?;

        let default_role = self.default_role.as_deref().unwrap_or(&config.default_role);
        let listen = self.listen.as_deref().unwrap_or(&config.listen);

        let server = build_server(&config, default_role).await?;
        let listener = bind(listen).await?;

        Arc::new(server).serve(listener, shutdown_signal()).await
    }
}

/// Accepts `host:port` with a host name, and `:port` for every interface
async fn bind(listen: &str) -> Result<TcpListener> {
    let addr = bind_addr(listen);
    TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {listen}"))
}

fn bind_addr(listen: &str) -> String {
    match listen.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => listen.to_string(),
    }
}

async fn build_server(config: &Config, default_role: &str) -> Result<MetadataServer> {
    let provider = StsAssumeRole::new(config.profile.as_deref(), config.region.as_deref()).await;
    let roles = RoleSet::from_config(&config.roles, Arc::new(provider), config.role_options())
        .context("Invalid role configuration")?;
    info!("Loaded {} roles", roles.len());

    MetadataServer::new(Arc::new(roles), default_role)
        .with_context(|| format!("Default role '{default_role}' is not configured"))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, serving until killed: {}", e);
            std::future::pending::<()>().await
        }
    }
}
