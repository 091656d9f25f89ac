//! CLI command handlers.

pub mod chat;
pub mod config;
pub mod exec;
pub mod history;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use parley_core::chat::{ChatSettings, ChatState};
use parley_core::config::Config;
use parley_core::gateway::{BackendGateway, HttpGateway, HttpGatewayOptions};
use parley_core::identity::FileIdentityStore;

/// Builds the HTTP gateway, returning it with the resolved base URL.
fn gateway(config: &Config, base_url: Option<&str>) -> Result<(Arc<dyn BackendGateway>, String)> {
    let options = HttpGatewayOptions::from_config(config, base_url).context("resolve backend")?;
    let label = options.base_url.to_string();
    let gateway = HttpGateway::new(options).context("create backend client")?;
    Ok((Arc::new(gateway), label))
}

/// Builds the HTTP gateway and a chat state backed by the stored identity.
fn connect(
    config: &Config,
    base_url: Option<&str>,
) -> Result<(ChatState, Arc<dyn BackendGateway>, String)> {
    let (gateway, label) = gateway(config, base_url)?;
    let chat = ChatState::new(
        Box::new(FileIdentityStore::open_default()),
        ChatSettings::from(config),
    );
    Ok((chat, gateway, label))
}
