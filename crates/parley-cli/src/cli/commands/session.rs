//! Session command handlers.

use anyhow::{Context, Result, anyhow};
use parley_core::config;
use parley_core::identity::{FileIdentityStore, IdentityStore};

pub fn show() -> Result<()> {
    match FileIdentityStore::open_default().get() {
        Some(id) => println!("{id}"),
        None => println!("No session."),
    }
    Ok(())
}

/// Asks the backend for a fresh session and stores it.
///
/// The stored id is replaced only once the backend has answered, so a failed
/// request leaves the previous session (or its absence) untouched.
pub async fn new(config: &config::Config, base_url: Option<&str>) -> Result<()> {
    let (gateway, _) = super::gateway(config, base_url)?;

    let id = gateway
        .new_session()
        .await
        .map_err(|err| anyhow!("Could not start a new session: {err}"))?;

    let mut store = FileIdentityStore::open_default();
    store.set(&id).context("store new session")?;
    tracing::info!(session = %id, "started new session");
    println!("{id}");
    Ok(())
}

pub fn clear() -> Result<()> {
    let mut store = FileIdentityStore::open_default();
    store.clear().context("clear stored session")?;
    println!("Session cleared.");
    Ok(())
}
