//! Exec command handler.

use anyhow::{Result, bail};
use parley_core::chat::{Driver, Role};
use parley_core::config;

/// Sends `prompt` in the stored session and prints the reply.
///
/// A failed send still prints the fallback reply, matching what the chat
/// screen would show.
pub async fn run(config: &config::Config, base_url: Option<&str>, prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt must not be empty");
    }

    let (chat, gateway, _) = super::connect(config, base_url)?;
    let mut driver = Driver::new(chat, gateway);
    driver.activate().await;
    driver.submit(prompt).await;

    let state = driver.state();
    match state.messages.last() {
        Some(message) if message.role == Role::Assistant => {
            println!("{}", message.content);
            Ok(())
        }
        _ => bail!("No reply received"),
    }
}
