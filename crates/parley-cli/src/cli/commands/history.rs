//! History command handler.

use anyhow::Result;
use parley_core::chat::Driver;
use parley_core::config;

pub async fn run(config: &config::Config, base_url: Option<&str>) -> Result<()> {
    let (chat, gateway, _) = super::connect(config, base_url)?;
    let mut driver = Driver::new(chat, gateway);
    driver.activate().await;

    let messages = driver.state().messages.snapshot();
    if messages.is_empty() {
        println!("No messages.");
        return Ok(());
    }
    for message in messages {
        println!("{}: {}", message.role, message.content);
    }
    Ok(())
}
