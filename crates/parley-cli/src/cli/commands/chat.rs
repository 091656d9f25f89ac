//! Chat command handler.

use std::io::{IsTerminal, Read};

use anyhow::{Context, Result};
use parley_core::config;

use super::exec;
use crate::modes;

pub async fn run(config: &config::Config, base_url: Option<&str>) -> Result<()> {
    // If stdin is piped, run exec mode instead
    if !std::io::stdin().is_terminal() {
        let mut prompt = String::new();
        std::io::stdin().lock().read_to_string(&mut prompt)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            anyhow::bail!("No input provided via pipe");
        }
        return exec::run(config, base_url, prompt).await;
    }

    let (chat, gateway, backend_label) = super::connect(config, base_url)?;
    let options = modes::TuiOptions {
        backend_label,
        prompts: config.prompts.clone(),
    };

    modes::run_interactive_chat(chat, gateway, options)
        .await
        .context("interactive chat failed")?;

    Ok(())
}
