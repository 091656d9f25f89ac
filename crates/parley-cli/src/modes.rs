//! Interactive mode, compiled in with the `tui` feature.

#[cfg(feature = "tui")]
pub use parley_tui::{TuiOptions, run_interactive_chat};

#[cfg(not(feature = "tui"))]
pub async fn run_interactive_chat(
    _chat: parley_core::chat::ChatState,
    _gateway: std::sync::Arc<dyn parley_core::gateway::BackendGateway>,
    _options: TuiOptions,
) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}

#[cfg(not(feature = "tui"))]
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    pub backend_label: String,
    pub prompts: Vec<String>,
}
