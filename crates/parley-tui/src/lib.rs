//! Full-screen terminal chat for parley.
//!
//! Elm-style split:
//! - `state`: everything the screen shows, wrapping the core [`ChatState`]
//! - `update`: the reducer, turning terminal input into chat events
//! - `render`: pure drawing from state
//! - `runtime`: owns the terminal, spawns backend round trips, feeds results
//!   back through an inbox
//!
//! [`ChatState`]: parley_core::chat::ChatState

mod effects;
mod events;
mod input;
mod render;
mod runtime;
mod scroll;
mod scrollbar;
mod state;
mod terminal;
mod transcript;
mod update;

use std::io::{IsTerminal, Write, stderr};
use std::sync::Arc;

use anyhow::Result;
use parley_core::chat::ChatState;
use parley_core::gateway::BackendGateway;

pub use runtime::TuiRuntime;
pub use state::TuiOptions;

/// Runs the interactive chat until the user quits.
///
/// Must be called from inside a multi-threaded tokio runtime: backend round
/// trips are spawned onto it while this call drives the terminal.
pub async fn run_interactive_chat(
    chat: ChatState,
    gateway: Arc<dyn BackendGateway>,
    options: TuiOptions,
) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Chat mode requires a terminal.\n\
             Use `parley exec --prompt '...'` for non-interactive use."
        );
    }

    let mut err = stderr();
    writeln!(err, "parley")?;
    writeln!(err, "Backend: {}", options.backend_label)?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(chat, gateway, options)?;
    runtime.run()
}
