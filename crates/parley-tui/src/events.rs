use std::time::Instant;

use crossterm::event::Event;
use parley_core::chat::ChatEvent;

/// Everything the TUI reducer reacts to.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Start of a loop iteration, carrying the current terminal size.
    Frame { width: u16, height: u16 },
    Tick(Instant),
    Terminal(Event),
    /// Completion of a backend round trip.
    Chat(ChatEvent),
}
