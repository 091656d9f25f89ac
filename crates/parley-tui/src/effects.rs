use parley_core::chat::ChatEffect;

/// Side effects requested by the TUI reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,
    Chat(ChatEffect),
}
