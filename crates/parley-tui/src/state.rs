use parley_core::chat::ChatState;

use crate::input::Cursor;
use crate::scroll::ScrollAnchor;

/// Presentation settings passed in by the CLI.
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    /// Shown in the status line, usually the backend URL.
    pub backend_label: String,
    /// Example prompts offered while the conversation is empty.
    pub prompts: Vec<String>,
}

/// Everything the screen needs. Mutated only by the reducer.
pub struct TuiState {
    pub chat: ChatState,
    pub options: TuiOptions,
    pub cursor: Cursor,
    pub scroll: ScrollAnchor,
    /// Last known terminal size.
    pub size: (u16, u16),
    /// Advances every tick while a reply is pending.
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl TuiState {
    pub fn new(chat: ChatState, options: TuiOptions) -> Self {
        Self {
            chat,
            options,
            cursor: Cursor::default(),
            scroll: ScrollAnchor::default(),
            size: (0, 0),
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Example prompts are offered only on an empty, idle conversation.
    pub fn shows_prompts(&self) -> bool {
        self.chat.session.is_ready()
            && self.chat.messages.is_empty()
            && !self.chat.is_replying()
            && !self.options.prompts.is_empty()
    }

    /// True when the loop should tick at frame rate instead of idling.
    pub fn is_busy(&self) -> bool {
        self.chat.is_replying()
            || !self.chat.session.is_ready()
            || self.chat.session.is_resetting()
            || self.chat.notice.is_some()
    }
}
