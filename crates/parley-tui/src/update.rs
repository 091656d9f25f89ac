//! TUI reducer.
//!
//! Translates terminal input into chat events, forwards everything to the
//! core reducer, and lets the scroll anchor observe the message list after
//! each step.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use parley_core::chat::{self, ChatEvent};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render;
use crate::state::TuiState;
use crate::transcript;

const MOUSE_SCROLL_LINES: usize = 3;

pub fn update(state: &mut TuiState, event: UiEvent) -> Vec<UiEffect> {
    let effects = match event {
        UiEvent::Frame { width, height } => {
            on_frame(state, width, height);
            vec![]
        }
        UiEvent::Tick(now) => {
            if state.chat.is_replying() {
                state.spinner_frame = state.spinner_frame.wrapping_add(1);
            }
            dispatch(state, ChatEvent::Tick(now))
        }
        UiEvent::Terminal(event) => on_terminal(state, event),
        UiEvent::Chat(event) => dispatch(state, event),
    };

    state.scroll.observe(state.chat.messages.revision());
    state.cursor.clamp(state.chat.submission.input());
    effects
}

fn dispatch(state: &mut TuiState, event: ChatEvent) -> Vec<UiEffect> {
    chat::update(&mut state.chat, event)
        .into_iter()
        .map(UiEffect::Chat)
        .collect()
}

fn on_frame(state: &mut TuiState, width: u16, height: u16) {
    state.size = (width, height);
    let (text_width, text_height) = render::transcript_viewport(state, width, height);
    let line_count =
        transcript::render_messages(state.chat.messages.snapshot(), text_width).len();
    state.scroll.measure(line_count, text_height);
}

fn on_terminal(state: &mut TuiState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => on_key(state, key),
        Event::Paste(text) => {
            let cursor = &mut state.cursor;
            cursor.insert_str(state.chat.submission.input_mut(), &text);
            vec![]
        }
        Event::Mouse(mouse) => {
            match mouse.kind {
                MouseEventKind::ScrollUp => state.scroll.scroll_up(MOUSE_SCROLL_LINES),
                MouseEventKind::ScrollDown => state.scroll.scroll_down(MOUSE_SCROLL_LINES),
                _ => {}
            }
            vec![]
        }
        _ => vec![],
    }
}

fn on_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if matches!(key.kind, KeyEventKind::Release) {
        return vec![];
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c') if ctrl => vec![UiEffect::Quit],
        KeyCode::Char('n') if ctrl => dispatch(state, ChatEvent::NewSession),
        KeyCode::Char(digit @ '1'..='9') if alt => {
            let index = digit as usize - '1' as usize;
            match state.options.prompts.get(index) {
                Some(prompt) if state.shows_prompts() => {
                    let prompt = prompt.clone();
                    let effects = dispatch(state, ChatEvent::SubmitPrompt(prompt));
                    state.cursor.move_end(state.chat.submission.input());
                    effects
                }
                _ => vec![],
            }
        }
        KeyCode::Enter => dispatch(state, ChatEvent::Submit),
        KeyCode::Esc => dispatch(state, ChatEvent::DismissNotice),
        KeyCode::PageUp => {
            state.scroll.page_up();
            vec![]
        }
        KeyCode::PageDown => {
            state.scroll.page_down();
            vec![]
        }
        KeyCode::Home if ctrl => {
            state.scroll.scroll_to_top();
            vec![]
        }
        KeyCode::End if ctrl => {
            state.scroll.scroll_to_bottom();
            vec![]
        }
        _ => {
            let cursor = &mut state.cursor;
            cursor.input(state.chat.submission.input_mut(), key);
            vec![]
        }
    }
}
