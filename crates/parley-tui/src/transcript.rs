//! Turns the message list into styled, wrapped lines.
//!
//! User messages sit in a right-aligned lane, assistant messages in a
//! left-aligned one. Content is shown as plain wrapped text.

use parley_core::chat::{Message, Role};
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Share of the transcript width a message lane may occupy.
const LANE_PERCENT: usize = 80;

pub fn render_messages(messages: &[Message], width: usize) -> Vec<Line<'static>> {
    let lane_width = (width * LANE_PERCENT / 100).max(1);
    let mut lines = Vec::new();

    for message in messages {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        let (label, label_style, body_style, alignment) = lane(message.role);

        lines.push(Line::from(Span::styled(label, label_style)).alignment(alignment));
        for row in wrap(&message.content, lane_width) {
            lines.push(Line::from(Span::styled(row, body_style)).alignment(alignment));
        }
    }

    lines
}

fn lane(role: Role) -> (&'static str, Style, Style, Alignment) {
    match role {
        Role::User => (
            "you",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
            Alignment::Right,
        ),
        Role::Assistant => (
            "assistant",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Style::default(),
            Alignment::Left,
        ),
    }
}

/// Greedy word wrap by display width. Words wider than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;

        for word in paragraph.split(' ') {
            let word_width: usize = word.chars().map(|c| c.width().unwrap_or(0)).sum();
            let sep = usize::from(!row.is_empty());

            if row_width + sep + word_width <= width {
                if sep == 1 {
                    row.push(' ');
                }
                row.push_str(word);
                row_width += sep + word_width;
                continue;
            }

            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if row_width + ch_width > width && !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(ch);
                row_width += ch_width;
            }
        }
        rows.push(row);
    }

    rows
}
