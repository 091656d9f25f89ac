//! Pure view functions. Read state, draw to the frame, nothing else.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::input;
use crate::scrollbar::Scrollbar;
use crate::state::TuiState;
use crate::transcript;

const STATUS_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;
const NOTICE_HEIGHT: u16 = 1;
const INDICATOR_HEIGHT: u16 = 1;

/// Padding on each side of the transcript.
const TRANSCRIPT_MARGIN: u16 = 1;
const SCROLLBAR_WIDTH: u16 = 1;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn notice_height(state: &TuiState) -> u16 {
    if state.chat.notice.is_some() {
        NOTICE_HEIGHT
    } else {
        0
    }
}

fn indicator_height(state: &TuiState) -> u16 {
    if state.chat.is_replying() {
        INDICATOR_HEIGHT
    } else {
        0
    }
}

/// Transcript text area `(width, height)` for a terminal of the given size.
pub fn transcript_viewport(state: &TuiState, width: u16, height: u16) -> (usize, usize) {
    let text_width = width.saturating_sub(TRANSCRIPT_MARGIN * 2 + SCROLLBAR_WIDTH);
    let text_height = height.saturating_sub(
        INPUT_HEIGHT + STATUS_HEIGHT + notice_height(state) + indicator_height(state),
    );
    (text_width as usize, text_height as usize)
}

pub fn render(state: &TuiState, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(notice_height(state)),
            Constraint::Length(indicator_height(state)),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_transcript(state, frame, chunks[0]);
    render_notice(state, frame, chunks[1]);
    render_indicator(state, frame, chunks[2]);
    render_input(state, frame, chunks[3]);
    render_status(state, frame, chunks[4]);
}

fn render_transcript(state: &TuiState, frame: &mut Frame, area: Rect) {
    let inner = Rect {
        x: area.x + TRANSCRIPT_MARGIN,
        y: area.y,
        width: area
            .width
            .saturating_sub(TRANSCRIPT_MARGIN * 2 + SCROLLBAR_WIDTH),
        height: area.height,
    };
    let viewport = inner.height as usize;

    if !state.chat.session.is_ready() {
        let line = Line::from(Span::styled(
            "Connecting…",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(bottom_align(vec![line], viewport)), inner);
        return;
    }

    if state.shows_prompts() {
        frame.render_widget(Paragraph::new(prompt_lines(state, viewport)), inner);
        return;
    }

    let lines = transcript::render_messages(state.chat.messages.snapshot(), inner.width as usize);
    let total = lines.len();
    // Measured on the last Frame event; recompute bounds here in case the
    // list changed since.
    let max_offset = total.saturating_sub(viewport);
    let offset = if state.scroll.is_following() {
        max_offset
    } else {
        state.scroll.offset().min(max_offset)
    };

    let visible: Vec<Line<'static>> = lines.into_iter().skip(offset).take(viewport).collect();
    frame.render_widget(Paragraph::new(bottom_align(visible, viewport)), inner);

    let bar_area = Rect {
        x: area.x + area.width.saturating_sub(SCROLLBAR_WIDTH),
        y: area.y,
        width: SCROLLBAR_WIDTH,
        height: area.height,
    };
    frame.render_widget(Scrollbar::new(total, viewport, offset), bar_area);
}

/// Pads short content at the top so the newest line sits at the bottom.
fn bottom_align(lines: Vec<Line<'static>>, height: usize) -> Vec<Line<'static>> {
    if lines.len() >= height {
        return lines;
    }
    let mut padded = vec![Line::default(); height - lines.len()];
    padded.extend(lines);
    padded
}

fn prompt_lines(state: &TuiState, viewport: usize) -> Vec<Line<'static>> {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(
            "Try one of these",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];
    for (i, prompt) in state.options.prompts.iter().take(9).enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("Alt+{}  ", i + 1), key_style),
            Span::raw(prompt.clone()),
        ]));
    }
    bottom_align(lines, viewport)
}

fn render_notice(state: &TuiState, frame: &mut Frame, area: Rect) {
    let Some(notice) = &state.chat.notice else {
        return;
    };
    let line = Line::from(vec![
        Span::styled(
            " ✗ ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(notice.message.clone(), Style::default().fg(Color::Red)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_indicator(state: &TuiState, frame: &mut Frame, area: Rect) {
    if !state.chat.is_replying() {
        return;
    }
    let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
    let line = Line::from(vec![
        Span::styled(format!(" {spinner} "), Style::default().fg(Color::Magenta)),
        Span::styled("assistant is replying", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(state: &TuiState, frame: &mut Frame, area: Rect) {
    let replying = state.chat.is_replying();
    let border_style = if replying {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" message ");
    let inner = block.inner(area);

    let text = state.chat.submission.input();
    let cursor_col = input::display_col(text, state.cursor);
    // Keep the cursor visible by scrolling the line horizontally.
    let h_scroll = cursor_col.saturating_sub((inner.width as usize).saturating_sub(1));

    let paragraph = Paragraph::new(text.to_string())
        .block(block)
        .scroll((0, h_scroll as u16));
    frame.render_widget(paragraph, area);

    if inner.width > 0 && inner.height > 0 {
        let x = inner.x + (cursor_col - h_scroll) as u16;
        frame.set_cursor_position((x, inner.y));
    }
}

fn render_status(state: &TuiState, frame: &mut Frame, area: Rect) {
    let session = state
        .chat
        .session
        .current()
        .map_or_else(|| "no session".to_string(), |s| format!("session {s}"));
    let dim = Style::default().fg(Color::DarkGray);

    let left = Line::from(vec![
        Span::styled(format!(" {session}"), dim),
        Span::styled("  ·  ", dim),
        Span::styled(state.options.backend_label.clone(), dim),
    ]);
    let right = Line::from(Span::styled(
        "Enter send · Ctrl+N new session · Ctrl+C quit ",
        dim,
    ))
    .alignment(Alignment::Right);

    frame.render_widget(Paragraph::new(left), area);
    frame.render_widget(Paragraph::new(right), area);
}
