use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph};

use crate::app::{App, ChatEntry, Screen};
use crate::problem::Difficulty;
use crate::session::DotState;
use crate::text_layout::wrap_word_with_positions;
use crate::theme::Theme;

const STATUS_HEIGHT: u16 = 3;
const CONTEXT_HEIGHT: u16 = 3;
const TEXT_PADDING: u16 = 1;
const MAX_INPUT_TEXT_LINES: u16 = 5;
const PANEL_WIDTH: u16 = 64;

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let [body, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
        .areas(frame.area());

    match app.screen() {
        Screen::KeyEntry => render_key_screen(frame, body, app, theme),
        Screen::Start => render_start_screen(frame, body, app, theme),
        Screen::Chat => render_chat_screen(frame, body, app, theme),
        Screen::Settings => render_settings_screen(frame, body, app, theme),
    }

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.status_bg)),
        status,
    );
    frame.render_widget(
        Paragraph::new(status_line_text(app))
            .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.status_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        status,
    );
}

// ---------------------------------------------------------------------------
// Key entry
// ---------------------------------------------------------------------------

fn render_key_screen(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.panel_bg)),
        area,
    );
    let panel = centered_rect(area, PANEL_WIDTH, 9);

    let key_display = if app.key_masked() {
        "\u{2022}".repeat(app.key_input().text().chars().count())
    } else {
        app.key_input().text().to_string()
    };

    let mut lines = vec![
        Line::styled(
            "Connect your model API key",
            Style::default().fg(theme.accent_fg),
        ),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Key: ", Style::default().fg(theme.muted_fg)),
            Span::styled(key_display, Style::default().fg(theme.text_fg)),
        ]),
        Line::raw(""),
    ];
    if let Some(error) = app.key_error() {
        lines.push(Line::styled(
            error.to_string(),
            Style::default().fg(theme.error_fg),
        ));
    } else if let Some(notice) = app.key_notice() {
        lines.push(Line::styled(
            notice.to_string(),
            Style::default().fg(theme.accent_fg),
        ));
    } else {
        lines.push(Line::styled(
            "The key is verified with a one-token request before it is saved.",
            Style::default().fg(theme.muted_fg),
        ));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        panel,
    );
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

fn render_start_screen(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.panel_bg)),
        area,
    );
    let panel = centered_rect(area, PANEL_WIDTH.max(area.width / 2), 9);

    let mut lines = vec![
        Line::styled(
            "Start a tutoring session",
            Style::default().fg(theme.accent_fg),
        ),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Problem page: ", Style::default().fg(theme.muted_fg)),
            Span::styled(
                app.target_input().text().to_string(),
                Style::default().fg(theme.text_fg),
            ),
        ]),
        Line::raw(""),
    ];
    if let Some(error) = app.start_error() {
        lines.push(Line::styled(
            error.to_string(),
            Style::default().fg(theme.error_fg),
        ));
    } else {
        lines.push(Line::styled(
            "A LeetCode or TakeUForward problem page (URL or saved page file).",
            Style::default().fg(theme.muted_fg),
        ));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        panel,
    );
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

fn render_chat_screen(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let [context_area, messages_area, input_area] = chat_areas(area, app);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.context_bg)),
        context_area,
    );
    frame.render_widget(
        Paragraph::new(context_line(app, theme))
            .style(Style::default().bg(theme.context_bg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.context_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        context_area,
    );

    let width = messages_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let lines = chat_lines(app, width, theme);
    let total_lines = lines.len() as u16;
    let visible = messages_area.height.saturating_sub(TEXT_PADDING * 2);
    let max_scroll = total_lines.saturating_sub(visible);
    let scroll = app.chat_scroll_for(max_scroll);

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.chat_bg).fg(theme.text_fg))
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.chat_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        messages_area,
    );

    let input_width = input_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let wrapped = wrap_word_with_positions(app.chat_input().text(), input_width);
    frame.render_widget(
        Paragraph::new(wrapped.rendered.as_str())
            .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        input_area,
    );
    if let Some(&(line, col)) = wrapped.positions.get(app.chat_input().cursor()) {
        let visible_rows = input_area.height.saturating_sub(TEXT_PADDING * 2);
        if line < visible_rows {
            frame.set_cursor_position((
                input_area.x + TEXT_PADDING + col,
                input_area.y + TEXT_PADDING + line,
            ));
        }
    }
}

fn chat_areas(body: Rect, app: &App) -> [Rect; 3] {
    let input_width = body.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let input_lines = wrap_word_with_positions(app.chat_input().text(), input_width)
        .line_count
        .clamp(1, MAX_INPUT_TEXT_LINES);
    let input_height = input_lines + TEXT_PADDING * 2;
    Layout::vertical([
        Constraint::Length(CONTEXT_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(input_height),
    ])
    .areas(body)
}

/// Scroll ceiling for the chat transcript at the current terminal size; the
/// main loop clamps Down-key scrolling against it.
pub fn chat_max_scroll(screen: Rect, app: &App, theme: &Theme) -> u16 {
    let [body, _status] = Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
        .areas(screen);
    let [_context, messages_area, _input] = chat_areas(body, app);
    let width = messages_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let total = chat_lines(app, width, theme).len() as u16;
    let visible = messages_area.height.saturating_sub(TEXT_PADDING * 2);
    total.saturating_sub(visible)
}

fn context_line(app: &App, theme: &Theme) -> Line<'static> {
    let Some(context) = app.context() else {
        return Line::styled("No session", Style::default().fg(theme.muted_fg));
    };
    let mut spans = vec![
        Span::styled(
            context.title.clone(),
            Style::default().fg(theme.text_fg).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", context.difficulty.as_str()),
            Style::default().fg(difficulty_color(context.difficulty)),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", context.language),
            Style::default().fg(theme.accent_fg),
        ),
        Span::raw("  "),
    ];
    spans.push(Span::styled(
        dots_glyphs(&context.dots),
        Style::default().fg(theme.system_fg),
    ));
    Line::from(spans)
}

pub fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Rgb(130, 200, 130),
        Difficulty::Medium => Color::Rgb(230, 190, 100),
        Difficulty::Hard => Color::Rgb(235, 120, 110),
        Difficulty::Unknown => Color::Rgb(160, 160, 160),
    }
}

/// Attempt indicator: one glyph per slot, pseudo shown distinctly.
pub fn dots_glyphs(dots: &[DotState]) -> String {
    dots.iter()
        .map(|dot| match dot {
            DotState::Empty => '\u{25CB}',
            DotState::Used => '\u{25CF}',
            DotState::Pseudo => '\u{25C6}',
        })
        .map(|glyph| glyph.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn chat_lines(app: &App, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in app.entries() {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        match entry {
            ChatEntry::Student(text) => {
                push_wrapped(&mut lines, &format!("You: {text}"), width, theme.student_fg);
            }
            ChatEntry::Mentor(text) => {
                push_wrapped(&mut lines, &format!("Mentor: {text}"), width, theme.mentor_fg);
            }
            ChatEntry::System(text) => {
                push_wrapped(&mut lines, &format!("System: {text}"), width, theme.system_fg);
            }
            ChatEntry::MentorPseudo {
                before,
                pseudocode,
                after,
            } => {
                if !before.is_empty() {
                    push_wrapped(&mut lines, &format!("Mentor: {before}"), width, theme.mentor_fg);
                    lines.push(Line::raw(""));
                }
                for row in wrapped_rows(pseudocode, width.saturating_sub(2).max(1)) {
                    lines.push(Line::styled(
                        format!(" {row} "),
                        Style::default().bg(theme.pseudo_bg).fg(theme.text_fg),
                    ));
                }
                if !after.is_empty() {
                    lines.push(Line::raw(""));
                    push_wrapped(&mut lines, after, width, theme.mentor_fg);
                }
            }
        }
    }
    if app.reply_in_flight() {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(
            format!("Mentor is thinking {}", thinking_frame(app.ticks)),
            Style::default().fg(theme.muted_fg),
        ));
    }
    lines
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: u16, fg: Color) {
    for row in wrapped_rows(text, width) {
        lines.push(Line::styled(row, Style::default().fg(fg)));
    }
}

fn wrapped_rows(text: &str, width: u16) -> Vec<String> {
    wrap_word_with_positions(text, width)
        .rendered
        .split('\n')
        .map(ToString::to_string)
        .collect()
}

pub fn thinking_frame(ticks: u64) -> &'static str {
    const FRAMES: [&str; 6] = ["[   ]", "[.  ]", "[.. ]", "[...]", "[ ..]", "[  .]"];
    FRAMES[((ticks / 2) as usize) % FRAMES.len()]
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn render_settings_screen(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.panel_bg)),
        area,
    );
    let panel = centered_rect(area, PANEL_WIDTH, 9);

    let key_line = match app.masked_stored_key() {
        Some(masked) => masked.to_string(),
        None => "(no key stored)".to_string(),
    };
    let lines = vec![
        Line::styled("Settings", Style::default().fg(theme.accent_fg)),
        Line::raw(""),
        Line::from(vec![
            Span::styled("API key: ", Style::default().fg(theme.muted_fg)),
            Span::styled(key_line, Style::default().fg(theme.text_fg)),
        ]),
        Line::raw(""),
        Line::styled(
            "Enter replaces the stored key. Esc goes back.",
            Style::default().fg(theme.muted_fg),
        ),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        panel,
    );
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

pub fn status_line_text(app: &App) -> String {
    let base = match app.screen() {
        Screen::KeyEntry => "Enter verify & save | Tab show/hide key | Ctrl+C quit",
        Screen::Start => "Enter start session | Esc settings | Ctrl+C quit",
        Screen::Chat => "Enter send | /reread /settings /quit | Up/Down scroll | Esc settings",
        Screen::Settings => "Enter change key | Esc back",
    };
    if app.verify_in_flight() {
        format!("{base} | Verifying key {}", thinking_frame(app.ticks))
    } else if app.read_in_flight() {
        format!("{base} | Reading page {}", thinking_frame(app.ticks))
    } else if app.reread_in_flight() {
        format!("{base} | Re-reading code {}", thinking_frame(app.ticks))
    } else if app.reply_in_flight() {
        format!("{base} | Mentor is thinking {}", thinking_frame(app.ticks))
    } else {
        base.to_string()
    }
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
