use arka_core::ChatRole;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Focus};

const ASSISTANT_NAME: &str = "Arka";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [chat_area, input_row] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(body_area);

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_row);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.pending_count();
    let pending_indicator = if pending > 0 {
        format!(" [{} waiting]", pending)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(format!(" {} ", ASSISTANT_NAME), Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
        Span::styled(pending_indicator, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    // Store inner dimensions for scroll calculations (minus borders)
    app.chat.height = area.height.saturating_sub(2);
    app.chat.width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat_text: Text<'static> = if app.chat.entries().is_empty() {
        Text::from(Span::styled(
            "Type a message and press Enter...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for entry in app.chat.entries() {
            let (label, color) = match entry.role {
                ChatRole::User => ("You:".to_string(), Color::Cyan),
                ChatRole::Assistant => (format!("{}:", ASSISTANT_NAME), Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));

            if entry.pending {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    dots,
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            } else {
                lines.extend(entry.lines.iter().cloned());
            }
            lines.push(Line::default());
        }

        Text::from(lines)
    };

    // Measure before the block is attached so borders are not counted
    let chat = Paragraph::new(chat_text).wrap(Wrap { trim: false });
    let total_rows = chat.line_count(app.chat.width);
    app.chat.settle(total_rows.min(u16::MAX as usize) as u16);

    let chat = chat.block(chat_block).scroll((app.chat.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(10)]).areas(area);

    app.send_area = Some(send_area);

    let input_focused = app.focus == Focus::Input;
    let input_border_color = if input_focused { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message ");

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input.cursor();

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, input_area);

    let send_style = if app.focus == Focus::Send {
        Style::default().bg(Color::Yellow).fg(Color::Black).bold()
    } else {
        Style::default().fg(Color::Yellow)
    };
    let send_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let send = Paragraph::new(Line::from(Span::styled(" Send ", send_style)).centered())
        .block(send_block);

    frame.render_widget(send, send_area);

    if input_focused {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((
            input_area.x + cursor_x + 1,
            input_area.y + 1,
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let send_hint = match app.focus {
        Focus::Input => " Enter ",
        Focus::Send => " Enter/Space ",
    };

    let hints = vec![
        Span::styled(send_hint, key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
