use arka_core::markdown_options;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Convert a Markdown reply into styled terminal lines
pub fn markdown_to_lines(input: &str) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::default();
    for event in Parser::new_ext(input, markdown_options()) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    // None for bullet lists, Some(next number) for ordered lists
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    cell_index: usize,
}

impl LineBuilder {
    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            return;
        }
        self.lines.push(Line::default());
    }

    fn text(&mut self, text: String) {
        let style = self.style();
        self.spans.push(Span::styled(text, style));
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => {
                let style = Style::default().fg(Color::Green);
                for line in text.lines() {
                    self.lines.push(Line::from(Span::styled(format!("  {}", line), style)));
                }
            }
            Event::Text(text) => self.text(text.into_string()),
            Event::Code(code) => {
                let style = self.style().fg(Color::Yellow);
                self.spans.push(Span::styled(code.into_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(html.into_string()),
            Event::SoftBreak => self.text(" ".to_string()),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(20),
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                self.text(if checked { "[x] " } else { "[ ] " }.to_string());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                self.styles
                    .push(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
            }
            Tag::Strong => self.styles.push(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.styles.push(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => self
                .styles
                .push(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => self
                .styles
                .push(Style::default().add_modifier(Modifier::UNDERLINED)),
            Tag::BlockQuote { .. } => {
                self.flush();
                self.styles
                    .push(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock { .. } => {
                self.flush();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::raw(format!("{}{}", "  ".repeat(depth), marker)));
            }
            Tag::TableRow | Tag::TableHead => self.cell_index = 0,
            Tag::TableCell => {
                if self.cell_index > 0 {
                    self.spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
                }
                self.cell_index += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                // Paragraphs inside list items stay tight
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading { .. } => {
                self.styles.pop();
                self.flush();
                self.blank();
            }
            TagEnd::Strong
            | TagEnd::Emphasis
            | TagEnd::Strikethrough
            | TagEnd::Link => {
                self.styles.pop();
            }
            TagEnd::BlockQuote { .. } => {
                self.styles.pop();
                self.flush();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::Item => self.flush(),
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.blank(),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}
