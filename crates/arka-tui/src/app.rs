use anyhow::Result;
use arka_core::{
    Body, ChatClient, ChatController, ChatMessage, ChatRole, Config, InputField, MessageId,
    Resolution, TranscriptView, Trigger,
};
use ratatui::layout::Rect;
use ratatui::text::Line;
use tokio::sync::mpsc;
use tracing::warn;

use crate::markdown::markdown_to_lines;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Send,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character cursor
#[derive(Debug, Default)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

impl InputField for InputBuffer {
    fn value(&self) -> &str {
        &self.text
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// One rendered transcript entry
#[derive(Debug, Clone)]
pub struct PaneEntry {
    pub role: ChatRole,
    pub lines: Vec<Line<'static>>,
    pub pending: bool,
}

impl PaneEntry {
    fn from_message(message: &ChatMessage) -> Self {
        let lines = match &message.body {
            Body::Markup { markdown, .. } => markdown_to_lines(markdown),
            Body::Plain(text) => text.lines().map(|l| Line::from(l.to_string())).collect(),
        };

        Self {
            role: message.role,
            lines,
            pending: message.is_pending(),
        }
    }
}

/// Transcript container: caches rendered entries and owns the scroll offset
#[derive(Debug, Default)]
pub struct ChatPane {
    entries: Vec<PaneEntry>,
    pub scroll: u16,
    pub max_scroll: u16,
    /// Inner size, updated during render
    pub height: u16,
    pub width: u16,
    follow_end: bool,
}

impl ChatPane {
    pub fn entries(&self) -> &[PaneEntry] {
        &self.entries
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = (self.scroll as i32 + delta).clamp(0, self.max_scroll as i32);
        self.scroll = next as u16;
    }

    pub fn half_page(&self) -> i32 {
        (self.height / 2).max(1) as i32
    }

    /// Apply a freshly measured content height. A pending scroll-to-end jumps
    /// to the bottom once; otherwise the offset is just clamped.
    pub fn settle(&mut self, total_rows: u16) {
        self.max_scroll = total_rows.saturating_sub(self.height);
        if self.follow_end {
            self.scroll = self.max_scroll;
            self.follow_end = false;
        } else {
            self.scroll = self.scroll.min(self.max_scroll);
        }
    }
}

impl TranscriptView for ChatPane {
    fn append(&mut self, id: MessageId, message: &ChatMessage) {
        // Entries mirror transcript positions, so only the next slot is valid
        if id.0 != self.entries.len() {
            warn!(%id, shown = self.entries.len(), "ignoring out-of-order append");
            return;
        }
        self.entries.push(PaneEntry::from_message(message));
    }

    fn update(&mut self, id: MessageId, message: &ChatMessage) {
        match self.entries.get_mut(id.0) {
            Some(entry) => *entry = PaneEntry::from_message(message),
            None => warn!(%id, "update for a message that was never shown"),
        }
    }

    fn scroll_to_end(&mut self) {
        self.follow_end = true;
    }
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub input: InputBuffer,
    pub chat: ChatPane,
    pub controller: ChatController,
    pub endpoint: String,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_area: Option<Rect>,

    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, events: mpsc::UnboundedSender<AppEvent>) -> Result<Self> {
        let client = ChatClient::from_config(config)?;

        Ok(Self {
            should_quit: false,
            focus: Focus::Input,
            input: InputBuffer::default(),
            chat: ChatPane::default(),
            controller: ChatController::new(client, &config.error_message),
            endpoint: config.endpoint.clone(),
            animation_frame: 0,
            chat_area: None,
            send_area: None,
            events,
        })
    }

    /// Submit the input and run the exchange in the background. The result
    /// comes back through the event queue as `AppEvent::Reply`.
    pub fn trigger(&mut self, trigger: Trigger) {
        let Some(pending) = self
            .controller
            .on_trigger(trigger, &mut self.input, &mut self.chat)
        else {
            return;
        };

        let exchanger = self.controller.exchanger();
        let events = self.events.clone();
        tokio::spawn(async move {
            let resolution = exchanger.exchange(pending).await;
            // Receiver is gone only when the app is shutting down
            let _ = events.send(AppEvent::Reply(resolution));
        });
    }

    pub fn apply_reply(&mut self, resolution: Resolution) {
        if let Err(err) = self.controller.resolve(resolution, &mut self.chat) {
            warn!(error = %err, "dropping reply");
        }
    }

    pub fn pending_count(&self) -> usize {
        self.controller.transcript().pending_count()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending_count() > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Send,
            Focus::Send => Focus::Input,
        };
    }
}
