use arka_core::Trigger;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(resolution) => app.apply_reply(resolution),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work with either focus
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            return;
        }
        KeyCode::PageUp => {
            app.chat.scroll_by(-app.chat.half_page());
            return;
        }
        KeyCode::PageDown => {
            app.chat.scroll_by(app.chat.half_page());
            return;
        }
        KeyCode::Up => {
            app.chat.scroll_by(-1);
            return;
        }
        KeyCode::Down => {
            app.chat.scroll_by(1);
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Input => handle_input_key(app, key),
        Focus::Send => handle_send_key(app, key),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.trigger(Trigger::Enter),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.left(),
        KeyCode::Right => app.input.right(),
        KeyCode::Home => app.input.home(),
        KeyCode::End => app.input.end(),
        KeyCode::Char(c) => app.input.insert(c),
        _ => {}
    }
}

fn handle_send_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.trigger(Trigger::Click),
        // Typing goes back to the input box
        KeyCode::Char(c) => {
            app.focus = Focus::Input;
            app.input.insert(c);
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_send = app.send_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if in_send => app.trigger(Trigger::Click),
        MouseEventKind::ScrollDown if in_chat => app.chat.scroll_by(3),
        MouseEventKind::ScrollUp if in_chat => app.chat.scroll_by(-3),
        _ => {}
    }
}
