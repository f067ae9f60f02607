use crate::application::{App, AppMode};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Choosing => Self::handle_choosing_mode(app, key),
            AppMode::Modal => Self::handle_modal_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('n') => {
                    app.submit();
                    return;
                }
                KeyCode::Char('b') => {
                    app.back();
                    return;
                }
                _ => {}
            }
        }

        // Submission progress and failures stay visible until the next key
        app.status_message = None;

        match key {
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => app.focus_next(),
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => app.focus_previous(),
            KeyCode::Left | KeyCode::Char('h') => app.adjust_range(-1),
            KeyCode::Right | KeyCode::Char('l') => app.adjust_range(1),
            KeyCode::Enter | KeyCode::F(2) => app.activate(),
            KeyCode::PageDown => app.submit(),
            KeyCode::PageUp => app.back(),
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Tab => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Backspace => app.delete_backward(),
            KeyCode::Delete => app.delete_forward(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_choosing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.choice_up(),
            KeyCode::Down | KeyCode::Char('j') => app.choice_down(),
            KeyCode::Enter => app.confirm_choice(),
            KeyCode::Esc => app.cancel_choosing(),
            _ => {}
        }
    }

    fn handle_modal_mode(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
            app.close_modal();
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}
