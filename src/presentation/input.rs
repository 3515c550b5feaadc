use std::path::Path;

use crate::application::{App, AppMode};
use crate::infrastructure::OptionsRepository;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

/// Byte offset of the `chars`-th character, clamped to the end.
fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(text.len())
}

/// Applies a line-editing key to `buffer`. Returns false for keys it ignores.
fn edit_buffer(buffer: &mut String, cursor: &mut usize, key: KeyCode) -> bool {
    let len = buffer.chars().count();
    match key {
        KeyCode::Backspace => {
            if *cursor > 0 {
                buffer.remove(byte_index(buffer, *cursor - 1));
                *cursor -= 1;
            }
        }
        KeyCode::Delete => {
            if *cursor < len {
                buffer.remove(byte_index(buffer, *cursor));
            }
        }
        KeyCode::Left => {
            if *cursor > 0 {
                *cursor -= 1;
            }
        }
        KeyCode::Right => {
            if *cursor < len {
                *cursor += 1;
            }
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = len;
        }
        KeyCode::Char(c) => {
            buffer.insert(byte_index(buffer, *cursor), c);
            *cursor += 1;
        }
        _ => return false,
    }
    true
}

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveOptions => Self::handle_filename_input_mode(app, key, "save"),
            AppMode::LoadOptions => Self::handle_filename_input_mode(app, key, "load"),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => app.start_save_options(),
                KeyCode::Char('o') => app.start_load_options(),
                _ => {}
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Left | KeyCode::Char('h') => app.adjust(-1),
            KeyCode::Right | KeyCode::Char('l') => app.adjust(1),
            KeyCode::Enter | KeyCode::Char(' ') => app.activate(),
            KeyCode::Char('e') | KeyCode::F(2) => app.start_editing(),
            KeyCode::Char('r') => app.reset_focused_color(),
            KeyCode::Char('c') => app.copy_dots_color(),
            KeyCode::Char('x') => app.reset_image(),
            KeyCode::Char('d') => app.download(),
            KeyCode::Char('f') => app.cycle_export_format(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::PageUp => app.scroll_preview(-5),
            KeyCode::PageDown => app.scroll_preview(5),
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            _ => {
                edit_buffer(&mut app.input, &mut app.cursor_position, key);
            }
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
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

    fn handle_filename_input_mode(app: &mut App, key: KeyCode, mode: &str) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_options_filename();
                match mode {
                    "save" => {
                        let options = app.current_options();
                        let result = OptionsRepository::save_options(&options, Path::new(&filename))
                            .map(|_| filename)
                            .map_err(|e| e.to_string());
                        app.set_save_result(result);
                    }
                    "load" => {
                        let result = OptionsRepository::load_options(Path::new(&filename))
                            .map(|options| (options, filename))
                            .map_err(|e| e.to_string());
                        app.set_load_result(result);
                    }
                    _ => {}
                }
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            _ => {
                edit_buffer(&mut app.filename_input, &mut app.cursor_position, key);
            }
        }
    }
}
