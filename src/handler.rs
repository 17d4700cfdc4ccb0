use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use genui_core::Tab;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.on_tick().await,
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // Popups and the full-screen preview take every key while open
    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return Ok(());
    }
    if app.show_provider_picker {
        handle_provider_picker(app, key);
        return Ok(());
    }
    if app.show_model_picker {
        handle_model_picker(app, key);
        return Ok(());
    }
    if app.view.view().full_screen_open {
        handle_full_screen(app, key);
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key).await,
        InputMode::Editing => {
            handle_editing_mode(app, key);
            Ok(())
        }
    }
}

async fn handle_normal_mode(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Char('g') => app.generate(),
        KeyCode::Char('x') => app.reset_session(),
        KeyCode::Char('P') => app.open_provider_picker(),
        KeyCode::Char('M') => app.open_model_picker().await,
        _ => match app.focus {
            FocusPane::Framework => handle_framework_keys(app, key),
            FocusPane::Description => handle_description_keys(app, key),
            FocusPane::Output => handle_output_keys(app, key),
        },
    }
    Ok(())
}

fn handle_framework_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Right => {
            app.next_framework();
            app.save_framework();
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => {
            app.prev_framework();
            app.save_framework();
        }
        KeyCode::Enter => app.focus = FocusPane::Description,
        _ => {}
    }
}

fn handle_description_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.description_cursor = app.description.chars().count();
        }
        _ => {}
    }
}

fn handle_output_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('1') => app.set_tab(Tab::Editor),
        KeyCode::Char('2') => app.set_tab(Tab::Preview),
        KeyCode::Char('t') => app.toggle_tab(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('y') => app.copy_code(),
        KeyCode::Char('e') => app.export_code(),
        KeyCode::Char('f') => app.open_full_screen(),
        KeyCode::Char('r') => app.refresh_preview(),
        KeyCode::Char('o') => app.open_in_browser(),
        _ => {}
    }
}

fn handle_full_screen(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f') => app.close_full_screen(),
        KeyCode::Char('j') | KeyCode::Down => app.view.full_screen_surface_mut().scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.view.full_screen_surface_mut().scroll_up(),
        KeyCode::Char('r') => app.refresh_preview(),
        KeyCode::Char('o') => app.open_in_browser(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        // Alt+Enter keeps typing on a new line; plain Enter generates
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            insert_char(app, '\n');
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.generate();
        }
        KeyCode::Backspace => {
            if app.description_cursor > 0 {
                app.description_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.description, app.description_cursor);
                app.description.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.description.chars().count();
            if app.description_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.description, app.description_cursor);
                app.description.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.description_cursor = app.description_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.description.chars().count();
            app.description_cursor = (app.description_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.description_cursor = 0;
        }
        KeyCode::End => {
            app.description_cursor = app.description.chars().count();
        }
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
}

fn insert_char(app: &mut App, c: char) {
    let byte_pos = char_to_byte_index(&app.description, app.description_cursor);
    app.description.insert(byte_pos, c);
    app.description_cursor += 1;
}

fn handle_provider_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_provider_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.provider_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.provider_picker_nav_up(),
        KeyCode::Enter => app.select_provider(),
        _ => {}
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => app.select_model(),
        _ => {}
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_api_key_input = false;
            app.api_key_input.clear();
            app.api_key_input_cursor = 0;
            app.api_key_target_provider = None;
        }
        KeyCode::Enter => app.submit_api_key(),
        KeyCode::Backspace => {
            if app.api_key_input_cursor > 0 {
                app.api_key_input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
                app.api_key_input.remove(byte_pos);
            }
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
            app.api_key_input.insert(byte_pos, c);
            app.api_key_input_cursor += 1;
        }
        _ => {}
    }
}
