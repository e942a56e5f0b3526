use super::app_logic::TuiApp;
use super::app_state::AppMode;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

fn is_interrupt(key_event: &KeyEvent) -> bool {
    key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL)
}

pub(super) fn handle_events(app: &mut TuiApp) -> Result<()> {
    if !event::poll(Duration::from_millis(50))? {
        return Ok(());
    }
    match event::read()? {
        // Raw mode swallows SIGINT, so Ctrl-C cancels the dialog from any mode.
        Event::Key(key_event) if is_interrupt(&key_event) => app.quit = true,
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => match app.mode {
            AppMode::Normal => app.handle_normal_mode_input(key_event),
            AppMode::EditingMessage => app.handle_message_mode_input(key_event),
        },
        Event::Resize(_, _) => app.ensure_selection_is_visible_in_viewport(),
        _ => {}
    }
    Ok(())
}
