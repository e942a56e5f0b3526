// Interactive selection screen over a PathConsolidationTree
mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use app_state::{DialogKind, DialogOutcome};

pub use self::run_tui::run_selection_dialog;

mod run_tui {
    use super::app_logic::TuiApp;
    use super::app_state::{DialogKind, DialogOutcome};
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::consolidation_tree::PathConsolidationTree;
    use crate::git::StatusSource;
    use anyhow::Result;
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};

    /// Shows the tree until the user confirms (`Some`) or cancels (`None`).
    ///
    /// `source` backs the refresh key; the tree is rebuilt from it wholesale.
    pub fn run_selection_dialog(
        tree: PathConsolidationTree,
        kind: DialogKind,
        initial_message: String,
        source: Option<&dyn StatusSource>,
    ) -> Result<Option<DialogOutcome>> {
        let mut app = TuiApp::new(tree, kind, initial_message, source);

        let mut terminal = init_terminal()?;
        let loop_result = run_loop(&mut terminal, &mut app);
        // Restore the terminal even when drawing failed.
        restore_terminal(terminal)?;
        loop_result?;

        if app.confirmed {
            let (tree, message) = app.into_parts();
            tracing::debug!(
                "{:?} dialog confirmed with {} files",
                kind,
                tree.selection_index().selected_count()
            );
            Ok(Some(DialogOutcome { tree, message }))
        } else {
            tracing::debug!("{:?} dialog cancelled", kind);
            Ok(None)
        }
    }

    fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut TuiApp) -> Result<()> {
        app.ensure_selection_is_visible();
        while !app.quit {
            terminal.draw(|frame| ui_frame(frame, app))?;
            handle_events(app)?;
        }
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor().map_err(Into::into)
    }
}
