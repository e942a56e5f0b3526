use super::app_state::{AppMode, DialogKind};
use crate::consolidation_tree::{NodeId, PathConsolidationTree};
use crate::git::StatusSource;
use crate::tree_builder::{TreeRow, build_tree_rows};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct TuiApp<'a> {
    pub(super) tree: PathConsolidationTree,
    pub(super) kind: DialogKind,
    pub(super) source: Option<&'a dyn StatusSource>,
    pub(super) current: Option<NodeId>,
    pub(super) scroll_offset: usize,
    pub(super) quit: bool,
    pub(super) confirmed: bool,
    pub(super) mode: AppMode,
    pub(super) message: String,
    pub(super) message_cursor_pos: usize, // in chars
    pub(super) list_viewport_height: usize,
    pub(super) status_line: Option<String>,
}

impl<'a> TuiApp<'a> {
    pub fn new(
        tree: PathConsolidationTree,
        kind: DialogKind,
        message: String,
        source: Option<&'a dyn StatusSource>,
    ) -> Self {
        let message_cursor_pos = message.chars().count();
        let mut app = TuiApp {
            tree,
            kind,
            source,
            current: None,
            scroll_offset: 0,
            quit: false,
            confirmed: false,
            mode: AppMode::Normal,
            message,
            message_cursor_pos,
            list_viewport_height: 0, // Will be updated by ui_renderer
            status_line: None,
        };
        app.current = app.visible_rows().first().map(|row| row.id);
        app
    }

    pub(super) fn into_parts(self) -> (PathConsolidationTree, String) {
        (self.tree, self.message)
    }

    pub(super) fn visible_rows(&self) -> Vec<TreeRow> {
        build_tree_rows(&self.tree, true)
    }

    fn current_position(&self, rows: &[TreeRow]) -> Option<usize> {
        let current = self.current?;
        rows.iter().position(|row| row.id == current)
    }

    pub(super) fn select_next_visible_item(&mut self) {
        self.move_selection_in_visible_list(1);
    }

    pub(super) fn select_previous_visible_item(&mut self) {
        self.move_selection_in_visible_list(-1);
    }

    pub(super) fn move_selection_in_visible_list(&mut self, delta: i32) {
        let rows = self.visible_rows();
        if rows.is_empty() {
            self.current = None;
            return;
        }
        let new_pos = match self.current_position(&rows) {
            Some(pos) => (pos as i32 + delta).rem_euclid(rows.len() as i32) as usize,
            None if delta > 0 => 0,
            None => rows.len() - 1,
        };
        self.current = Some(rows[new_pos].id);
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn toggle_current_item_selection(&mut self) {
        if let Some(id) = self.current {
            self.tree.toggle(id);
        }
    }

    pub(super) fn select_all_items(&mut self) {
        self.tree.select_all();
    }

    pub(super) fn deselect_all_items(&mut self) {
        self.tree.deselect_all();
    }

    pub(super) fn expand_all_directories(&mut self) {
        self.tree.set_all_expanded(true);
        self.ensure_selection_is_visible();
    }

    pub(super) fn collapse_all_directories(&mut self) {
        self.tree.set_all_expanded(false);
        self.ensure_selection_is_visible();
    }

    pub(super) fn toggle_expansion_and_adjust_selection(&mut self) {
        let Some(id) = self.current else {
            return;
        };
        let is_dir = self.tree.node(id).is_some_and(|node| !node.is_leaf());
        if is_dir {
            let expanded = self.tree.is_expanded(id);
            self.tree.set_expanded(id, !expanded);
            self.ensure_selection_is_visible();
        }
    }

    /// Moves the cursor to the nearest visible ancestor if a collapse hid it.
    pub(super) fn ensure_selection_is_visible(&mut self) {
        let rows = self.visible_rows();
        let mut candidate = self.current;
        while let Some(id) = candidate {
            if rows.iter().any(|row| row.id == id) {
                break;
            }
            candidate = self.tree.parent(id).filter(|&p| p != self.tree.root());
        }
        self.current = candidate.or_else(|| rows.first().map(|row| row.id));
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn ensure_selection_is_visible_in_viewport(&mut self) {
        if self.list_viewport_height == 0 {
            return;
        }
        let rows = self.visible_rows();
        if rows.is_empty() {
            self.scroll_offset = 0;
            return;
        }

        let list_height = self.list_viewport_height;
        if let Some(pos) = self.current_position(&rows) {
            if pos < self.scroll_offset {
                self.scroll_offset = pos;
            } else if pos >= self.scroll_offset + list_height {
                self.scroll_offset = pos.saturating_sub(list_height - 1);
            }
        }

        if rows.len() <= list_height {
            self.scroll_offset = 0;
        } else {
            self.scroll_offset = self.scroll_offset.min(rows.len() - list_height);
        }
    }

    /// Rebuilds the tree from a fresh snapshot. Everything is selected again.
    pub(super) fn refresh_from_source(&mut self) {
        let Some(source) = self.source else {
            self.status_line = Some("Nothing to refresh from".to_string());
            return;
        };
        match source.snapshot() {
            Ok(changes) => {
                self.tree.refresh(&changes);
                self.current = self.visible_rows().first().map(|row| row.id);
                self.scroll_offset = 0;
                self.status_line = Some(if self.tree.is_empty() {
                    "No changes have been registered".to_string()
                } else {
                    format!(
                        "Refreshed: {} changed files",
                        self.tree.selection_index().len()
                    )
                });
            }
            Err(e) => {
                tracing::warn!("refresh failed: {:#}", e);
                self.status_line = Some(format!("Refresh failed: {:#}", e));
            }
        }
    }

    pub(super) fn try_confirm(&mut self) {
        if !self.tree.has_selected_files() {
            self.status_line = Some("Select at least one file first".to_string());
        } else if self.kind.needs_message() && self.message.trim().is_empty() {
            self.status_line = Some("Enter a commit message first (m)".to_string());
        } else {
            self.confirmed = true;
            self.quit = true;
        }
    }

    fn message_byte_offset(&self) -> usize {
        self.message
            .char_indices()
            .nth(self.message_cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.message.len())
    }

    // --- Event handling sub-methods ---
    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        self.status_line = None;
        match key_event.code {
            KeyCode::Char('m') if self.kind.needs_message() => {
                self.mode = AppMode::EditingMessage;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('y') => self.try_confirm(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_visible_item(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_visible_item(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current_item_selection(),
            KeyCode::Char('o') | KeyCode::Tab => self.toggle_expansion_and_adjust_selection(),
            KeyCode::Char('*') => self.expand_all_directories(),
            KeyCode::Char('-') => self.collapse_all_directories(),
            KeyCode::Char('r') => self.refresh_from_source(),
            KeyCode::Char('a') => {
                if key_event.modifiers.is_empty() || key_event.modifiers == KeyModifiers::CONTROL {
                    self.select_all_items();
                }
            }
            KeyCode::Char('d') => {
                if key_event.modifiers.is_empty() {
                    self.deselect_all_items();
                }
            }
            _ => {}
        }
    }

    pub(super) fn handle_message_mode_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Char(c) => {
                let at = self.message_byte_offset();
                self.message.insert(at, c);
                self.message_cursor_pos += 1;
            }
            KeyCode::Backspace => {
                if self.message_cursor_pos > 0 {
                    self.message_cursor_pos -= 1;
                    let at = self.message_byte_offset();
                    self.message.remove(at);
                }
            }
            KeyCode::Left => {
                self.message_cursor_pos = self.message_cursor_pos.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.message_cursor_pos < self.message.chars().count() {
                    self.message_cursor_pos += 1;
                }
            }
            _ => {}
        }
    }
}
