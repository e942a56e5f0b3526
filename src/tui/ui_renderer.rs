use super::app_logic::TuiApp;
use super::app_state::{AppMode, DialogKind};
use crate::change_set::FileStatus;
use crate::tree_builder::checkbox;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

fn status_color(status: FileStatus) -> Color {
    match status {
        FileStatus::Unchanged => Color::Reset,
        FileStatus::Added => Color::Green,
        FileStatus::Modified => Color::Blue,
        FileStatus::Removed => Color::Gray,
    }
}

fn draw_help_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let confirm_line = if app.kind.needs_message() {
        "m: Edit Message | y: Commit | q/Esc: Cancel | r: Refresh"
    } else {
        "y: Confirm | q/Esc: Cancel | r: Refresh"
    };
    let help_text_lines_content = vec![
        Line::from("Arrows/jk: Nav | Space/Enter: Sel | Tab/o: Fold | *: Expand All | -: Collapse All"),
        Line::from(format!("a: Sel All | d: Desel All | {}", confirm_line)),
    ];
    let help_paragraph = Paragraph::new(help_text_lines_content)
        .block(Block::default().borders(Borders::ALL).title(app.kind.title()));
    f.render_widget(help_paragraph, area);
}

fn draw_message_block(f: &mut Frame, app: &TuiApp, area: Rect) {
    let editing = app.mode == AppMode::EditingMessage;
    let title = if editing {
        "Commit message (Enter/Esc to finish)"
    } else {
        "Commit message (m to edit)"
    };
    let text = if app.message.is_empty() && !editing {
        Line::from(Span::styled("<empty>", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(app.message.as_str())
    };
    let message_paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(message_paragraph, area);
    if editing {
        f.set_cursor_position((area.x + 1 + app.message_cursor_pos as u16, area.y + 1));
    }
}

fn draw_main_list_block(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    app.list_viewport_height = area.height.saturating_sub(2) as usize;
    app.ensure_selection_is_visible_in_viewport(); // Call this to adjust scroll based on current state

    let rows = app.visible_rows();
    let window_end = (app.scroll_offset + app.list_viewport_height).min(rows.len());
    let rows_to_render = rows.get(app.scroll_offset..window_end).unwrap_or(&[]);

    let list_items: Vec<ListItem> = rows_to_render
        .iter()
        .filter_map(|row| {
            let node = app.tree.node(row.id)?;
            let expansion_prefix = if node.is_leaf() {
                "    "
            } else if node.is_expanded() {
                "[-] "
            } else {
                "[+] "
            };
            let name = if node.is_leaf() {
                node.display()
            } else {
                format!("{}/", node.display())
            };
            let line = Line::from(vec![
                Span::raw(format!(
                    "{}{} {} ",
                    expansion_prefix,
                    checkbox(app.tree.state(row.id)),
                    node.status().code()
                )),
                Span::raw(row.prefix.clone()),
                Span::styled(name, Style::default().fg(status_color(node.status()))),
            ]);
            Some(ListItem::new(line))
        })
        .collect();

    let selected_count = app.tree.selection_index().selected_count();
    let list_title = format!(
        "Changed files ({} of {} selected)",
        selected_count,
        app.tree.selection_index().len()
    );

    let list_widget = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("❯ ");

    let mut list_state_for_view = ratatui::widgets::ListState::default();
    if let Some(pos) = app
        .current
        .and_then(|current| rows.iter().position(|row| row.id == current))
    {
        if pos >= app.scroll_offset && pos < window_end {
            list_state_for_view.select(Some(pos - app.scroll_offset));
        }
    }
    f.render_stateful_widget(list_widget, area, &mut list_state_for_view);
}

fn draw_status_line(f: &mut Frame, app: &TuiApp, area: Rect) {
    let text = match &app.status_line {
        Some(status) => Span::styled(status.as_str(), Style::default().fg(Color::Yellow)),
        None if app.tree.is_empty() => Span::raw("No changes have been registered"),
        None => Span::raw(""),
    };
    f.render_widget(Paragraph::new(Line::from(text)), area);
}

pub(super) fn ui_frame(frame: &mut Frame, app: &mut TuiApp) {
    let help_lines = 2;
    let message_height = if app.kind == DialogKind::Commit { 3 } else { 0 };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Length(message_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_help_block(frame, app, main_chunks[0]);
    if message_height > 0 {
        draw_message_block(frame, app, main_chunks[1]);
    }
    draw_main_list_block(frame, app, main_chunks[2]);
    draw_status_line(frame, app, main_chunks[3]);
}
