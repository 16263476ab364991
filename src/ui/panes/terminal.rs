//! Terminal output pane rendering

use super::{pane_block, visible_items};
use crate::interpreter::terminal::Terminal;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the terminal output pane
pub fn render_terminal_pane(
    frame: &mut Frame,
    area: Rect,
    terminal: &Terminal,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Output ", is_focused);
    let lines = terminal.lines();

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = lines
        .iter()
        .map(|line| ListItem::new(line.as_str()).style(Style::default().fg(DEFAULT_THEME.fg)))
        .collect();

    let list = List::new(visible_items(all_items, area, scroll_offset)).block(block);
    frame.render_widget(list, area);
}
