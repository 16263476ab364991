//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`stack`]: value stack, with the raw limb view of every number
//! - [`definitions`]: functions, loops, globals and open scope frames
//! - [`heap`]: accounting statistics and the live allocation table
//! - [`terminal`]: output written by printing operators
//! - [`status`]: status bar with keybindings
//!
//! Every pane is a stateless render function; scroll offsets live in
//! [`crate::ui::App`] and are clamped here against the visible height.

pub mod definitions;
pub mod heap;
pub mod stack;
pub mod status;
pub mod terminal;

pub use definitions::render_definitions_pane;
pub use heap::render_heap_pane;
pub use stack::render_stack_pane;
pub use status::render_status_bar;
pub use terminal::render_terminal_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, ListItem},
};

/// Bordered pane block, highlighted when focused
fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp the scroll offset and keep only the items that fit in `area`
fn visible_items<'a>(
    items: Vec<ListItem<'a>>,
    area: Rect,
    scroll_offset: &mut usize,
) -> Vec<ListItem<'a>> {
    let total_items = items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect()
}

fn placeholder(text: &str) -> ListItem<'_> {
    ListItem::new(text).style(Style::default().fg(DEFAULT_THEME.comment))
}
