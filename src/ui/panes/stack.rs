//! Value stack pane rendering
//!
//! Top of stack is drawn first. Numbers show their decimal value followed by
//! the raw limb view in the radix selected with `r`.

use super::{pane_block, placeholder, visible_items};
use crate::bigint::Radix;
use crate::memory::value::Element;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Render the value stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &[Element],
    radix: Radix,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Value Stack ({}) [{}] ", stack.len(), radix.label());
    let block = pane_block(&title, is_focused);

    let mut all_items = Vec::new();
    if stack.is_empty() {
        all_items.push(placeholder("(empty)"));
    }

    for (depth, element) in stack.iter().rev().enumerate() {
        let marker = if depth == 0 { "top" } else { "   " };
        let index_style = Style::default().fg(DEFAULT_THEME.comment);

        let value_span = match element {
            Element::Number(n) => Span::styled(
                n.to_string(),
                Style::default()
                    .fg(DEFAULT_THEME.number)
                    .add_modifier(Modifier::BOLD),
            ),
            Element::String(s) => {
                Span::styled(format!(":{}", s), Style::default().fg(DEFAULT_THEME.string))
            }
            other => Span::styled(other.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{} {:>3} ", marker, stack.len() - depth - 1), index_style),
            value_span,
        ])];

        if let Element::Number(n) = element {
            lines.push(Line::from(Span::styled(
                format!("        {}", n.raw_view(radix)),
                Style::default().fg(DEFAULT_THEME.comment),
            )));
        }

        all_items.push(ListItem::new(lines));
    }

    let list = List::new(visible_items(all_items, area, scroll_offset)).block(block);
    frame.render_widget(list, area);
}
