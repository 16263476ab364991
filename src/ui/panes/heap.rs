//! Heap pane rendering with accounting statistics and live allocations

use super::{pane_block, placeholder, visible_items};
use crate::bigint::Limb;
use crate::memory::{format_bytes, heap::Heap};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

/// Render the heap pane
pub fn render_heap_pane(
    frame: &mut Frame,
    area: Rect,
    heap: &Heap,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let stats = heap.stats();
    let block = pane_block(" Heap ", is_focused);

    let label = Style::default().fg(DEFAULT_THEME.comment);
    let value = Style::default()
        .fg(DEFAULT_THEME.number)
        .add_modifier(Modifier::BOLD);

    let mut all_items = vec![
        ListItem::new(Line::from(vec![
            Span::styled("live  ", label),
            Span::styled(format_bytes(stats.current_bytes), value),
            Span::styled(format!(" in {} blocks", stats.live_entries), label),
        ])),
        ListItem::new(Line::from(vec![
            Span::styled("peak  ", label),
            Span::styled(format_bytes(stats.peak_bytes), value),
            Span::styled(format!(" in {} blocks", stats.peak_entries), label),
        ])),
        ListItem::new(Span::styled(
            format!(
                "alloc {}  realloc {}  free {}",
                stats.allocations, stats.reallocations, stats.releases
            ),
            label,
        )),
    ];

    let allocations = heap.allocations();
    if allocations.is_empty() {
        all_items.push(placeholder("(no allocations)"));
    }

    for (address, bytes) in allocations {
        let limbs = bytes / std::mem::size_of::<Limb>();
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("0x{:012x}", address), label),
            Span::raw(" | "),
            Span::styled(
                format!("{:>4} limbs", limbs),
                Style::default().fg(DEFAULT_THEME.success),
            ),
            Span::styled(format!(" ({})", format_bytes(bytes)), label),
        ])));
    }

    let list = List::new(visible_items(all_items, area, scroll_offset)).block(block);
    frame.render_widget(list, area);
}
