//! Definitions pane: functions, loops, globals and open scope frames

use super::{pane_block, placeholder, visible_items};
use crate::interpreter::engine::{CaptureState, FunctionDef, LoopDef};
use crate::memory::stack::{ScopeKind, ScopeStack};
use crate::memory::value::Element;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Data needed to render the definitions pane
pub struct DefinitionsRenderData<'a, S: BuildHasher, T: BuildHasher> {
    pub functions: &'a HashMap<String, FunctionDef, S>,
    pub loops: &'a HashMap<usize, LoopDef, T>,
    pub scopes: &'a ScopeStack,
    pub capture_state: CaptureState,
}

fn body_text(body: &[Element]) -> String {
    body.iter()
        .map(Element::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn section(title: &str) -> ListItem<'_> {
    ListItem::new(Line::from(Span::styled(
        title,
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
    )))
}

/// Render the definitions pane
pub fn render_definitions_pane<S: BuildHasher, T: BuildHasher>(
    frame: &mut Frame,
    area: Rect,
    data: DefinitionsRenderData<S, T>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = match data.capture_state {
        CaptureState::Idle => " Definitions ".to_string(),
        state => format!(" Definitions ({:?}) ", state),
    };
    let block = pane_block(&title, is_focused);
    let mut all_items = Vec::new();

    all_items.push(section("functions"));
    let mut functions: Vec<&FunctionDef> = data.functions.values().collect();
    functions.sort_by(|a, b| a.name.cmp(&b.name));
    if functions.is_empty() {
        all_items.push(placeholder("  (none)"));
    }
    for def in functions {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!("  @{}/{} ", def.name, def.arity),
                Style::default().fg(DEFAULT_THEME.function),
            ),
            Span::styled(body_text(&def.body), Style::default().fg(DEFAULT_THEME.fg)),
        ])));
    }

    all_items.push(section("loops"));
    let mut loops: Vec<(&usize, &LoopDef)> = data.loops.iter().collect();
    loops.sort_by_key(|(index, _)| **index);
    if loops.is_empty() {
        all_items.push(placeholder("  (none)"));
    }
    for (index, def) in loops {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!("  *{} ×{} ", index, def.count),
                Style::default().fg(DEFAULT_THEME.function),
            ),
            Span::styled(body_text(&def.body), Style::default().fg(DEFAULT_THEME.fg)),
        ])));
    }

    all_items.push(section("globals"));
    let mut globals: Vec<_> = data.scopes.globals().iter().collect();
    globals.sort_by(|a, b| a.0.cmp(b.0));
    if globals.is_empty() {
        all_items.push(placeholder("  (none)"));
    }
    for (name, value) in globals {
        all_items.push(ListItem::new(format!("  ${} = {}", name, value)));
    }

    if !data.scopes.frames().is_empty() {
        all_items.push(section("frames"));
        for frame_data in data.scopes.frames().iter().rev() {
            let kind = match frame_data.kind {
                ScopeKind::Function => "fn",
                ScopeKind::Loop => "loop",
            };
            all_items.push(ListItem::new(Span::styled(
                format!("  {} {}", kind, frame_data.name),
                Style::default().fg(DEFAULT_THEME.scope),
            )));
            for (name, value) in frame_data.locals() {
                all_items.push(ListItem::new(format!("    ${} = {}", name, value)));
            }
        }
    }

    let list = List::new(visible_items(all_items, area, scroll_offset)).block(block);
    frame.render_widget(list, area);
}
