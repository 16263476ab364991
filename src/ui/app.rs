//! Inspector application state and event loop

use crate::bigint::Radix;
use crate::interpreter::engine::Interpreter;
use crate::ui::panes::{self, definitions::DefinitionsRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Stack,
    Definitions,
    Heap,
    Terminal,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: stack -> heap -> terminal -> definitions)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Stack => FocusedPane::Heap,
            FocusedPane::Heap => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Definitions,
            FocusedPane::Definitions => FocusedPane::Stack,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Stack => FocusedPane::Definitions,
            FocusedPane::Definitions => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Heap,
            FocusedPane::Heap => FocusedPane::Stack,
        }
    }
}

/// The main application state
pub struct App {
    /// The interpreter being inspected
    pub interpreter: Interpreter,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub stack_scroll: usize,
    pub definitions_scroll: usize,
    pub heap_scroll: usize,
    pub terminal_scroll: usize,

    /// How limbs are shown in the stack pane
    pub radix: Radix,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    pub fn new(interpreter: Interpreter) -> Self {
        App {
            interpreter,
            focused_pane: FocusedPane::Stack,
            stack_scroll: 0,
            definitions_scroll: 0,
            heap_scroll: 0,
            terminal_scroll: usize::MAX,
            radix: Radix::default(),
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key);
                }
            }
        }
        Ok(())
    }

    /// Render the UI
    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Stack (top) | Definitions (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        // Right column: Heap (top) | Output (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        panes::render_stack_pane(
            frame,
            left_rows[0],
            self.interpreter.stack(),
            self.radix,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        panes::render_definitions_pane(
            frame,
            left_rows[1],
            DefinitionsRenderData {
                functions: self.interpreter.functions(),
                loops: self.interpreter.loops(),
                scopes: self.interpreter.scopes(),
                capture_state: self.interpreter.capture_state(),
            },
            self.focused_pane == FocusedPane::Definitions,
            &mut self.definitions_scroll,
        );

        panes::render_heap_pane(
            frame,
            right_rows[0],
            self.interpreter.heap(),
            self.focused_pane == FocusedPane::Heap,
            &mut self.heap_scroll,
        );

        panes::render_terminal_pane(
            frame,
            right_rows[1],
            self.interpreter.terminal(),
            self.focused_pane == FocusedPane::Terminal,
            &mut self.terminal_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.interpreter.stack().len(),
            self.radix,
            self.interpreter.capture_state(),
        );
    }

    /// Handle keyboard events
    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Char('r') => {
                self.radix = self.radix.next();
                self.status_message = format!("Limbs shown as {}", self.radix.label());
            }
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Stack => &mut self.stack_scroll,
            FocusedPane::Definitions => &mut self.definitions_scroll,
            FocusedPane::Heap => &mut self.heap_scroll,
            FocusedPane::Terminal => &mut self.terminal_scroll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::heap::Heap;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn app(source: &str) -> App {
        let mut interpreter = Interpreter::new(Heap::new());
        interpreter.run(source).unwrap();
        App::new(interpreter)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_stack_and_definitions() {
        let mut app = app(":sq 1 defun dup * end 12 @sq 7 :x let");
        let screen = screen(&mut app);
        assert!(screen.contains("144"));
        assert!(screen.contains("@sq/1"));
        assert!(screen.contains("$x = 7"));
    }

    #[test]
    fn keys_cycle_focus_and_radix() {
        let mut app = app("1");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Heap);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_pane, FocusedPane::Stack);

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.radix, Radix::Unsigned);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
