use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data::field_grid::{Field, FieldGrid};
use crate::data::saved_view::SavedViewStore;
use crate::history::FieldOrderHistory;
use crate::logging::LogRingBuffer;
use crate::reorder::session::{EventDisposition, FieldReorderEngine, PointerEvent};
use crate::reorder::traits::{GridViewport, ReorderListener, ScrollDirection};
use crate::replay::MoveRecorder;
use crate::ui::header_renderer::{render_header, HeaderRenderContext};
use crate::ui::selection_handler::{handle_press, select_field, ClickMode};
use crate::ui::terminal_visuals::TerminalVisuals;

/// Longest the loop blocks on input when no autoscroll tick is pending
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct ReorderDemo {
    grid: FieldGrid,
    engine: FieldReorderEngine,
    history: Rc<RefCell<FieldOrderHistory>>,
    visuals: Rc<RefCell<TerminalVisuals>>,
    recorder: Rc<RefCell<MoveRecorder>>,
    log_buffer: Option<LogRingBuffer>,
    config: Config,
    header_area: Rect,
    /// Field under the press that armed the running drag
    pressed_field: Option<usize>,
    status: String,
}

impl ReorderDemo {
    pub fn new(grid: FieldGrid, config: Config, saved_view: Option<SavedViewStore>) -> Self {
        let mut grid = grid;
        let visuals = TerminalVisuals::shared();
        let history = Rc::new(RefCell::new(FieldOrderHistory::with_max_depth(
            config.drag.undo_depth,
        )));
        let recorder = Rc::new(RefCell::new(MoveRecorder::default()));

        let mut engine = FieldReorderEngine::new(config.terminal_engine_settings(), visuals.clone())
            .with_history(history.clone());
        engine.subscribe(recorder.clone());

        if let Some(store) = saved_view {
            grid.apply_order(&store.view().field_order);
            info!("Applied saved view '{}'", store.view().name);

            let store = Rc::new(RefCell::new(store));
            engine.subscribe(store.clone());

            // Undo and redo move fields too; keep the saved view in step
            history.borrow_mut().set_on_change(move |action, applied| {
                debug!(target: "history", "Persisting {:?} of {:?}", action, applied.field_names);
                store.borrow_mut().persist_field_order(applied);
            });
        }

        Self {
            grid,
            engine,
            history,
            visuals,
            recorder,
            log_buffer: crate::logging::get_log_buffer(),
            config,
            header_area: Rect::default(),
            pressed_field: None,
            status: "Drag a header to reorder. Ctrl/Shift-click to select several.".to_string(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!("Failed to enable raw mode: {}", e));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|f| self.ui(f))?;

        loop {
            // Wake up for the next autoscroll tick, or idle until input
            let timeout = self
                .engine
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_POLL)
                .min(IDLE_POLL);

            let mut redraw = false;
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key) {
                            break;
                        }
                        redraw = true;
                    }
                    Event::Mouse(mouse) => {
                        redraw = self.handle_mouse(mouse);
                    }
                    Event::Resize(_, _) => redraw = true,
                    _ => {}
                }
            }

            if self.engine.on_timer(&mut self.grid, Instant::now()) {
                redraw = true;
            }
            if self.visuals.borrow_mut().take_redraw() {
                redraw = true;
            }

            if redraw || self.config.display.show_log_panel {
                terminal.draw(|f| self.ui(f))?;
            }
        }

        Ok(())
    }

    /// Returns true when the app should exit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => {
                self.pressed_field = None;
                let disposition = self.dispatch(PointerEvent::Cancel);
                if disposition == EventDisposition::Consumed {
                    self.status = "Drag cancelled".to_string();
                } else {
                    self.grid.set_selection(Vec::new());
                }
            }
            KeyCode::Char('u') if !self.engine.is_dragging() => {
                let undone = self.history.borrow_mut().undo(&mut self.grid);
                self.status = match undone {
                    Some(step) => format!("Undo: {:?} back to {}", step.field_names, step.to),
                    None => "Nothing to undo".to_string(),
                };
            }
            KeyCode::Char('r') if !self.engine.is_dragging() => {
                let redone = self.history.borrow_mut().redo(&mut self.grid);
                self.status = match redone {
                    Some(step) => format!("Redo: {:?} to {}", step.field_names, step.to),
                    None => "Nothing to redo".to_string(),
                };
            }
            KeyCode::Left if !self.engine.is_dragging() => self.grid.scroll_by(ScrollDirection::Left),
            KeyCode::Right if !self.engine.is_dragging() => {
                self.grid.scroll_by(ScrollDirection::Right)
            }
            _ => {}
        }
        false
    }

    /// Returns true when something visible changed
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let x = f64::from(mouse.column.saturating_sub(self.header_area.x));
        let on_header = mouse.row == self.header_area.y
            && mouse.column >= self.header_area.x
            && mouse.column < self.header_area.x + self.header_area.width;

        match mouse.kind {
            MouseEventKind::Down(button) if on_header => {
                let mode = if mouse.modifiers.contains(KeyModifiers::CONTROL) {
                    ClickMode::Toggle
                } else if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                    ClickMode::Extend
                } else {
                    ClickMode::Replace
                };
                self.press_header(x, mode, button != MouseButton::Left)
            }
            MouseEventKind::Drag(MouseButton::Left) => self.drag_header(x),
            MouseEventKind::Up(MouseButton::Left) => self.release_header(),
            _ => false,
        }
    }

    /// Modifier clicks only edit the selection. A plain press arms a drag,
    /// or selects the field when the engine refuses it.
    fn press_header(&mut self, x: f64, mode: ClickMode, secondary: bool) -> bool {
        if mode != ClickMode::Replace {
            return handle_press(&mut self.grid, x, mode) == EventDisposition::Consumed;
        }

        let hit = self.grid.header_hit(x).map(|mut hit| {
            hit.secondary_button = secondary;
            hit
        });
        if self.dispatch(PointerEvent::Down { x, hit }) == EventDisposition::Consumed {
            self.pressed_field = hit.map(|hit| hit.field_index);
            return true;
        }
        handle_press(&mut self.grid, x, mode) == EventDisposition::Consumed
    }

    fn drag_header(&mut self, x: f64) -> bool {
        self.dispatch(PointerEvent::Move { x }) == EventDisposition::Consumed
    }

    /// A drop that moved nothing was a click: select the pressed field
    fn release_header(&mut self) -> bool {
        let moves_before = self.recorder.borrow().moves.len();
        let pressed = self.pressed_field.take();
        if self.dispatch(PointerEvent::Up) == EventDisposition::Ignored {
            return false;
        }

        let moved = self.recorder.borrow().moves.get(moves_before).cloned();
        self.status = match moved {
            Some(moved) => format!(
                "Moved {:?} from {} to {}",
                moved.field_names, moved.from, moved.to
            ),
            None => {
                if let Some(field) = pressed {
                    select_field(&mut self.grid, field, ClickMode::Replace);
                }
                "Dropped in place".to_string()
            }
        };
        true
    }

    fn dispatch(&mut self, event: PointerEvent) -> EventDisposition {
        let selection = self.grid.selected().to_vec();
        self.engine
            .handle_pointer(event, &mut self.grid, &selection, Instant::now())
    }

    fn ui(&mut self, f: &mut Frame) {
        let mut constraints = vec![Constraint::Length(4), Constraint::Length(3)];
        if self.config.display.show_log_panel {
            constraints.push(Constraint::Min(5));
        }
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        let header_block = chunks[0];
        self.header_area = Rect {
            x: header_block.x + 1,
            y: header_block.y + 1,
            width: header_block.width.saturating_sub(2),
            height: 2,
        };
        let width = f64::from(self.header_area.width);
        if self.grid.viewport_width() != width && !self.engine.is_dragging() {
            self.grid.set_viewport_width(width);
        }

        let ghost_char = self.config.display.ghost_char.chars().next().unwrap_or('#');
        let visuals = self.visuals.borrow();
        let ctx = HeaderRenderContext {
            grid: &self.grid,
            visuals: &visuals,
            ghost_char,
            pin_marker: &self.config.display.pin_marker,
            dragging: self.engine.is_dragging(),
        };
        render_header(f, header_block, &ctx);
        drop(visuals);

        self.render_status(f, chunks[1]);
        if self.config.display.show_log_panel {
            self.render_logs(f, chunks[2]);
        }

        let help = Paragraph::new(
            "drag header: move  ctrl/shift-click: select  esc: cancel  u/r: undo/redo  ←/→: scroll  q: quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        f.render_widget(help, chunks[chunks.len() - 1]);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let history = self.history.borrow();
        let text = format!(
            "{}  |  selection {:?}  |  undo {} redo {}",
            self.status,
            self.grid.selected(),
            history.undo_depth(),
            history.redo_depth()
        );
        let status = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(status, area);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = match &self.log_buffer {
            Some(buffer) => buffer
                .get_recent(visible)
                .iter()
                .map(|entry| Line::from(entry.format_for_display()))
                .collect(),
            None => vec![Line::from("Logging not initialized")],
        };
        let logs = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(logs, area);
    }
}

/// Load the grid, attach the saved view for CSV files, and run the demo
pub fn run_reorder_demo(data_file: Option<&str>, config: Config) -> Result<()> {
    let (grid, view_name) = match data_file {
        Some(path) => {
            let grid = FieldGrid::from_csv_path(path, 80.0)?;
            let name = std::path::Path::new(path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("default")
                .to_string();
            (grid, Some(name))
        }
        None => (sample_grid(), None),
    };

    let saved_view = view_name.and_then(|name| {
        match SavedViewStore::open_default(&name, grid.field_names()) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Saved view unavailable for '{}': {}", name, e);
                None
            }
        }
    });

    ReorderDemo::new(grid, config, saved_view).run()
}

/// Built-in grid used when no CSV file is given
pub fn sample_grid() -> FieldGrid {
    let names = [
        "id", "trade_date", "counterparty", "book", "instrument", "side", "quantity", "price",
        "currency", "notional", "trader", "status", "settlement_date", "venue",
    ];
    let mut grid = FieldGrid::new(
        names
            .iter()
            .map(|name| Field::new(*name, (name.len() + 2).max(6) as f64))
            .collect(),
        80.0,
    );
    grid.pin_leading(1);
    grid
}
