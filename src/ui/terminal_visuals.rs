use std::cell::RefCell;
use std::rc::Rc;

use crate::reorder::traits::DragVisuals;

/// Drag visuals for the terminal demo.
///
/// Positions arrive in header-row cell units and are snapped to columns
/// when the header is drawn.
#[derive(Debug, Default)]
pub struct TerminalVisuals {
    ghost: Option<(f64, f64)>,
    placeholder: Option<(usize, f64)>,
    needs_redraw: bool,
}

impl TerminalVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Ghost as a half-open column range clipped to `row_width`
    pub fn ghost_columns(&self, row_width: u16) -> Option<(u16, u16)> {
        let (x, width) = self.ghost?;
        let start = x.round().max(0.0) as u16;
        let end = (x + width).round().max(0.0) as u16;
        let (start, end) = (start.min(row_width), end.min(row_width));
        (start < end).then_some((start, end))
    }

    /// Column of the insertion line, clipped to the last cell of the row
    pub fn placeholder_column(&self, row_width: u16) -> Option<u16> {
        let (_, x) = self.placeholder?;
        let last = row_width.checked_sub(1)?;
        Some((x.floor().max(0.0) as u16).min(last))
    }

    pub fn placeholder_index(&self) -> Option<usize> {
        self.placeholder.map(|(index, _)| index)
    }

    /// True once after any visual changed
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

impl DragVisuals for TerminalVisuals {
    fn show_ghost(&mut self, x: f64, width: f64) {
        self.ghost = Some((x, width));
        self.needs_redraw = true;
    }

    fn move_ghost(&mut self, x: f64) {
        if let Some((_, width)) = self.ghost {
            self.ghost = Some((x, width));
            self.needs_redraw = true;
        }
    }

    fn hide_ghost(&mut self) {
        self.ghost = None;
        self.needs_redraw = true;
    }

    fn show_placeholder(&mut self, field_index: usize, x: f64) {
        self.placeholder = Some((field_index, x));
        self.needs_redraw = true;
    }

    fn hide_placeholder(&mut self) {
        self.placeholder = None;
        self.needs_redraw = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ghost_is_clipped_to_row() {
        let mut visuals = TerminalVisuals::new();
        visuals.show_ghost(-3.0, 10.0);
        assert_eq!(visuals.ghost_columns(80), Some((0, 7)));

        visuals.move_ghost(75.0);
        assert_eq!(visuals.ghost_columns(80), Some((75, 80)));

        visuals.move_ghost(90.0);
        assert_eq!(visuals.ghost_columns(80), None);
    }

    #[test]
    fn test_placeholder_column_and_redraw_flag() {
        let mut visuals = TerminalVisuals::new();
        assert!(!visuals.take_redraw());
        visuals.show_placeholder(3, 120.0);
        assert_eq!(visuals.placeholder_column(80), Some(79));
        assert_eq!(visuals.placeholder_index(), Some(3));
        assert!(visuals.take_redraw());
        assert!(!visuals.take_redraw());
    }
}
