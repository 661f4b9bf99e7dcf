use tracing::{debug, warn};

use crate::reorder::commit::MoveDescription;
use crate::reorder::traits::{GridViewport, MoveHistory};

const DEFAULT_MAX_DEPTH: usize = 100;

/// Which direction a history step was applied in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

type ChangeCallback = Box<dyn FnMut(HistoryAction, &MoveDescription)>;

/// Undo/redo stacks of field moves
pub struct FieldOrderHistory {
    undo_stack: Vec<MoveDescription>,
    redo_stack: Vec<MoveDescription>,
    max_depth: usize,
    on_change: Option<ChangeCallback>,
}

impl Default for FieldOrderHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldOrderHistory {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            on_change: None,
        }
    }

    /// Called with every move applied by `undo` or `redo`
    pub fn set_on_change(&mut self, callback: impl FnMut(HistoryAction, &MoveDescription) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn last_move(&self) -> Option<&MoveDescription> {
        self.undo_stack.last()
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Reverse the most recent move. Returns the move that was applied to
    /// the grid.
    pub fn undo(&mut self, grid: &mut dyn GridViewport) -> Option<MoveDescription> {
        let forward = self.undo_stack.pop()?;
        let inverse = MoveDescription {
            from: forward.to,
            length: forward.length,
            to: forward.from,
            field_names: forward.field_names.clone(),
        };

        if !Self::apply(&inverse, grid) {
            self.reset();
            return None;
        }
        debug!(target: "history", "Undo {:?}: {} -> {}", inverse.field_names, inverse.from, inverse.to);

        self.redo_stack.push(forward);
        self.notify(HistoryAction::Undo, &inverse);
        Some(inverse)
    }

    /// Re-apply the most recently undone move
    pub fn redo(&mut self, grid: &mut dyn GridViewport) -> Option<MoveDescription> {
        let forward = self.redo_stack.pop()?;

        if !Self::apply(&forward, grid) {
            self.reset();
            return None;
        }
        debug!(target: "history", "Redo {:?}: {} -> {}", forward.field_names, forward.from, forward.to);

        self.push_undo(forward.clone());
        self.notify(HistoryAction::Redo, &forward);
        Some(forward)
    }

    /// Move the block and reselect it. Refuses when the grid no longer holds
    /// the recorded fields at `from`.
    fn apply(step: &MoveDescription, grid: &mut dyn GridViewport) -> bool {
        let current: Vec<String> = (step.from..step.from + step.length)
            .filter_map(|idx| grid.field_name(idx))
            .collect();
        if !step.field_names.is_empty() && current != step.field_names {
            warn!(target: "history",
                "Field order changed outside history (expected {:?}, found {:?}); clearing history",
                step.field_names, current
            );
            return false;
        }

        grid.move_fields(step.from, step.length, step.to);
        let (start, end) = step.selection_range();
        grid.select_fields(start, end);
        true
    }

    fn push_undo(&mut self, description: MoveDescription) {
        self.undo_stack.push(description);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    fn notify(&mut self, action: HistoryAction, applied: &MoveDescription) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(action, applied);
        }
    }
}

impl MoveHistory for FieldOrderHistory {
    fn record(&mut self, description: &MoveDescription) {
        debug!(target: "history",
            "Recording move of {:?} ({} -> {})",
            description.field_names, description.from, description.to
        );
        self.push_undo(description.clone());
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field_grid::FieldGrid;

    fn recorded_move(grid: &mut FieldGrid, from: usize, length: usize, to: usize) -> MoveDescription {
        let field_names = (from..from + length).filter_map(|i| grid.field_name(i)).collect();
        grid.move_fields(from, length, to);
        MoveDescription {
            from,
            length,
            to,
            field_names,
        }
    }

    #[test]
    fn test_undo_restores_order() {
        let mut grid = FieldGrid::with_uniform_width(&["A", "B", "C", "D"], 10.0, 40.0);
        let mut history = FieldOrderHistory::new();
        let description = recorded_move(&mut grid, 1, 1, 3);
        history.record(&description);

        let inverse = history.undo(&mut grid).unwrap();
        assert_eq!((inverse.from, inverse.to), (3, 1));
        assert_eq!(grid.field_names(), vec!["A", "B", "C", "D"]);
        assert_eq!(grid.selected(), &[1]);
        assert!(history.can_redo());

        history.redo(&mut grid).unwrap();
        assert_eq!(grid.field_names(), vec!["A", "C", "D", "B"]);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut grid = FieldGrid::with_uniform_width(&["A", "B", "C"], 10.0, 30.0);
        let mut history = FieldOrderHistory::new();
        let first = recorded_move(&mut grid, 0, 1, 2);
        history.record(&first);
        history.undo(&mut grid);
        assert!(history.can_redo());

        let second = recorded_move(&mut grid, 2, 1, 0);
        history.record(&second);
        assert!(!history.can_redo());
        assert_eq!(history.last_move(), Some(&second));
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = FieldOrderHistory::with_max_depth(2);
        for to in 1..=3 {
            history.record(&MoveDescription {
                from: 0,
                length: 1,
                to,
                field_names: vec![],
            });
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.last_move().map(|m| m.to), Some(3));
    }

    #[test]
    fn test_external_change_clears_history() {
        let mut grid = FieldGrid::with_uniform_width(&["A", "B", "C"], 10.0, 30.0);
        let mut history = FieldOrderHistory::new();
        let description = recorded_move(&mut grid, 0, 1, 2);
        history.record(&description);

        grid.move_fields(0, 1, 2);
        assert!(history.undo(&mut grid).is_none());
        assert!(!history.can_undo());
    }
}
