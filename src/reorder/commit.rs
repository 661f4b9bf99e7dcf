/// CommitResolver - turns a finished drag into a field-order mutation
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reorder::position::ViewportSnapshot;
use crate::reorder::selection::DraggedRange;
use crate::reorder::traits::GridViewport;

/// A completed move: `length` fields taken from `from` now start at `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescription {
    pub from: usize,
    pub length: usize,
    pub to: usize,
    pub field_names: Vec<String>,
}

impl MoveDescription {
    /// Inclusive range of the moved block after the move
    pub fn selection_range(&self) -> (usize, usize) {
        (self.to, self.to + self.length - 1)
    }

    pub fn moved_right(&self) -> bool {
        self.to > self.from
    }
}

/// How much of the view has to be rebuilt after a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// Every moved and destination field was on screen
    Lightweight,
    /// Part of the move happened off screen
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub description: MoveDescription,
    pub refresh: RefreshKind,
}

pub struct CommitResolver {
    lower_bound: usize,
}

impl CommitResolver {
    /// `lower_bound` is the first slot a block may land on (pinned fields
    /// and a locked leading field sit below it)
    pub fn new(lower_bound: usize) -> Self {
        Self { lower_bound }
    }

    /// Final start index of the block, or `None` when the drop is a no-op.
    ///
    /// Moving right, the block lands so that its last field occupies
    /// `target`; moving left, its first field does.
    pub fn destination(&self, range: &DraggedRange, target: usize, field_count: usize) -> Option<usize> {
        if range.end_index() >= field_count {
            return None;
        }
        if range.contains(target) {
            return None;
        }

        let raw = if range.start_index < target {
            target - (range.length - 1)
        } else {
            target
        };

        let max_start = field_count - range.length;
        let destination = raw.clamp(self.lower_bound.min(max_start), max_start);

        if destination == range.start_index {
            None
        } else {
            Some(destination)
        }
    }

    /// Resolve the drop, apply it to the grid and reselect the moved block.
    ///
    /// Returns `None` for a no-op drop; the grid is left untouched.
    pub fn commit(
        &self,
        range: &DraggedRange,
        target: usize,
        grid: &mut dyn GridViewport,
    ) -> Option<CommitResult> {
        let snapshot = ViewportSnapshot::capture(grid);
        let Some(to) = self.destination(range, target, snapshot.field_count) else {
            debug!(target: "commit",
                "No-op drop: range {:?}, target {}", range, target
            );
            return None;
        };

        let from = range.start_index;
        let length = range.length;
        let field_names: Vec<String> = (from..from + length)
            .filter_map(|idx| grid.field_name(idx))
            .collect();

        let endpoints = [from, from + length - 1, to, to + length - 1];
        let refresh = if endpoints.iter().all(|&idx| snapshot.is_field_visible(idx)) {
            RefreshKind::Lightweight
        } else {
            RefreshKind::Full
        };

        grid.move_fields(from, length, to);
        grid.select_fields(to, to + length - 1);

        debug!(target: "commit",
            "Moved {:?} from {} (len {}) to {}, refresh={:?}",
            field_names, from, length, to, refresh
        );

        Some(CommitResult {
            description: MoveDescription {
                from,
                length,
                to,
                field_names,
            },
            refresh,
        })
    }
}

/// Remove `length` items at `from` and re-insert them starting at `to` in
/// the resulting sequence
pub fn apply_move<T>(items: &mut Vec<T>, from: usize, length: usize, to: usize) {
    if length == 0 || from >= items.len() {
        return;
    }
    let end = (from + length).min(items.len());
    let block: Vec<T> = items.drain(from..end).collect();
    let at = to.min(items.len());
    items.splice(at..at, block);
}
