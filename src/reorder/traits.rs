//! Collaborator seams for the reorder engine
//!
//! The engine never owns the grid, the selection, the renderer or the undo
//! stack. It talks to them through the traits in this module so the same
//! engine drives the terminal demo, the replay tool and the test doubles.

use crate::reorder::commit::MoveDescription;

/// One on-screen field as laid out by the renderer for the current frame.
///
/// `left` and `width` are in unscaled grid units; callers multiply by the
/// zoom ratio before comparing against pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleFieldSpan {
    pub field_index: usize,
    pub left: f64,
    pub width: f64,
}

impl VisibleFieldSpan {
    pub fn new(field_index: usize, left: f64, width: f64) -> Self {
        Self {
            field_index,
            left,
            width,
        }
    }

    /// Right boundary in unscaled units
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Horizontal direction used for viewport shifts and autoscroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Left,
    Right,
}

impl ScrollDirection {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Grid/viewport collaborator.
///
/// Everything except `scroll_by`, `move_fields` and `select_fields` is a
/// read-only query.
pub trait GridViewport {
    /// Number of scrollable fields currently scrolled past the fixed region
    fn scroll_offset(&self) -> usize;

    /// Largest value `scroll_offset` can take
    fn max_scroll_offset(&self) -> usize;

    /// Shift the viewport by exactly one field
    fn scroll_by(&mut self, direction: ScrollDirection);

    /// Number of leading pinned fields excluded from horizontal scrolling
    fn fixed_field_count(&self) -> usize;

    fn field_width(&self, index: usize) -> Option<f64>;

    fn field_count(&self) -> usize;

    fn field_name(&self, index: usize) -> Option<String>;

    fn zoom_ratio(&self) -> f64;

    /// Ordered spans of the fields rendered in the current frame
    fn visible_field_spans(&self) -> Vec<VisibleFieldSpan>;

    /// Width of the rendered area in unscaled units
    fn viewport_width(&self) -> f64;

    /// When true the field at index 0 must stay first (pivoted row headers)
    fn leading_field_locked(&self) -> bool {
        false
    }

    /// When true no field may be reordered at all
    fn reorder_blocked(&self) -> bool {
        false
    }

    /// Remove `length` fields at `from` and re-insert them so the block
    /// starts at `to` in the resulting order
    fn move_fields(&mut self, from: usize, length: usize, to: usize);

    /// Replace the selection with the inclusive range `start..=end`
    fn select_fields(&mut self, start: usize, end: usize);
}

/// Source of the user's selection, read once when a drag is armed
pub trait SelectionSource {
    fn selection(&self) -> Vec<usize>;
}

impl SelectionSource for Vec<usize> {
    fn selection(&self) -> Vec<usize> {
        self.clone()
    }
}

/// Rendering collaborator for the floating ghost and the insertion line.
///
/// All calls are fire-and-forget; the engine never reads anything back.
pub trait DragVisuals {
    fn show_ghost(&mut self, x: f64, width: f64);
    fn move_ghost(&mut self, x: f64);
    fn hide_ghost(&mut self);
    fn show_placeholder(&mut self, field_index: usize, x: f64);
    fn hide_placeholder(&mut self);
}

/// Undo/redo collaborator. Receives forward moves only; building the
/// inverse is the implementor's job.
pub trait MoveHistory {
    fn record(&mut self, description: &MoveDescription);
}

/// Observer for the outward notifications of a finished gesture
pub trait ReorderListener {
    /// Internal notification, sent for every finished gesture
    fn on_drag_ended(&mut self) {}

    /// Public notification, sent only when fields actually moved
    fn on_fields_reordered(&mut self, _description: &MoveDescription) {}

    /// Hook for applications that persist field order outside the grid
    fn persist_field_order(&mut self, _description: &MoveDescription) {}

    /// Listener name for debugging
    fn name(&self) -> &str;
}
