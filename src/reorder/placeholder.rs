/// Placeholder tracking - where the insertion line sits during a drag
use crate::reorder::position::ViewportSnapshot;
use crate::reorder::selection::DraggedRange;
use crate::reorder::traits::GridViewport;

/// Which way the pointer has moved relative to the dragged block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDirection {
    Left,
    Right,
}

impl DragDirection {
    /// Right when the pointer field lies past the start of the block
    pub fn of(pointer_field_index: usize, range: &DraggedRange) -> Self {
        if pointer_field_index > range.start_index {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Valid placeholder positions for the current grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderBounds {
    pub lower: usize,
    pub upper: usize,
}

impl PlaceholderBounds {
    /// Pinned fields and a locked leading field are never drop targets
    pub fn for_grid(grid: &dyn GridViewport) -> Self {
        let locked = if grid.leading_field_locked() { 1 } else { 0 };
        let upper = grid.field_count();
        Self {
            lower: grid.fixed_field_count().max(locked).min(upper),
            upper,
        }
    }

    pub fn clamp(&self, index: usize) -> usize {
        index.clamp(self.lower, self.upper)
    }
}

/// Tracks the insertion-line index for one drag session
#[derive(Debug, Clone)]
pub struct PlaceholderTracker {
    index: usize,
    direction: DragDirection,
}

impl PlaceholderTracker {
    /// The placeholder starts on the dragged block itself
    pub fn new(range: &DraggedRange) -> Self {
        Self {
            index: range.start_index,
            direction: DragDirection::Left,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn direction(&self) -> DragDirection {
        self.direction
    }

    /// Recompute the placeholder for the field under the pointer.
    ///
    /// `visible` holds the field indices of the first and last rendered
    /// spans. Hovering over an interior member of the dragged block pins the
    /// line to the block edge facing the part of the grid that is off screen;
    /// when neither edge qualifies the previous position is kept.
    pub fn update(
        &mut self,
        pointer_field_index: usize,
        range: &DraggedRange,
        bounds: PlaceholderBounds,
        visible: Option<(usize, usize)>,
    ) -> usize {
        self.direction = DragDirection::of(pointer_field_index, range);

        if range.holds_interior(pointer_field_index) {
            if let Some(held) = Self::held_position(range, visible) {
                self.index = held;
            }
            return self.index;
        }

        let raw = match self.direction {
            DragDirection::Right => pointer_field_index + 1,
            DragDirection::Left => pointer_field_index,
        };
        self.index = bounds.clamp(raw);
        self.index
    }

    /// Place the line directly, used by autoscroll ticks
    pub fn force(&mut self, index: usize, direction: DragDirection, bounds: PlaceholderBounds) {
        self.index = bounds.clamp(index);
        self.direction = direction;
    }

    fn held_position(range: &DraggedRange, visible: Option<(usize, usize)>) -> Option<usize> {
        let (first_visible, last_visible) = visible?;
        if first_visible < range.start_index {
            Some(range.start_index)
        } else if last_visible > range.end_index() {
            Some(range.end_index())
        } else {
            None
        }
    }

    /// Drop target handed to the commit step. The line after field `n`
    /// means "land on slot `n`" when the block travels right.
    pub fn drop_target(&self, range: &DraggedRange) -> usize {
        if self.index > range.end_index() {
            self.index - 1
        } else {
            self.index
        }
    }
}

/// Screen x of the insertion line for `index`, or `None` when no rendered
/// span supports it
pub fn placeholder_x(index: usize, snapshot: &ViewportSnapshot, line_width: f64) -> Option<f64> {
    let zoom = snapshot.zoom_ratio;
    let last = snapshot.spans.last()?;

    if index > last.field_index {
        return Some(last.right() * zoom);
    }

    snapshot
        .span_for(index)
        .map(|span| (span.left + line_width / 2.0) * zoom)
}
