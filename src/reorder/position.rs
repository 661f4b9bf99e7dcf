/// Pointer position → field index resolution
///
/// The resolver works on a `ViewportSnapshot`, a per-frame copy of the
/// grid's layout state. Taking the snapshot once per pointer event keeps
/// every component of the engine looking at the same frame.
use tracing::trace;

use crate::reorder::traits::{GridViewport, VisibleFieldSpan};

/// Frame-local copy of everything the engine reads from the grid
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSnapshot {
    pub scroll_offset: usize,
    pub max_scroll_offset: usize,
    pub fixed_field_count: usize,
    pub field_count: usize,
    pub zoom_ratio: f64,
    pub viewport_width: f64,
    pub spans: Vec<VisibleFieldSpan>,
}

impl ViewportSnapshot {
    /// Capture the current frame from a grid collaborator
    pub fn capture(grid: &dyn GridViewport) -> Self {
        Self {
            scroll_offset: grid.scroll_offset(),
            max_scroll_offset: grid.max_scroll_offset(),
            fixed_field_count: grid.fixed_field_count(),
            field_count: grid.field_count(),
            zoom_ratio: grid.zoom_ratio(),
            viewport_width: grid.viewport_width(),
            spans: grid.visible_field_spans(),
        }
    }

    /// Span currently showing `field_index`, if it is on screen
    pub fn span_for(&self, field_index: usize) -> Option<&VisibleFieldSpan> {
        self.spans.iter().find(|s| s.field_index == field_index)
    }

    pub fn is_field_visible(&self, field_index: usize) -> bool {
        self.span_for(field_index).is_some()
    }

    /// Field indices of the first and last rendered spans
    pub fn visible_bounds(&self) -> Option<(usize, usize)> {
        match (self.spans.first(), self.spans.last()) {
            (Some(first), Some(last)) => Some((first.field_index, last.field_index)),
            _ => None,
        }
    }

    /// First rendered field that is not part of the fixed region
    pub fn first_scrollable_field(&self) -> Option<usize> {
        self.spans
            .iter()
            .map(|s| s.field_index)
            .find(|&idx| idx >= self.fixed_field_count)
    }

    /// Right edge of the rendered fields in screen pixels, capped by the
    /// viewport width
    pub fn final_boundary(&self) -> f64 {
        let wall = self.spans.last().map(|s| s.right()).unwrap_or(0.0);
        wall.min(self.viewport_width) * self.zoom_ratio
    }
}

/// Maps a pointer x-coordinate onto a discrete field index
pub struct PositionResolver;

impl PositionResolver {
    /// Resolve `pointer_x` (screen pixels) to a field index in
    /// `0..=field_count`.
    ///
    /// Left of the first span resolves to 0 and at or beyond the right edge
    /// of the last span resolves to `field_count` ("append"). Returns `None`
    /// when there are no spans or the snapshot is stale, i.e. the span in the
    /// resolved slot does not carry the field the scroll arithmetic expects.
    pub fn resolve(pointer_x: f64, snapshot: &ViewportSnapshot) -> Option<usize> {
        let spans = &snapshot.spans;
        let zoom = snapshot.zoom_ratio;

        let first = spans.first()?;
        let last = spans.last()?;

        if pointer_x < first.left * zoom {
            return Some(0);
        }
        if pointer_x >= last.right() * zoom {
            return Some(snapshot.field_count);
        }

        let slot = spans.iter().rposition(|s| s.left * zoom <= pointer_x)?;

        // Fixed fields never scroll; everything after them is shifted by
        // the scroll offset
        let field_index = if slot < snapshot.fixed_field_count {
            slot
        } else {
            slot + snapshot.scroll_offset
        };

        if spans[slot].field_index != field_index {
            trace!(target: "reorder",
                "Stale span snapshot: slot {} holds field {}, expected {}",
                slot, spans[slot].field_index, field_index
            );
            return None;
        }

        Some(field_index.min(snapshot.field_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(widths: &[f64], fixed: usize, scroll: usize, field_count: usize) -> ViewportSnapshot {
        let mut spans = Vec::new();
        let mut left = 0.0;
        for (slot, width) in widths.iter().enumerate() {
            let field_index = if slot < fixed { slot } else { slot + scroll };
            spans.push(VisibleFieldSpan::new(field_index, left, *width));
            left += width;
        }
        ViewportSnapshot {
            scroll_offset: scroll,
            max_scroll_offset: field_count.saturating_sub(widths.len()),
            fixed_field_count: fixed,
            field_count,
            zoom_ratio: 1.0,
            viewport_width: left,
            spans,
        }
    }

    #[test]
    fn test_resolve_inside_spans() {
        let snap = snapshot(&[10.0, 20.0, 30.0], 0, 0, 3);
        assert_eq!(PositionResolver::resolve(0.0, &snap), Some(0));
        assert_eq!(PositionResolver::resolve(9.9, &snap), Some(0));
        assert_eq!(PositionResolver::resolve(10.0, &snap), Some(1));
        assert_eq!(PositionResolver::resolve(45.0, &snap), Some(2));
    }

    #[test]
    fn test_resolve_beyond_last_span_appends() {
        let snap = snapshot(&[10.0, 20.0, 30.0], 0, 0, 3);
        assert_eq!(PositionResolver::resolve(60.0, &snap), Some(3));
        assert_eq!(PositionResolver::resolve(500.0, &snap), Some(3));
    }

    #[test]
    fn test_resolve_left_of_first_span() {
        let mut snap = snapshot(&[10.0, 10.0], 0, 0, 2);
        for span in &mut snap.spans {
            span.left += 5.0;
        }
        assert_eq!(PositionResolver::resolve(2.0, &snap), Some(0));
    }

    #[test]
    fn test_scroll_offset_skips_fixed_region() {
        // One pinned field, scrolled by 3
        let snap = snapshot(&[10.0, 10.0, 10.0], 1, 3, 10);
        assert_eq!(PositionResolver::resolve(5.0, &snap), Some(0));
        assert_eq!(PositionResolver::resolve(15.0, &snap), Some(4));
        assert_eq!(PositionResolver::resolve(25.0, &snap), Some(5));
    }

    #[test]
    fn test_zoom_scales_boundaries() {
        let mut snap = snapshot(&[10.0, 10.0], 0, 0, 2);
        snap.zoom_ratio = 2.0;
        assert_eq!(PositionResolver::resolve(15.0, &snap), Some(0));
        assert_eq!(PositionResolver::resolve(25.0, &snap), Some(1));
        assert_eq!(PositionResolver::resolve(40.0, &snap), Some(2));
    }

    #[test]
    fn test_stale_snapshot_is_skipped() {
        let mut snap = snapshot(&[10.0, 10.0], 0, 2, 6);
        snap.spans[1].field_index = 9;
        assert_eq!(PositionResolver::resolve(15.0, &snap), None);
    }

    #[test]
    fn test_empty_spans() {
        let snap = snapshot(&[], 0, 0, 0);
        assert_eq!(PositionResolver::resolve(1.0, &snap), None);
    }
}
