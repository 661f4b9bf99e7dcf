// Pointer x to field index resolution against a live FieldGrid

use field_reorder::data::field_grid::FieldGrid;
use field_reorder::reorder::position::{PositionResolver, ViewportSnapshot};
use field_reorder::reorder::traits::{GridViewport, ScrollDirection};

fn wide_grid() -> FieldGrid {
    let names: Vec<String> = (0..12).map(|i| format!("f{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    FieldGrid::with_uniform_width(&refs, 10.0, 40.0)
}

fn resolve(grid: &FieldGrid, x: f64) -> Option<usize> {
    PositionResolver::resolve(x, &ViewportSnapshot::capture(grid))
}

#[test]
fn test_at_or_beyond_last_span_appends() {
    let grid = wide_grid();
    for x in [40.0, 40.5, 100.0, 1e6] {
        assert_eq!(resolve(&grid, x), Some(grid.field_count()));
    }
}

#[test]
fn test_left_of_first_span_is_zero() {
    let grid = wide_grid();
    assert_eq!(resolve(&grid, -5.0), Some(0));
}

#[test]
fn test_scroll_offset_applied_to_scrollable_fields() {
    let mut grid = wide_grid();
    grid.scroll_by(ScrollDirection::Right);
    grid.scroll_by(ScrollDirection::Right);
    assert_eq!(resolve(&grid, 1.0), Some(2));
    assert_eq!(resolve(&grid, 39.0), Some(5));
}

#[test]
fn test_pinned_fields_ignore_scroll_offset() {
    let mut grid = wide_grid();
    grid.pin_leading(2);
    grid.set_scroll_offset(3);
    assert_eq!(resolve(&grid, 5.0), Some(0));
    assert_eq!(resolve(&grid, 15.0), Some(1));
    assert_eq!(resolve(&grid, 25.0), Some(5));
}

#[test]
fn test_zoomed_grid() {
    let mut grid = wide_grid();
    grid.set_zoom_ratio(1.5);
    // Field 1 spans 15..30 on screen
    assert_eq!(resolve(&grid, 14.9), Some(0));
    assert_eq!(resolve(&grid, 15.0), Some(1));
    assert_eq!(resolve(&grid, 60.0), Some(grid.field_count()));
}

#[test]
fn test_uneven_widths() {
    let grid = FieldGrid::new(
        vec![
            field_reorder::data::field_grid::Field::new("narrow", 4.0),
            field_reorder::data::field_grid::Field::new("wide", 30.0),
            field_reorder::data::field_grid::Field::new("mid", 12.0),
        ],
        100.0,
    );
    assert_eq!(resolve(&grid, 3.9), Some(0));
    assert_eq!(resolve(&grid, 33.9), Some(1));
    assert_eq!(resolve(&grid, 34.0), Some(2));
    assert_eq!(resolve(&grid, 46.0), Some(3));
}
