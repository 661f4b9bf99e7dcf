// Contiguity detection and dragged-range derivation

use field_reorder::reorder::selection::{dragged_range, is_contiguous, DraggedRange};

#[test]
fn test_contiguity() {
    assert!(is_contiguous(&[2, 3, 4]));
    assert!(!is_contiguous(&[2, 4]));
    assert!(is_contiguous(&[5]));
}

#[test]
fn test_unsorted_contiguous_selection() {
    assert!(is_contiguous(&[7, 5, 6]));
    assert_eq!(dragged_range(&[7, 5, 6], 7), DraggedRange::new(5, 3));
}

#[test]
fn test_non_contiguous_selection_drags_pressed_field_only() {
    let range = dragged_range(&[0, 2], 0);
    assert_eq!(range.start_index, 0);
    assert_eq!(range.length, 1);
    assert!(!range.contains(2));
}

#[test]
fn test_press_outside_selection() {
    assert_eq!(dragged_range(&[1, 2, 3], 6), DraggedRange::single(6));
}

#[test]
fn test_length_never_zero() {
    assert_eq!(DraggedRange::new(3, 0).length, 1);
}
