/// Selection grouping - contiguity detection and the dragged block
use serde::{Deserialize, Serialize};

/// The block of fields carried by a drag: `length` fields from `start_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraggedRange {
    pub start_index: usize,
    pub length: usize,
}

impl DraggedRange {
    pub fn new(start_index: usize, length: usize) -> Self {
        Self {
            start_index,
            length: length.max(1),
        }
    }

    pub fn single(field_index: usize) -> Self {
        Self::new(field_index, 1)
    }

    /// Index of the last field in the block (inclusive)
    pub fn end_index(&self) -> usize {
        self.start_index + self.length - 1
    }

    pub fn contains(&self, field_index: usize) -> bool {
        field_index >= self.start_index && field_index <= self.end_index()
    }

    /// True for every member of the block except its first field
    pub fn holds_interior(&self, field_index: usize) -> bool {
        field_index > self.start_index && field_index <= self.end_index()
    }
}

/// Sorted, de-duplicated copy of a selection
pub fn normalize_selection(indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// Whether the indices form one unbroken run. Empty and single-element
/// selections count as contiguous.
pub fn is_contiguous(indices: &[usize]) -> bool {
    let sorted = normalize_selection(indices);
    sorted.windows(2).all(|pair| pair[1] - pair[0] == 1)
}

/// Derive the block to drag from the selection and the field under the
/// pointer at press time.
///
/// A contiguous selection that contains the pressed field is dragged as a
/// whole; anything else degrades to the pressed field alone.
pub fn dragged_range(indices: &[usize], pointer_field_index: usize) -> DraggedRange {
    let sorted = normalize_selection(indices);

    if sorted.binary_search(&pointer_field_index).is_ok() && is_contiguous(&sorted) {
        DraggedRange::new(sorted[0], sorted.len())
    } else {
        DraggedRange::single(pointer_field_index)
    }
}
