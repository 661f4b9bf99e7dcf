/// In-memory field list with a horizontally scrolling viewport
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::reorder::commit::apply_move;
use crate::reorder::position::{PositionResolver, ViewportSnapshot};
use crate::reorder::session::HeaderHit;
use crate::reorder::traits::{GridViewport, ScrollDirection, VisibleFieldSpan};

/// One reorderable column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub width: f64,
    #[serde(default)]
    pub pinned: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, width: f64) -> Self {
        Self {
            name: name.into(),
            width,
            pinned: false,
        }
    }
}

/// Grid collaborator backed by a `Vec<Field>`.
///
/// Pinned fields form a prefix that never scrolls. `scroll_offset` counts
/// scrollable fields hidden to the left of the viewport.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    fields: Vec<Field>,
    scroll_offset: usize,
    viewport_width: f64,
    zoom_ratio: f64,
    selected: Vec<usize>,
    leading_field_locked: bool,
    reorder_blocked: bool,
}

impl FieldGrid {
    pub fn new(fields: Vec<Field>, viewport_width: f64) -> Self {
        Self {
            fields,
            scroll_offset: 0,
            viewport_width,
            zoom_ratio: 1.0,
            selected: Vec::new(),
            leading_field_locked: false,
            reorder_blocked: false,
        }
    }

    pub fn with_uniform_width(names: &[&str], width: f64, viewport_width: f64) -> Self {
        let fields = names.iter().map(|name| Field::new(*name, width)).collect();
        Self::new(fields, viewport_width)
    }

    /// Build a grid from the header row of a CSV file. Widths are estimated
    /// from the header and up to 100 data rows.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, viewport_width: f64) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let grid = Self::from_csv_reader(file, viewport_width)
            .with_context(|| format!("Failed to read CSV header from {}", path.display()))?;
        info!("Loaded {} fields from {}", grid.fields.len(), path.display());
        Ok(grid)
    }

    pub fn from_csv_reader<R: Read>(reader: R, viewport_width: f64) -> Result<Self> {
        const MAX_ROWS_TO_CHECK: usize = 100;

        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        let mut max_lens: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

        for result in reader.records().take(MAX_ROWS_TO_CHECK) {
            let record = result?;
            for (idx, value) in record.iter().enumerate() {
                if let Some(max_len) = max_lens.get_mut(idx) {
                    *max_len = (*max_len).max(value.chars().count());
                }
            }
        }

        let fields = headers
            .iter()
            .zip(max_lens)
            .map(|(name, max_len)| Field::new(name, (max_len + 2).clamp(4, 50) as f64))
            .collect();
        Ok(Self::new(fields, viewport_width))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Rearrange fields to follow a saved order. Fields the order does not
    /// mention keep their relative order after the named ones; pinned fields
    /// stay in front.
    pub fn apply_order(&mut self, order: &[String]) {
        let rank = |field: &Field| {
            order
                .iter()
                .position(|name| *name == field.name)
                .unwrap_or(order.len())
        };
        self.fields.sort_by_key(|f| (!f.pinned, rank(f)));
        self.selected.clear();
        self.clamp_scroll();
    }

    /// Pin the first `count` fields
    pub fn pin_leading(&mut self, count: usize) {
        for (idx, field) in self.fields.iter_mut().enumerate() {
            field.pinned = idx < count;
        }
        self.clamp_scroll();
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn set_selection(&mut self, indices: Vec<usize>) {
        self.selected = indices;
    }

    /// Toggle one field in the selection, as a ctrl-click would
    pub fn toggle_selected(&mut self, index: usize) {
        if let Some(pos) = self.selected.iter().position(|&i| i == index) {
            self.selected.remove(pos);
        } else if index < self.fields.len() {
            self.selected.push(index);
            self.selected.sort_unstable();
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
        self.clamp_scroll();
    }

    pub fn set_zoom_ratio(&mut self, zoom_ratio: f64) {
        self.zoom_ratio = zoom_ratio;
    }

    pub fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.max_scroll_offset());
    }

    pub fn set_leading_field_locked(&mut self, locked: bool) {
        self.leading_field_locked = locked;
    }

    pub fn set_reorder_blocked(&mut self, blocked: bool) {
        self.reorder_blocked = blocked;
    }

    /// Describe the header cell under screen x, if any
    pub fn header_hit(&self, x: f64) -> Option<HeaderHit> {
        let snapshot = ViewportSnapshot::capture(self);
        let field_index = PositionResolver::resolve(x, &snapshot)?;
        let field = self.fields.get(field_index)?;
        Some(HeaderHit {
            field_index,
            is_header: true,
            is_movable: !field.pinned,
            secondary_button: false,
        })
    }

    fn pinned_width(&self) -> f64 {
        self.fields
            .iter()
            .take_while(|f| f.pinned)
            .map(|f| f.width)
            .sum()
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll_offset();
        if self.scroll_offset > max {
            debug!("Clamping scroll offset {} to {}", self.scroll_offset, max);
            self.scroll_offset = max;
        }
    }
}

impl GridViewport for FieldGrid {
    fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Smallest offset at which the last field is fully visible
    fn max_scroll_offset(&self) -> usize {
        let fixed = self.fixed_field_count();
        let available = self.viewport_width - self.pinned_width();
        let scrollable = &self.fields[fixed..];

        let mut used = 0.0;
        let mut fitting = 0;
        for field in scrollable.iter().rev() {
            if used + field.width > available {
                break;
            }
            used += field.width;
            fitting += 1;
        }

        // A single field wider than the viewport still counts as shown
        scrollable.len().saturating_sub(fitting.max(1))
    }

    fn scroll_by(&mut self, direction: ScrollDirection) {
        self.scroll_offset = match direction {
            ScrollDirection::Left => self.scroll_offset.saturating_sub(1),
            ScrollDirection::Right => (self.scroll_offset + 1).min(self.max_scroll_offset()),
        };
    }

    fn fixed_field_count(&self) -> usize {
        self.fields.iter().take_while(|f| f.pinned).count()
    }

    fn field_width(&self, index: usize) -> Option<f64> {
        self.fields.get(index).map(|f| f.width)
    }

    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field_name(&self, index: usize) -> Option<String> {
        self.fields.get(index).map(|f| f.name.clone())
    }

    fn zoom_ratio(&self) -> f64 {
        self.zoom_ratio
    }

    fn visible_field_spans(&self) -> Vec<VisibleFieldSpan> {
        let fixed = self.fixed_field_count();
        let scrolled = (fixed + self.scroll_offset).min(self.fields.len());

        let mut spans = Vec::new();
        let mut left = 0.0;
        let indices = (0..fixed).chain(scrolled..self.fields.len());
        for idx in indices {
            if left >= self.viewport_width {
                break;
            }
            let width = self.fields[idx].width;
            spans.push(VisibleFieldSpan::new(idx, left, width));
            left += width;
        }
        spans
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn leading_field_locked(&self) -> bool {
        self.leading_field_locked
    }

    fn reorder_blocked(&self) -> bool {
        self.reorder_blocked
    }

    fn move_fields(&mut self, from: usize, length: usize, to: usize) {
        apply_move(&mut self.fields, from, length, to);
        self.clamp_scroll();
    }

    fn select_fields(&mut self, start: usize, end: usize) {
        let end = end.min(self.fields.len().saturating_sub(1));
        self.selected = (start..=end).collect();
    }
}
