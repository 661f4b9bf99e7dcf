use tracing::debug;

use crate::data::field_grid::FieldGrid;
use crate::reorder::session::EventDisposition;

/// How a plain header click changes the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMode {
    Replace,
    /// Ctrl-click: add or remove one field
    Toggle,
    /// Shift-click: select everything between the nearest selected field
    /// and the clicked one
    Extend,
}

/// Press handler for clicks the reorder engine does not take: modifier
/// clicks, and plain presses it refused to arm
pub fn handle_press(grid: &mut FieldGrid, x: f64, mode: ClickMode) -> EventDisposition {
    let Some(hit) = grid.header_hit(x) else {
        return EventDisposition::Ignored;
    };
    select_field(grid, hit.field_index, mode);
    EventDisposition::Consumed
}

/// Apply one click on `field` to the grid selection
pub fn select_field(grid: &mut FieldGrid, field: usize, mode: ClickMode) {
    match mode {
        ClickMode::Replace => grid.set_selection(vec![field]),
        ClickMode::Toggle => grid.toggle_selected(field),
        ClickMode::Extend => {
            let anchor = grid
                .selected()
                .iter()
                .copied()
                .min_by_key(|&idx| idx.abs_diff(field))
                .unwrap_or(field);
            let (start, end) = (anchor.min(field), anchor.max(field));
            grid.set_selection((start..=end).collect());
        }
    }
    debug!("Selection after {:?} click: {:?}", mode, grid.selected());
}
