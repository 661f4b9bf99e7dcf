//! Grid-side collaborators: the in-memory field grid and saved views

pub mod field_grid;
pub mod saved_view;
