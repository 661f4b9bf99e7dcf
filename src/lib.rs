//! Interactive field reordering for columnar grids
//!
//! The `reorder` module holds the drag engine. Everything else is a
//! collaborator: an in-memory grid, undo/redo history, saved views, a
//! scripted replay runner and a terminal demo.

pub mod config;
pub mod data;
pub mod history;
pub mod logging;
pub mod reorder;
pub mod replay;
pub mod ui;
pub mod utils;
