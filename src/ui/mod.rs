//! Terminal demo: header rendering, drag visuals and the event loop

pub mod header_renderer;
pub mod reorder_demo;
pub mod selection_handler;
pub mod terminal_visuals;
