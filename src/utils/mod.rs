//! Utility helpers shared by the binaries

pub mod app_paths;
