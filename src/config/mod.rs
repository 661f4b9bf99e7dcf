//! Configuration module
//!
//! TOML settings for drag behavior, autoscroll timing and the demo display.

pub mod config;

pub use config::Config;
