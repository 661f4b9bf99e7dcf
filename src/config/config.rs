use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::reorder::autoscroll::ScrollDelaySchedule;
use crate::reorder::session::EngineSettings;
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub drag: DragConfig,
    pub autoscroll: AutoscrollConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Master switch for header drag-reordering
    pub fields_reorderable: bool,

    /// Pixels from a viewport edge that start autoscroll. The terminal demo
    /// uses `display.edge_cells` instead.
    pub edge_threshold: f64,

    /// Milliseconds after a drop during which a new press will not arm a drag
    pub commit_cooldown_ms: u64,

    /// Width of the insertion line
    pub placeholder_line_width: f64,

    /// Maximum number of undoable moves
    pub undo_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscrollConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Reduction of the delay per tick
    pub step_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the tracing log panel under the header row
    pub show_log_panel: bool,

    /// Use Unicode glyphs for markers
    pub use_glyphs: bool,

    /// Fill character for the floating ghost
    pub ghost_char: String,

    /// Marker drawn before pinned field names
    pub pin_marker: String,

    /// Header cells from either edge that start autoscroll in the terminal
    pub edge_cells: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            fields_reorderable: true,
            edge_threshold: 20.0,
            commit_cooldown_ms: 200,
            placeholder_line_width: 2.0,
            undo_depth: 100,
        }
    }
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 30,
            max_delay_ms: 100,
            step_ms: 5,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_log_panel: true,
            use_glyphs: true,
            ghost_char: "░".to_string(),
            pin_marker: "📌".to_string(),
            edge_cells: 2.0,
        }
    }
}

impl DisplayConfig {
    /// ASCII markers for terminals without glyph support
    pub fn simple_markers(&mut self) {
        self.ghost_char = "#".to_string();
        self.pin_marker = "[P]".to_string();
    }
}

impl From<&AutoscrollConfig> for ScrollDelaySchedule {
    fn from(config: &AutoscrollConfig) -> Self {
        let min_delay = Duration::from_millis(config.min_delay_ms);
        Self {
            min_delay,
            max_delay: Duration::from_millis(config.max_delay_ms).max(min_delay),
            step: Duration::from_millis(config.step_ms),
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.display.use_glyphs {
            config.display.simple_markers();
        }

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Settings for `FieldReorderEngine`
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            fields_reorderable: self.drag.fields_reorderable,
            edge_threshold: self.drag.edge_threshold,
            placeholder_line_width: self.drag.placeholder_line_width,
            commit_cooldown: Duration::from_millis(self.drag.commit_cooldown_ms),
            autoscroll: ScrollDelaySchedule::from(&self.autoscroll),
        }
    }

    /// Settings for the terminal demo, where header positions are cell
    /// columns rather than pixels
    pub fn terminal_engine_settings(&self) -> EngineSettings {
        EngineSettings {
            edge_threshold: self.display.edge_cells,
            placeholder_line_width: 1.0,
            ..self.engine_settings()
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Field Reorder Configuration File
# Location: ~/.config/field-reorder/config.toml (Linux)
#           ~/Library/Application Support/field-reorder/config.toml (macOS)
#           %APPDATA%\field-reorder\config.toml (Windows)

[drag]
# Allow header cells to be dragged to a new position
fields_reorderable = true

# Distance in pixels from the left/right edge of the header row that starts
# autoscroll (the terminal demo uses display.edge_cells)
edge_threshold = 20.0

# A press within this many milliseconds of a drop is not treated as a new drag
commit_cooldown_ms = 200

# Width of the insertion line shown while dragging
placeholder_line_width = 2.0

# Number of moves kept for undo
undo_depth = 100

[autoscroll]
# Autoscroll starts slow and speeds up while the pointer stays at the edge:
# delay = max(min_delay_ms, max_delay_ms - ticks * step_ms)
min_delay_ms = 30
max_delay_ms = 100
step_ms = 5

[display]
# Show the log panel below the header row
show_log_panel = true

# Use Unicode glyphs (set to false for ASCII-only terminals)
use_glyphs = true

# Character used to draw the floating ghost
ghost_char = "░"

# Marker shown before pinned fields
pin_marker = "📌"

# Header cells from either edge that start autoscroll in the terminal demo
edge_cells = 2.0
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.drag.fields_reorderable);
        assert_eq!(config.drag.commit_cooldown_ms, 200);
        assert!(config.display.show_log_panel);
    }

    #[test]
    fn test_engine_settings_from_config() {
        let settings = Config::default().engine_settings();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[autoscroll]\nstep_ms = 10\n").unwrap();
        assert_eq!(parsed.autoscroll.step_ms, 10);
        assert_eq!(parsed.autoscroll.max_delay_ms, 100);
        assert_eq!(parsed.drag.edge_threshold, 20.0);
    }

    #[test]
    fn test_terminal_settings_use_cell_threshold() {
        let config = Config::default();
        let settings = config.terminal_engine_settings();
        assert_eq!(settings.edge_threshold, 2.0);
        assert_eq!(settings.placeholder_line_width, 1.0);
        assert_eq!(settings.commit_cooldown, config.engine_settings().commit_cooldown);
    }

    #[test]
    fn test_commented_template_parses() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed.engine_settings(), EngineSettings::default());
        assert_eq!(parsed.display.ghost_char, "░");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.drag.undo_depth, parsed.drag.undo_depth);
    }
}
