//! Scripted gesture replay
//!
//! A replay script describes a grid and a sequence of pointer steps. The
//! runner drives a `FieldReorderEngine` against an in-memory `FieldGrid`
//! using a simulated clock, so autoscroll timing is reproducible.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::data::field_grid::{Field, FieldGrid};
use crate::history::FieldOrderHistory;
use crate::reorder::commit::MoveDescription;
use crate::reorder::session::{EngineSettings, EventDisposition, FieldReorderEngine, PointerEvent};
use crate::reorder::traits::{GridViewport, ReorderListener};
use crate::reorder::visuals::RecordingVisuals;
use crate::ui::selection_handler::{handle_press, ClickMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub fields: Vec<Field>,
    pub viewport_width: f64,
    #[serde(default)]
    pub fixed_count: usize,
    #[serde(default = "default_zoom")]
    pub zoom_ratio: f64,
    #[serde(default)]
    pub leading_field_locked: bool,
    #[serde(default)]
    pub selection: Vec<usize>,
    pub steps: Vec<ReplayStep>,
}

fn default_zoom() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    Down {
        x: f64,
        #[serde(default)]
        secondary: bool,
    },
    Move {
        x: f64,
    },
    /// Advance the clock, firing any autoscroll ticks that fall due
    Wait {
        ms: u64,
    },
    Up,
    Cancel,
    Undo,
    Redo,
    Select {
        indices: Vec<usize>,
    },
}

impl ReplayStep {
    pub fn label(&self) -> String {
        match self {
            Self::Down { x, secondary: false } => format!("down x={}", x),
            Self::Down { x, secondary: true } => format!("down x={} (secondary)", x),
            Self::Move { x } => format!("move x={}", x),
            Self::Wait { ms } => format!("wait {}ms", ms),
            Self::Up => "up".to_string(),
            Self::Cancel => "cancel".to_string(),
            Self::Undo => "undo".to_string(),
            Self::Redo => "redo".to_string(),
            Self::Select { indices } => format!("select {:?}", indices),
        }
    }
}

impl ReplayScript {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        let script = serde_json::from_str(&content)
            .with_context(|| format!("Malformed replay script {}", path.display()))?;
        Ok(script)
    }

    fn build_grid(&self) -> FieldGrid {
        let mut grid = FieldGrid::new(self.fields.clone(), self.viewport_width);
        if self.fixed_count > 0 {
            grid.pin_leading(self.fixed_count);
        }
        grid.set_zoom_ratio(self.zoom_ratio);
        grid.set_leading_field_locked(self.leading_field_locked);
        grid.set_selection(self.selection.clone());
        grid
    }
}

/// State after one replayed step
#[derive(Debug, Clone, Serialize)]
pub struct StepTrace {
    pub step: String,
    pub consumed: bool,
    pub placeholder: Option<usize>,
    pub scroll_offset: usize,
    pub ticks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub final_order: Vec<String>,
    pub selection: Vec<usize>,
    pub scroll_offset: usize,
    pub moves: Vec<MoveDescription>,
    pub drags_ended: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub steps: Vec<StepTrace>,
}

/// Listener that keeps every public reorder notification
#[derive(Debug, Default)]
pub struct MoveRecorder {
    pub moves: Vec<MoveDescription>,
    pub drags_ended: usize,
}

impl ReorderListener for MoveRecorder {
    fn on_drag_ended(&mut self) {
        self.drags_ended += 1;
    }

    fn on_fields_reordered(&mut self, description: &MoveDescription) {
        self.moves.push(description.clone());
    }

    fn name(&self) -> &str {
        "MoveRecorder"
    }
}

pub fn run_script(script: &ReplayScript, settings: EngineSettings) -> Result<ReplayReport> {
    let mut grid = script.build_grid();
    let visuals = RecordingVisuals::shared();
    let history = Rc::new(RefCell::new(FieldOrderHistory::new()));
    let recorder = Rc::new(RefCell::new(MoveRecorder::default()));

    let mut engine = FieldReorderEngine::new(settings, visuals).with_history(history.clone());
    engine.subscribe(recorder.clone());

    info!("Replaying {} steps over {} fields", script.steps.len(), grid.field_count());

    let mut now = Instant::now();
    let mut traces = Vec::with_capacity(script.steps.len());

    for step in &script.steps {
        let mut ticks = 0;
        let consumed = match step {
            ReplayStep::Down { x, secondary } => {
                let hit = grid.header_hit(*x).map(|mut hit| {
                    hit.secondary_button = *secondary;
                    hit
                });
                let selection = grid.selected().to_vec();
                let event = PointerEvent::Down { x: *x, hit };
                match engine.handle_pointer(event, &mut grid, &selection, now) {
                    EventDisposition::Consumed => true,
                    EventDisposition::Ignored => {
                        handle_press(&mut grid, *x, ClickMode::Replace) == EventDisposition::Consumed
                    }
                }
            }
            ReplayStep::Move { x } => {
                let selection = grid.selected().to_vec();
                let event = PointerEvent::Move { x: *x };
                engine.handle_pointer(event, &mut grid, &selection, now) == EventDisposition::Consumed
            }
            ReplayStep::Up | ReplayStep::Cancel => {
                let selection = grid.selected().to_vec();
                let event = if *step == ReplayStep::Up {
                    PointerEvent::Up
                } else {
                    PointerEvent::Cancel
                };
                engine.handle_pointer(event, &mut grid, &selection, now) == EventDisposition::Consumed
            }
            ReplayStep::Wait { ms } => {
                let until = now + Duration::from_millis(*ms);
                while let Some(deadline) = engine.next_deadline().filter(|d| *d <= until) {
                    now = deadline;
                    if engine.on_timer(&mut grid, now) {
                        ticks += 1;
                    }
                }
                now = until;
                ticks > 0
            }
            ReplayStep::Undo => history.borrow_mut().undo(&mut grid).is_some(),
            ReplayStep::Redo => history.borrow_mut().redo(&mut grid).is_some(),
            ReplayStep::Select { indices } => {
                grid.set_selection(indices.clone());
                true
            }
        };

        let trace = StepTrace {
            step: step.label(),
            consumed,
            placeholder: engine.session().map(|s| s.placeholder_index()),
            scroll_offset: grid.scroll_offset(),
            ticks,
        };
        debug!("Replay step {:?}", trace);
        traces.push(trace);
    }

    // A script that ends mid-drag is abandoned, not committed
    engine.cancel();

    let recorder = recorder.borrow();
    let history = history.borrow();
    Ok(ReplayReport {
        final_order: grid.field_names(),
        selection: grid.selected().to_vec(),
        scroll_offset: grid.scroll_offset(),
        moves: recorder.moves.clone(),
        drags_ended: recorder.drags_ended,
        undo_depth: history.undo_depth(),
        redo_depth: history.redo_depth(),
        steps: traces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let json = r#"{
            "fields": [{"name": "A", "width": 10}, {"name": "B", "width": 10}],
            "viewport_width": 20,
            "steps": [
                {"action": "down", "x": 15},
                {"action": "wait", "ms": 50},
                {"action": "up"}
            ]
        }"#;
        let script: ReplayScript = serde_json::from_str(json).unwrap();
        assert_eq!(script.zoom_ratio, 1.0);
        assert_eq!(script.steps[0], ReplayStep::Down { x: 15.0, secondary: false });
        assert_eq!(script.steps[1], ReplayStep::Wait { ms: 50 });
    }

    #[test]
    fn test_ignored_press_selects_field() {
        let script = ReplayScript {
            fields: vec![Field::new("Id", 100.0), Field::new("A", 100.0)],
            viewport_width: 200.0,
            fixed_count: 1,
            zoom_ratio: 1.0,
            leading_field_locked: false,
            selection: vec![],
            steps: vec![ReplayStep::Down { x: 50.0, secondary: false }],
        };
        let report = run_script(&script, EngineSettings::default()).unwrap();
        assert!(report.steps[0].consumed);
        assert_eq!(report.selection, vec![0]);
        assert!(report.moves.is_empty());
    }
}
