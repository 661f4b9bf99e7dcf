// Replay scripts under demos/scripts

use field_reorder::replay::{run_script, ReplayScript};
use field_reorder::reorder::session::EngineSettings;
use std::path::PathBuf;

fn script(name: &str) -> ReplayScript {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "demos", "scripts", name]
        .iter()
        .collect();
    ReplayScript::from_path(&path).unwrap()
}

#[test]
fn test_e2e_script() {
    let report = run_script(&script("e2e.json"), EngineSettings::default()).unwrap();

    assert_eq!(report.final_order, vec!["A", "C", "D", "B"]);
    assert_eq!(report.selection, vec![3]);
    assert_eq!(report.moves.len(), 1);
    assert_eq!(report.drags_ended, 1);
    assert_eq!(report.undo_depth, 1);
    assert_eq!(report.redo_depth, 0);
    assert_eq!(report.steps[2].placeholder, Some(4));
    assert!(report.steps.iter().all(|s| s.step != "undo" || s.consumed));
}

#[test]
fn test_block_drag_script() {
    let report = run_script(&script("block_drag.json"), EngineSettings::default()).unwrap();

    assert_eq!(
        report.final_order,
        vec!["A", "D", "E", "F", "G", "B", "C", "H"]
    );
    assert_eq!(report.selection, vec![5, 6]);
    assert_eq!(report.moves[0].field_names, vec!["B", "C"]);
}

#[test]
fn test_autoscroll_script() {
    let report = run_script(&script("autoscroll.json"), EngineSettings::default()).unwrap();

    // One immediate tick on entering the zone, five more within 500ms
    assert_eq!(report.steps[1].scroll_offset, 1);
    assert_eq!(report.steps[2].ticks, 5);
    assert_eq!(report.steps[2].scroll_offset, 6);
    assert_eq!(report.steps[2].placeholder, Some(9));

    assert_eq!(report.final_order[8], "F1");
    assert_eq!(report.final_order[1], "F2");
    assert_eq!(report.moves[0].to, 8);
}

#[test]
fn test_disabled_reordering_only_selects() {
    let settings = EngineSettings {
        fields_reorderable: false,
        ..EngineSettings::default()
    };
    let report = run_script(&script("e2e.json"), settings).unwrap();

    assert_eq!(report.final_order, vec!["A", "B", "C", "D"]);
    assert_eq!(report.selection, vec![1]);
    assert!(report.moves.is_empty());
    assert!(!report.steps[1].consumed);
}

#[test]
fn test_missing_script_is_an_error() {
    assert!(ReplayScript::from_path("/definitely/not/here.json").is_err());
}
