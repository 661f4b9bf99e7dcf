// Undo/redo of committed drags

use field_reorder::data::field_grid::FieldGrid;
use field_reorder::history::{FieldOrderHistory, HistoryAction};
use field_reorder::reorder::session::{EngineSettings, FieldReorderEngine, PointerEvent};
use field_reorder::reorder::visuals::RecordingVisuals;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn drag(engine: &mut FieldReorderEngine, grid: &mut FieldGrid, from_x: f64, to_x: f64, now: Instant) {
    let selection = grid.selected().to_vec();
    let hit = grid.header_hit(from_x);
    engine.handle_pointer(PointerEvent::Down { x: from_x, hit }, grid, &selection, now);
    engine.handle_pointer(PointerEvent::Move { x: to_x }, grid, &selection, now);
    engine.handle_pointer(PointerEvent::Up, grid, &selection, now);
}

fn setup() -> (FieldReorderEngine, FieldGrid, Rc<RefCell<FieldOrderHistory>>) {
    let grid = FieldGrid::with_uniform_width(&["A", "B", "C", "D", "E"], 100.0, 500.0);
    let history = Rc::new(RefCell::new(FieldOrderHistory::new()));
    let engine = FieldReorderEngine::new(EngineSettings::default(), RecordingVisuals::shared())
        .with_history(history.clone());
    (engine, grid, history)
}

#[test]
fn test_undo_and_redo_committed_drag() {
    let (mut engine, mut grid, history) = setup();
    drag(&mut engine, &mut grid, 150.0, 350.0, Instant::now());
    assert_eq!(grid.field_names(), vec!["A", "C", "D", "B", "E"]);
    assert_eq!(history.borrow().undo_depth(), 1);

    let inverse = history.borrow_mut().undo(&mut grid).unwrap();
    assert_eq!((inverse.from, inverse.to), (3, 1));
    assert_eq!(grid.field_names(), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(grid.selected(), &[1]);

    history.borrow_mut().redo(&mut grid).unwrap();
    assert_eq!(grid.field_names(), vec!["A", "C", "D", "B", "E"]);
    assert_eq!(grid.selected(), &[3]);
}

#[test]
fn test_noop_drop_is_not_recorded() {
    let (mut engine, mut grid, history) = setup();
    drag(&mut engine, &mut grid, 150.0, 160.0, Instant::now());
    assert!(!history.borrow().can_undo());
}

#[test]
fn test_undo_block_move_in_sequence() {
    let (mut engine, mut grid, history) = setup();
    let start = Instant::now();

    grid.set_selection(vec![0, 1]);
    drag(&mut engine, &mut grid, 50.0, 450.0, start);
    assert_eq!(grid.field_names(), vec!["C", "D", "E", "A", "B"]);

    drag(&mut engine, &mut grid, 250.0, 50.0, start + Duration::from_millis(300));
    assert_eq!(grid.field_names(), vec!["E", "C", "D", "A", "B"]);
    assert_eq!(history.borrow().undo_depth(), 2);

    let mut history = history.borrow_mut();
    history.undo(&mut grid).unwrap();
    assert_eq!(grid.field_names(), vec!["C", "D", "E", "A", "B"]);
    history.undo(&mut grid).unwrap();
    assert_eq!(grid.field_names(), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(grid.selected(), &[0, 1]);
    assert!(history.undo(&mut grid).is_none());
    assert_eq!(history.redo_depth(), 2);
}

#[test]
fn test_on_change_sees_applied_moves() {
    let (mut engine, mut grid, history) = setup();
    let seen: Rc<RefCell<Vec<(HistoryAction, usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    history
        .borrow_mut()
        .set_on_change(move |action, applied| sink.borrow_mut().push((action, applied.from, applied.to)));

    drag(&mut engine, &mut grid, 150.0, 350.0, Instant::now());
    history.borrow_mut().undo(&mut grid);
    history.borrow_mut().redo(&mut grid);

    assert_eq!(
        *seen.borrow(),
        vec![(HistoryAction::Undo, 3, 1), (HistoryAction::Redo, 1, 3)]
    );
}
