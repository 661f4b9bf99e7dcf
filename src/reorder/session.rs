//! Drag session lifecycle and the engine that coordinates it
//!
//! `FieldReorderEngine` owns at most one `DragSession`. A press on a movable
//! header arms a session and drops straight into `Dragging`; every pointer
//! move re-resolves the placeholder and re-evaluates autoscroll; release
//! hands the placeholder to the `CommitResolver`. Outward notifications are
//! sent only after the grid has been mutated and reselected.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::reorder::autoscroll::{AutoscrollController, AutoscrollState, AutoscrollTick, ScrollDelaySchedule};
use crate::reorder::commit::{CommitResolver, CommitResult};
use crate::reorder::placeholder::{placeholder_x, DragDirection, PlaceholderBounds, PlaceholderTracker};
use crate::reorder::position::{PositionResolver, ViewportSnapshot};
use crate::reorder::selection::{dragged_range, normalize_selection, DraggedRange};
use crate::reorder::traits::{DragVisuals, GridViewport, MoveHistory, ReorderListener, SelectionSource};
use crate::reorder::visuals::SessionVisuals;

/// Tunables for the engine, usually built from `config::DragConfig`
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub fields_reorderable: bool,
    /// Distance in screen pixels from a viewport edge that triggers autoscroll
    pub edge_threshold: f64,
    pub placeholder_line_width: f64,
    /// Re-arming is refused for this long after a commit
    pub commit_cooldown: Duration,
    pub autoscroll: ScrollDelaySchedule,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fields_reorderable: true,
            edge_threshold: 20.0,
            placeholder_line_width: 2.0,
            commit_cooldown: Duration::from_millis(200),
            autoscroll: ScrollDelaySchedule::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
    Committing,
}

/// What the host found under the pointer on press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderHit {
    pub field_index: usize,
    pub is_header: bool,
    pub is_movable: bool,
    pub secondary_button: bool,
}

impl HeaderHit {
    /// Primary-button press on a movable header cell
    pub fn header(field_index: usize) -> Self {
        Self {
            field_index,
            is_header: true,
            is_movable: true,
            secondary_button: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, hit: Option<HeaderHit> },
    Move { x: f64 },
    Up,
    Cancel,
}

/// Whether the engine handled an event or the host should pass it on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    Ignored,
}

/// Why a press did not start a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmRefusal {
    ReorderingDisabled,
    NotHeader,
    SecondaryButton,
    NotMovable,
    FixedField,
    ReorderBlocked,
    LeadingFieldLocked,
    CoolingDown,
    OutOfRange,
}

impl fmt::Display for ArmRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ReorderingDisabled => "field reordering is disabled",
            Self::NotHeader => "press was not on a header cell",
            Self::SecondaryButton => "secondary button press",
            Self::NotMovable => "field is not movable",
            Self::FixedField => "field is pinned",
            Self::ReorderBlocked => "grid blocks reordering",
            Self::LeadingFieldLocked => "leading field must stay first",
            Self::CoolingDown => "too soon after the last drop",
            Self::OutOfRange => "field index out of range",
        };
        write!(f, "{}", reason)
    }
}

/// State of one gesture, from press to release or cancel
pub struct DragSession {
    id: u64,
    phase: DragPhase,
    range: DraggedRange,
    pointer_offset: f64,
    pointer_x: f64,
    placeholder: PlaceholderTracker,
    visuals: SessionVisuals,
    selection: Vec<usize>,
}

impl DragSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn dragged_range(&self) -> DraggedRange {
        self.range
    }

    /// Distance from the block's left edge to the press point, fixed at arm
    pub fn pointer_offset(&self) -> f64 {
        self.pointer_offset
    }

    pub fn pointer_x(&self) -> f64 {
        self.pointer_x
    }

    pub fn placeholder_index(&self) -> usize {
        self.placeholder.index()
    }

    pub fn drag_direction(&self) -> DragDirection {
        self.placeholder.direction()
    }

    /// Selection as it was when the session armed
    pub fn frozen_selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn ghost_x(&self) -> Option<f64> {
        self.visuals.ghost_x()
    }

    fn redraw_placeholder(&mut self, snapshot: &ViewportSnapshot, line_width: f64) {
        let index = self.placeholder.index();
        match placeholder_x(index, snapshot, line_width) {
            Some(x) => self.visuals.place_placeholder(index, x),
            None => trace!(target: "reorder", "No span for placeholder {}, keeping last draw", index),
        }
    }
}

pub struct FieldReorderEngine {
    settings: EngineSettings,
    renderer: Rc<RefCell<dyn DragVisuals>>,
    history: Option<Rc<RefCell<dyn MoveHistory>>>,
    listeners: Vec<Rc<RefCell<dyn ReorderListener>>>,
    session: Option<DragSession>,
    autoscroll: AutoscrollController,
    next_session_id: u64,
    last_commit: Option<Instant>,
}

impl FieldReorderEngine {
    pub fn new(settings: EngineSettings, renderer: Rc<RefCell<dyn DragVisuals>>) -> Self {
        let autoscroll = AutoscrollController::new(settings.autoscroll, settings.edge_threshold);
        Self {
            settings,
            renderer,
            history: None,
            listeners: Vec::new(),
            session: None,
            autoscroll,
            next_session_id: 0,
            last_commit: None,
        }
    }

    pub fn with_history(mut self, history: Rc<RefCell<dyn MoveHistory>>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn subscribe(&mut self, listener: Rc<RefCell<dyn ReorderListener>>) {
        info!(target: "reorder", "Adding reorder listener: {}", listener.borrow().name());
        self.listeners.push(listener);
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn autoscroll_state(&self) -> AutoscrollState {
        self.autoscroll.state()
    }

    /// When the host should next call `on_timer`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.autoscroll.deadline()
    }

    /// Route one pointer event. `Ignored` means the host should offer the
    /// event to its next handler.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        grid: &mut dyn GridViewport,
        selection: &dyn SelectionSource,
        now: Instant,
    ) -> EventDisposition {
        match event {
            PointerEvent::Down { x, hit } => match self.arm(x, hit, grid, selection, now) {
                Ok(()) => EventDisposition::Consumed,
                Err(refusal) => {
                    debug!(target: "reorder", "Not arming: {}", refusal);
                    EventDisposition::Ignored
                }
            },
            PointerEvent::Move { x } if self.is_dragging() => {
                self.update_pointer(x, grid, now);
                EventDisposition::Consumed
            }
            PointerEvent::Up if self.is_dragging() => {
                self.commit(grid, now);
                EventDisposition::Consumed
            }
            PointerEvent::Cancel if self.is_dragging() => {
                self.cancel();
                EventDisposition::Consumed
            }
            _ => EventDisposition::Ignored,
        }
    }

    /// Start a session for a press at `pointer_x`.
    ///
    /// A refused press returns its refusal and leaves a running session
    /// untouched. Only a press that passes every check cancels the previous
    /// drag before arming the new one.
    pub fn arm(
        &mut self,
        pointer_x: f64,
        hit: Option<HeaderHit>,
        grid: &mut dyn GridViewport,
        selection: &dyn SelectionSource,
        now: Instant,
    ) -> Result<(), ArmRefusal> {
        if !self.settings.fields_reorderable {
            return Err(ArmRefusal::ReorderingDisabled);
        }
        let hit = match hit {
            Some(hit) if hit.is_header => hit,
            _ => return Err(ArmRefusal::NotHeader),
        };
        if hit.secondary_button {
            return Err(ArmRefusal::SecondaryButton);
        }
        if !hit.is_movable {
            return Err(ArmRefusal::NotMovable);
        }
        if let Some(last) = self.last_commit {
            if now.saturating_duration_since(last) < self.settings.commit_cooldown {
                return Err(ArmRefusal::CoolingDown);
            }
        }
        if grid.reorder_blocked() {
            return Err(ArmRefusal::ReorderBlocked);
        }

        let field = hit.field_index;
        let field_count = grid.field_count();
        let fixed = grid.fixed_field_count();
        if field >= field_count {
            return Err(ArmRefusal::OutOfRange);
        }
        if field < fixed {
            return Err(ArmRefusal::FixedField);
        }

        let frozen = normalize_selection(&selection.selection());
        if grid.leading_field_locked() && (field == 0 || frozen.first() == Some(&0)) {
            return Err(ArmRefusal::LeadingFieldLocked);
        }

        if self.session.is_some() {
            debug!(target: "reorder", "New press while dragging, cancelling previous session");
            self.cancel();
        }

        let mut range = dragged_range(&frozen, field);
        if range.start_index < fixed || range.end_index() >= field_count {
            debug!(target: "reorder",
                "Range {:?} crosses pinned region or grid end, dragging field {} alone",
                range, field
            );
            range = DraggedRange::single(field);
        }

        let snapshot = ViewportSnapshot::capture(grid);
        let zoom = snapshot.zoom_ratio;
        let width_of = |idx: usize| grid.field_width(idx).unwrap_or(0.0);

        // Left edge of the block, measured back from the pressed field so a
        // block starting off screen still gets a consistent offset
        let block_left = match snapshot.span_for(field) {
            Some(span) => {
                let leading: f64 = (range.start_index..field).map(width_of).sum();
                (span.left - leading) * zoom
            }
            None => pointer_x,
        };
        let ghost_width: f64 = (range.start_index..=range.end_index()).map(width_of).sum::<f64>() * zoom;

        self.next_session_id += 1;
        let id = self.next_session_id;
        let mut session = DragSession {
            id,
            phase: DragPhase::Armed,
            range,
            pointer_offset: pointer_x - block_left,
            pointer_x,
            placeholder: PlaceholderTracker::new(&range),
            visuals: SessionVisuals::new(self.renderer.clone(), ghost_width),
            selection: frozen,
        };
        debug!(target: "reorder",
            "Armed session {} on field {}: range {:?}, pointer offset {:.1}",
            id, field, range, session.pointer_offset
        );

        session.phase = DragPhase::Dragging;
        self.session = Some(session);
        self.update_pointer(pointer_x, grid, now);
        Ok(())
    }

    /// Track the pointer during a drag
    pub fn update_pointer(&mut self, pointer_x: f64, grid: &mut dyn GridViewport, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.pointer_x = pointer_x;
        session.visuals.move_ghost(pointer_x - session.pointer_offset);

        let snapshot = ViewportSnapshot::capture(grid);
        let bounds = PlaceholderBounds::for_grid(grid);

        if let Some(tick) = self.autoscroll.evaluate(pointer_x, &snapshot, session.id, grid, bounds, now) {
            Self::apply_tick(session, tick, grid, bounds, self.settings.placeholder_line_width);
            return;
        }
        if self.autoscroll.is_scrolling() {
            return;
        }

        let Some(pointer_field) = PositionResolver::resolve(pointer_x, &snapshot) else {
            trace!(target: "reorder", "Skipping update at x={}: unresolved", pointer_x);
            return;
        };
        let before = session.placeholder.index();
        let range = session.range;
        let index = session
            .placeholder
            .update(pointer_field, &range, bounds, snapshot.visible_bounds());
        if index != before {
            trace!(target: "reorder",
                "Placeholder {} -> {} (pointer field {}, {:?})",
                before, index, pointer_field, session.placeholder.direction()
            );
        }
        session.redraw_placeholder(&snapshot, self.settings.placeholder_line_width);
    }

    /// Fire a due autoscroll tick. Returns true when the viewport shifted.
    pub fn on_timer(&mut self, grid: &mut dyn GridViewport, now: Instant) -> bool {
        let Some(token) = self.autoscroll.take_due(now) else {
            return false;
        };

        let session = match self.session.as_mut() {
            Some(session) if session.id == token.owner && session.phase == DragPhase::Dragging => session,
            _ => {
                trace!(target: "autoscroll", "Dropping tick {} for ended session {}", token.id, token.owner);
                self.autoscroll.stop();
                return false;
            }
        };

        let bounds = PlaceholderBounds::for_grid(grid);
        match self.autoscroll.tick(grid, bounds, session.id, now) {
            Some(tick) => {
                Self::apply_tick(session, tick, grid, bounds, self.settings.placeholder_line_width);
                true
            }
            None => false,
        }
    }

    fn apply_tick(
        session: &mut DragSession,
        tick: AutoscrollTick,
        grid: &dyn GridViewport,
        bounds: PlaceholderBounds,
        line_width: f64,
    ) {
        session
            .placeholder
            .force(tick.placeholder, tick.drag_direction(), bounds);
        let snapshot = ViewportSnapshot::capture(grid);
        session.redraw_placeholder(&snapshot, line_width);
    }

    /// Abandon the gesture without moving anything
    pub fn cancel(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.autoscroll.stop();
        debug!(target: "reorder", "Cancelled session {}", session.id);
        drop(session);

        for listener in &self.listeners {
            listener.borrow_mut().on_drag_ended();
        }
    }

    /// Finish the gesture. Returns the applied move, or `None` for a no-op
    /// drop or when no session is running.
    pub fn commit(&mut self, grid: &mut dyn GridViewport, now: Instant) -> Option<CommitResult> {
        let mut session = self.session.take()?;
        session.phase = DragPhase::Committing;
        self.autoscroll.stop();

        let range = session.range;
        let placeholder = session.placeholder.index();
        let target = session.placeholder.drop_target(&range);
        let bounds = PlaceholderBounds::for_grid(grid);

        debug!(target: "reorder",
            "Committing session {}: range {:?}, placeholder {}, target {}",
            session.id, range, placeholder, target
        );

        let result = CommitResolver::new(bounds.lower).commit(&range, target, grid);
        drop(session);
        self.last_commit = Some(now);

        for listener in &self.listeners {
            listener.borrow_mut().on_drag_ended();
        }

        if let Some(result) = &result {
            if let Some(history) = &self.history {
                history.borrow_mut().record(&result.description);
            }
            for listener in &self.listeners {
                let mut listener = listener.borrow_mut();
                listener.on_fields_reordered(&result.description);
                listener.persist_field_order(&result.description);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field_grid::FieldGrid;
    use crate::reorder::commit::RefreshKind;
    use crate::reorder::traits::ScrollDirection;
    use crate::reorder::visuals::RecordingVisuals;

    fn engine() -> (FieldReorderEngine, Rc<RefCell<RecordingVisuals>>) {
        let visuals = RecordingVisuals::shared();
        let engine = FieldReorderEngine::new(EngineSettings::default(), visuals.clone());
        (engine, visuals)
    }

    fn grid(names: &[&str]) -> FieldGrid {
        FieldGrid::with_uniform_width(names, 100.0, 100.0 * names.len() as f64)
    }

    #[test]
    fn test_drag_right_past_last_field() {
        let (mut engine, _) = engine();
        let mut grid = grid(&["A", "B", "C", "D"]);
        let now = Instant::now();
        let selection: Vec<usize> = vec![];

        engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, now).unwrap();
        assert_eq!(engine.session().unwrap().phase(), DragPhase::Dragging);
        assert_eq!(engine.session().unwrap().pointer_offset(), 50.0);

        engine.update_pointer(350.0, &mut grid, now);
        assert_eq!(engine.session().unwrap().placeholder_index(), 4);

        let result = engine.commit(&mut grid, now).unwrap();
        assert_eq!(result.description.to, 3);
        assert_eq!(result.refresh, RefreshKind::Lightweight);
        assert_eq!(grid.field_names(), vec!["A", "C", "D", "B"]);
        assert_eq!(grid.selected(), &[3]);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_refusals() {
        let (mut engine, _) = engine();
        let mut grid = grid(&["A", "B", "C"]);
        grid.pin_leading(1);
        let now = Instant::now();
        let selection: Vec<usize> = vec![];

        assert_eq!(
            engine.arm(50.0, Some(HeaderHit::header(0)), &mut grid, &selection, now),
            Err(ArmRefusal::FixedField)
        );
        assert_eq!(
            engine.arm(50.0, None, &mut grid, &selection, now),
            Err(ArmRefusal::NotHeader)
        );
        let mut secondary = HeaderHit::header(1);
        secondary.secondary_button = true;
        assert_eq!(
            engine.arm(150.0, Some(secondary), &mut grid, &selection, now),
            Err(ArmRefusal::SecondaryButton)
        );
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_leading_field_lock() {
        let (mut engine, _) = engine();
        let mut grid = grid(&["Row", "B", "C"]);
        grid.set_leading_field_locked(true);
        let now = Instant::now();

        let selection: Vec<usize> = vec![0, 1];
        assert_eq!(
            engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, now),
            Err(ArmRefusal::LeadingFieldLocked)
        );

        let selection: Vec<usize> = vec![];
        engine.arm(250.0, Some(HeaderHit::header(2)), &mut grid, &selection, now).unwrap();
        engine.update_pointer(10.0, &mut grid, now);
        assert_eq!(engine.session().unwrap().placeholder_index(), 1);
    }

    #[test]
    fn test_cooldown_after_commit() {
        let (mut engine, _) = engine();
        let mut grid = grid(&["A", "B", "C"]);
        let now = Instant::now();
        let selection: Vec<usize> = vec![];

        engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, now).unwrap();
        assert!(engine.commit(&mut grid, now).is_none());

        let soon = now + Duration::from_millis(50);
        assert_eq!(
            engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, soon),
            Err(ArmRefusal::CoolingDown)
        );
        let later = now + Duration::from_millis(250);
        assert!(engine
            .arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, later)
            .is_ok());
    }

    #[test]
    fn test_cancel_hides_visuals_without_moving() {
        let (mut engine, visuals) = engine();
        let mut grid = grid(&["A", "B", "C", "D"]);
        let now = Instant::now();
        let selection: Vec<usize> = vec![];

        engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, now).unwrap();
        engine.update_pointer(350.0, &mut grid, now);
        assert!(visuals.borrow().ghost.is_some());

        engine.cancel();
        assert!(visuals.borrow().ghost.is_none());
        assert!(visuals.borrow().placeholder.is_none());
        assert_eq!(grid.field_names(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_stale_tick_after_cancel_is_dropped() {
        let (mut engine, _) = engine();
        let names: Vec<String> = (0..10).map(|i| format!("F{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let mut grid = FieldGrid::with_uniform_width(&refs, 100.0, 300.0);
        let now = Instant::now();
        let selection: Vec<usize> = vec![];

        engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, now).unwrap();
        engine.update_pointer(295.0, &mut grid, now);
        assert!(matches!(
            engine.autoscroll_state(),
            AutoscrollState::Scrolling { direction: ScrollDirection::Right, .. }
        ));
        assert_eq!(grid.scroll_offset(), 1);

        engine.cancel();
        assert_eq!(engine.next_deadline(), None);
        assert!(!engine.on_timer(&mut grid, now + Duration::from_secs(1)));
        assert_eq!(grid.scroll_offset(), 1);
    }

    #[test]
    fn test_refused_press_keeps_running_drag() {
        let (mut engine, visuals) = engine();
        let mut grid = grid(&["A", "B", "C", "D"]);
        grid.pin_leading(1);
        let now = Instant::now();
        let selection: Vec<usize> = vec![];

        engine.arm(250.0, Some(HeaderHit::header(2)), &mut grid, &selection, now).unwrap();
        engine.update_pointer(350.0, &mut grid, now);
        let first = engine.session().unwrap().id();

        assert_eq!(
            engine.arm(50.0, Some(HeaderHit::header(0)), &mut grid, &selection, now),
            Err(ArmRefusal::FixedField)
        );
        let session = engine.session().unwrap();
        assert_eq!(session.id(), first);
        assert_eq!(session.placeholder_index(), 4);
        assert!(visuals.borrow().ghost.is_some());

        engine.arm(150.0, Some(HeaderHit::header(1)), &mut grid, &selection, now).unwrap();
        assert_ne!(engine.session().unwrap().id(), first);
        assert_eq!(engine.session().unwrap().dragged_range().start_index, 1);
    }
}
