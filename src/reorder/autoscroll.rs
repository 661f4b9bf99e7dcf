/// AutoscrollController - edge-triggered viewport shifting during a drag
///
/// While the pointer sits within `edge_threshold` pixels of a viewport edge
/// the controller shifts the viewport one field at a time. The delay between
/// shifts shrinks by `step` per tick down to `min_delay`, so holding the
/// pointer at the edge accelerates scrolling. Only one direction can be
/// scrolling at a time.
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::reorder::placeholder::{DragDirection, PlaceholderBounds};
use crate::reorder::position::ViewportSnapshot;
use crate::reorder::timer::{CancellableTimer, TimerToken};
use crate::reorder::traits::{GridViewport, ScrollDirection};

/// Decaying delay between autoscroll ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollDelaySchedule {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub step: Duration,
}

impl Default for ScrollDelaySchedule {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(30),
            max_delay: Duration::from_millis(100),
            step: Duration::from_millis(5),
        }
    }
}

impl ScrollDelaySchedule {
    /// `max(min_delay, max_delay - attempt * step)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.max_delay
            .saturating_sub(self.step.saturating_mul(attempt))
            .max(self.min_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoscrollState {
    Idle,
    Scrolling {
        direction: ScrollDirection,
        attempt_count: u32,
    },
}

/// Result of one viewport shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoscrollTick {
    pub direction: ScrollDirection,
    /// Placeholder index for the field now at the trailing/leading edge
    pub placeholder: usize,
    /// Delay before the next tick
    pub next_delay: Duration,
}

impl AutoscrollTick {
    pub fn drag_direction(&self) -> DragDirection {
        match self.direction {
            ScrollDirection::Left => DragDirection::Left,
            ScrollDirection::Right => DragDirection::Right,
        }
    }
}

pub struct AutoscrollController {
    schedule: ScrollDelaySchedule,
    edge_threshold: f64,
    state: AutoscrollState,
    timer: CancellableTimer,
}

impl AutoscrollController {
    pub fn new(schedule: ScrollDelaySchedule, edge_threshold: f64) -> Self {
        Self {
            schedule,
            edge_threshold,
            state: AutoscrollState::Idle,
            timer: CancellableTimer::new(),
        }
    }

    pub fn state(&self) -> AutoscrollState {
        self.state
    }

    pub fn schedule(&self) -> &ScrollDelaySchedule {
        &self.schedule
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self.state, AutoscrollState::Scrolling { .. })
    }

    pub fn is_scrolling_towards(&self, direction: ScrollDirection) -> bool {
        matches!(self.state, AutoscrollState::Scrolling { direction: d, .. } if d == direction)
    }

    pub fn attempt_count(&self) -> u32 {
        match self.state {
            AutoscrollState::Scrolling { attempt_count, .. } => attempt_count,
            AutoscrollState::Idle => 0,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Which edge zone, if any, the pointer is in
    pub fn edge_zone(&self, pointer_x: f64, snapshot: &ViewportSnapshot) -> Option<ScrollDirection> {
        let min_x = 0.0;
        let max_x = snapshot.final_boundary();

        let in_left = pointer_x < min_x + self.edge_threshold;
        let in_right = pointer_x > max_x - self.edge_threshold;

        match (in_left, in_right) {
            (true, true) => {
                // Narrow viewports overlap both zones; keep whatever is running
                if self.is_scrolling_towards(ScrollDirection::Right) {
                    Some(ScrollDirection::Right)
                } else {
                    Some(ScrollDirection::Left)
                }
            }
            (true, false) => Some(ScrollDirection::Left),
            (false, true) => Some(ScrollDirection::Right),
            (false, false) => None,
        }
    }

    /// React to a pointer move. Entering a zone starts scrolling with an
    /// immediate tick; leaving the active zone returns to idle.
    pub fn evaluate(
        &mut self,
        pointer_x: f64,
        snapshot: &ViewportSnapshot,
        owner: u64,
        grid: &mut dyn GridViewport,
        bounds: PlaceholderBounds,
        now: Instant,
    ) -> Option<AutoscrollTick> {
        match self.edge_zone(pointer_x, snapshot) {
            Some(direction) if self.is_scrolling_towards(direction) => None,
            Some(direction) => {
                self.stop();
                debug!(target: "autoscroll", "Entering {} edge zone at x={}", direction.display_name(), pointer_x);
                self.state = AutoscrollState::Scrolling {
                    direction,
                    attempt_count: 0,
                };
                self.tick(grid, bounds, owner, now)
            }
            None => {
                if self.is_scrolling() {
                    debug!(target: "autoscroll", "Pointer left edge zone at x={}", pointer_x);
                    self.stop();
                }
                None
            }
        }
    }

    /// Shift the viewport once and schedule the next tick. Stops without
    /// rescheduling when the scroll bound on that side is exhausted.
    pub fn tick(
        &mut self,
        grid: &mut dyn GridViewport,
        bounds: PlaceholderBounds,
        owner: u64,
        now: Instant,
    ) -> Option<AutoscrollTick> {
        let AutoscrollState::Scrolling {
            direction,
            attempt_count,
        } = self.state
        else {
            return None;
        };

        let offset = grid.scroll_offset();
        let can_scroll = match direction {
            ScrollDirection::Left => offset > 0,
            ScrollDirection::Right => offset < grid.max_scroll_offset(),
        };
        if !can_scroll {
            debug!(target: "autoscroll",
                "Scroll bound reached scrolling {} (offset={}), going idle",
                direction.display_name(), offset
            );
            self.state = AutoscrollState::Idle;
            self.timer.cancel();
            return None;
        }

        grid.scroll_by(direction);
        let snapshot = ViewportSnapshot::capture(grid);

        let placeholder = match direction {
            ScrollDirection::Right => snapshot
                .visible_bounds()
                .map(|(_, last)| last + 1)
                .unwrap_or(snapshot.field_count),
            ScrollDirection::Left => snapshot
                .first_scrollable_field()
                .unwrap_or(bounds.lower),
        };
        let placeholder = bounds.clamp(placeholder.min(snapshot.field_count));

        let next_delay = self.schedule.delay_for(attempt_count);
        self.state = AutoscrollState::Scrolling {
            direction,
            attempt_count: attempt_count + 1,
        };
        self.timer.start(owner, now, next_delay);

        trace!(target: "autoscroll",
            "Tick {} #{}: offset {} -> {}, placeholder={}, next in {:?}",
            direction.display_name(), attempt_count, offset, snapshot.scroll_offset, placeholder, next_delay
        );

        Some(AutoscrollTick {
            direction,
            placeholder,
            next_delay,
        })
    }

    /// Consume a due timer firing, if any
    pub fn take_due(&mut self, now: Instant) -> Option<TimerToken> {
        self.timer.take_due(now)
    }

    /// Cancel any pending tick and return to idle
    pub fn stop(&mut self) {
        if self.timer.cancel().is_some() {
            trace!(target: "autoscroll", "Cancelled pending autoscroll tick");
        }
        self.state = AutoscrollState::Idle;
    }
}
