use std::time::{Duration, Instant};

/// Identifies one scheduled firing and the drag session it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    pub id: u64,
    pub owner: u64,
}

/// A single-slot cancellable timer driven by the host's clock.
///
/// Nothing runs in the background: the host asks for `deadline()` (to size
/// its poll timeout) and calls `take_due(now)` when that time arrives.
/// Starting a new firing replaces the pending one.
#[derive(Debug, Default)]
pub struct CancellableTimer {
    next_id: u64,
    pending: Option<(TimerToken, Instant)>,
}

impl CancellableTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a firing `delay` after `now` on behalf of `owner`
    pub fn start(&mut self, owner: u64, now: Instant, delay: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken {
            id: self.next_id,
            owner,
        };
        self.pending = Some((token, now + delay));
        token
    }

    /// Cancel the pending firing, returning its token if there was one
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take().map(|(token, _)| token)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }

    /// Time left before the pending firing, zero if it is overdue
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Consume the pending firing if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<TimerToken> {
        match self.pending {
            Some((token, deadline)) if deadline <= now => {
                self.pending = None;
                Some(token)
            }
            _ => None,
        }
    }
}
