//! Cancellable delayed actions on the session clock.
//!
//! Every deferred step of the navigation engine (debounce unlocks, auto-advance, modal delays,
//! batch yields) is scheduled here and identified by a [`TimerToken`], so a superseding event can
//! cancel exactly the action it invalidates.

use crate::foundation::core::Millis;

/// Handle to one scheduled action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Debug)]
struct Scheduled<A> {
    token: TimerToken,
    due_ms: Millis,
    action: A,
}

/// Ordered queue of pending actions. Ties on the due time fire in scheduling order.
#[derive(Clone, Debug)]
pub struct TimerQueue<A> {
    next_token: u64,
    pending: Vec<Scheduled<A>>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            next_token: 1,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, now: Millis, delay_ms: Millis, action: A) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        let due_ms = now.saturating_add(delay_ms);
        let at = self
            .pending
            .partition_point(|s| (s.due_ms, s.token) <= (due_ms, token));
        self.pending.insert(
            at,
            Scheduled {
                token,
                due_ms,
                action,
            },
        );
        token
    }

    /// Returns `false` when the token already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.token != token);
        self.pending.len() != before
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.pending.first().map(|s| s.due_ms)
    }

    /// Remove and return the earliest action due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(TimerToken, A)> {
        if self.pending.first()?.due_ms > now {
            return None;
        }
        let s = self.pending.remove(0);
        Some((s.token, s.action))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timer.rs"]
mod tests;
