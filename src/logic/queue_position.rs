//! Head and tail counters of one session. All queue position writes go through here.

use crate::models::QueueCounters;
use std::ops::Range;

/// Owns the session's two monotonic counters.
///
/// `head` is where the next promoted team re-enters; `tail` is the position handed to the
/// next check-in. Neither ever decreases, and `head <= tail` always holds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QueuePositionAllocator {
    head: i64,
    tail: i64,
}

impl QueuePositionAllocator {
    /// Counters of a freshly started session: both at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counters(counters: QueueCounters) -> Self {
        Self {
            head: counters.head,
            tail: counters.tail,
        }
    }

    /// Value to persist after the cycle.
    pub fn counters(&self) -> QueueCounters {
        QueueCounters {
            head: self.head,
            tail: self.tail,
        }
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn tail(&self) -> i64 {
        self.tail
    }

    /// Hand out `n` consecutive positions at the tail.
    pub fn reserve_tail(&mut self, n: usize) -> Range<i64> {
        let start = self.tail;
        self.tail += n as i64;
        start..self.tail
    }

    /// Reserve `n` positions starting at the head for a returning team.
    ///
    /// Every queued position at or after the head must be shifted back by `n` in the store,
    /// so the tail moves with them. The head itself is not moved; see `advance_head`.
    pub fn reserve_at_head(&mut self, n: usize) -> Range<i64> {
        self.tail += n as i64;
        self.head..self.head + n as i64
    }

    pub fn advance_head(&mut self, n: usize) {
        self.head += n as i64;
    }
}
