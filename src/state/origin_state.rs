use std::time::{Duration, Instant};

/// Dispatch bookkeeping for one pacing scope (an origin, or the whole run)
///
/// Slots are reserved, not observed: `reserve` hands out the next free
/// instant and pushes the following slot one interval further, so
/// concurrent callers are spaced out without anyone holding a lock while
/// they wait.
#[derive(Debug, Clone, Default)]
pub struct OriginState {
    /// Number of dispatches granted in this scope
    pub dispatch_count: u64,

    /// Earliest instant the next dispatch may start
    pub next_slot: Option<Instant>,
}

impl OriginState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next dispatch slot at or after `now`
    ///
    /// Returns the instant the caller may proceed at.
    pub fn reserve(&mut self, now: Instant, interval: Duration) -> Instant {
        let slot = match self.next_slot {
            Some(next) if next > now => next,
            _ => now,
        };

        self.next_slot = Some(slot + interval);
        self.dispatch_count += 1;
        slot
    }
}
