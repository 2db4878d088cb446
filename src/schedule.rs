use std::time::{Duration, Instant};

/// A fixed-interval timer polled from the main loop.
#[derive(Clone, Debug)]
pub struct Periodic {
    interval: Duration,
    last: Option<Instant>,
}

impl Periodic {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// True on the first poll, then once per elapsed interval.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Make the next poll fire immediately.
    pub fn trigger(&mut self) {
        self.last = None;
    }
}
