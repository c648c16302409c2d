use std::time::Instant;

/// Source of timestamps for channel state changes.
///
/// Only the ordering matters to the allocator; units are up to the clock.
pub trait Clock {
    fn now(&mut self) -> u64;
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&mut self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Counts up by one on every read.
///
/// Each state change gets its own timestamp, so allocation is fully
/// deterministic - handy for tests and offline rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `tick` (the next read returns `tick + 1`).
    pub fn starting_at(tick: u64) -> Self {
        Self { tick }
    }
}

impl Clock for TickClock {
    fn now(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}
