//! Wall clocks and the per-tick frame clock

use instant::Instant;
use std::cell::Cell;
use std::rc::Rc;

/// A source of monotonic wall time in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Real time measured from the moment the clock was created
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Tracks the last tick timestamp and turns wall time into simulation steps
pub struct FrameClock {
    /// Largest step handed to the simulation, in seconds
    pub max_dt: f64,
    start: f64,
    last: f64,
    /// Unclamped elapsed time measured by the last `advance`
    raw_delta: f64,
}

impl FrameClock {
    pub fn new(now: f64, max_dt: f64) -> Self {
        Self {
            max_dt,
            start: now,
            last: now,
            raw_delta: 0.0,
        }
    }

    /// Record a tick at `now` and return the step to simulate.
    ///
    /// The step is `min(max_dt, now - last)`; a clock that went backwards
    /// yields zero.
    pub fn advance(&mut self, now: f64) -> f32 {
        self.raw_delta = now - self.last;
        self.last = now;
        self.raw_delta.clamp(0.0, self.max_dt) as f32
    }

    /// Seconds since the clock started
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.start).max(0.0)
    }

    pub fn last_timestamp(&self) -> f64 {
        self.last
    }

    pub fn raw_delta(&self) -> f64 {
        self.raw_delta
    }
}
