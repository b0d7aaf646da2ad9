//! Self-rescheduling auto-spawn timer
//!
//! Every firing draws a fresh interval, measured from the moment the firing
//! was observed, the way a chain of one-shot timeouts behaves. A host that
//! stalls therefore gets one late firing, never a burst of catch-up firings.

use diya_core::RandomSource;

pub struct AutoSpawnTimer {
    /// Interval bounds in seconds
    min_interval: f64,
    max_interval: f64,
    deadline: Option<f64>,
    rng: Box<dyn RandomSource>,
    fired: u64,
}

impl AutoSpawnTimer {
    /// Create a disarmed timer with intervals drawn from `[min_interval, max_interval)` seconds
    pub fn new(min_interval: f64, max_interval: f64, rng: Box<dyn RandomSource>) -> Self {
        Self {
            min_interval,
            max_interval,
            deadline: None,
            rng,
            fired: 0,
        }
    }

    fn next_interval(&mut self) -> f64 {
        let t = self.rng.next_f32() as f64;
        self.min_interval + t * (self.max_interval - self.min_interval)
    }

    /// Schedule the first firing relative to `now`
    pub fn arm(&mut self, now: f64) {
        let interval = self.next_interval();
        self.deadline = Some(now + interval);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Total firings so far
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Fire if the deadline has passed, rescheduling from `now`.
    /// A disarmed timer never fires.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.fired += 1;
                let interval = self.next_interval();
                self.deadline = Some(now + interval);
                true
            }
            _ => false,
        }
    }

    /// Disarm. Returns true only for the call that actually cancelled.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
