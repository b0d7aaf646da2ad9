//! Frame loop state machine
//!
//! The loop is `Running` from construction until `stop`, after which it is
//! `Disposed` for good. Every tick is bracketed by `begin_tick` and
//! `finish_tick`; the next frame is requested only from `finish_tick`, and
//! only while running, so at most one frame request is ever outstanding.

/// Host primitive that delivers a tick before the next display refresh
pub trait FrameScheduler {
    /// Ask for one more tick
    fn request_frame(&mut self);

    /// Drop any outstanding request. Hosts that cannot retract a request may
    /// ignore this; a tick delivered after `stop` is a no-op anyway.
    fn cancel(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Disposed,
}

pub struct FrameLoop {
    state: LoopState,
    scheduler: Box<dyn FrameScheduler>,
    pending: bool,
    ticks: u64,
}

impl FrameLoop {
    /// Enter `Running` and request the first frame
    pub fn start(mut scheduler: Box<dyn FrameScheduler>) -> Self {
        scheduler.request_frame();
        Self {
            state: LoopState::Running,
            scheduler,
            pending: true,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Completed ticks so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether a frame request is outstanding
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Called when the host delivers a tick. Returns false if the tick must
    /// be ignored because the loop has been disposed.
    pub fn begin_tick(&mut self) -> bool {
        self.pending = false;
        self.is_running()
    }

    /// Close out a tick and schedule the next one
    pub fn finish_tick(&mut self) {
        if !self.is_running() {
            return;
        }
        self.ticks += 1;
        if !self.pending {
            self.scheduler.request_frame();
            self.pending = true;
        }
    }

    /// Transition to `Disposed`. Returns false if already disposed.
    pub fn stop(&mut self) -> bool {
        if self.state == LoopState::Disposed {
            return false;
        }
        self.state = LoopState::Disposed;
        if self.pending {
            self.scheduler.cancel();
            self.pending = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct CountingScheduler {
        requests: Rc<Cell<u32>>,
        cancels: Rc<Cell<u32>>,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.requests.set(self.requests.get() + 1);
        }

        fn cancel(&mut self) {
            self.cancels.set(self.cancels.get() + 1);
        }
    }

    #[test]
    fn start_requests_first_frame() {
        let sched = CountingScheduler::default();
        let frame_loop = FrameLoop::start(Box::new(sched.clone()));
        assert_eq!(frame_loop.state(), LoopState::Running);
        assert!(frame_loop.is_pending());
        assert_eq!(sched.requests.get(), 1);
    }

    #[test]
    fn each_tick_schedules_exactly_one_more() {
        let sched = CountingScheduler::default();
        let mut frame_loop = FrameLoop::start(Box::new(sched.clone()));
        for _ in 0..5 {
            assert!(frame_loop.begin_tick());
            frame_loop.finish_tick();
        }
        assert_eq!(frame_loop.ticks(), 5);
        assert_eq!(sched.requests.get(), 6);
    }

    #[test]
    fn finishing_twice_stays_single_flight() {
        let sched = CountingScheduler::default();
        let mut frame_loop = FrameLoop::start(Box::new(sched.clone()));
        frame_loop.begin_tick();
        frame_loop.finish_tick();
        frame_loop.finish_tick();
        assert_eq!(sched.requests.get(), 2);
    }

    #[test]
    fn stop_is_terminal_and_idempotent() {
        let sched = CountingScheduler::default();
        let mut frame_loop = FrameLoop::start(Box::new(sched.clone()));

        assert!(frame_loop.stop());
        assert!(!frame_loop.stop());
        assert_eq!(frame_loop.state(), LoopState::Disposed);
        assert_eq!(sched.cancels.get(), 1);

        // A tick that was already queued when we stopped
        assert!(!frame_loop.begin_tick());
        frame_loop.finish_tick();
        assert_eq!(sched.requests.get(), 1);
        assert_eq!(frame_loop.ticks(), 0);
    }
}
