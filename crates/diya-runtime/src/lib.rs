//! Diya Runtime - Frame loop infrastructure
//!
//! Provides the building blocks the scene driver is assembled from:
//! - `Clock` / `FrameClock` - wall time and clamped per-tick deltas
//! - `FrameLoop` - Running/Disposed state machine with single-flight scheduling
//! - `AutoSpawnTimer` - self-rescheduling timer with a jittered interval
//! - `PointerState` / `client_to_ndc` - pointer tracking and click mapping

mod clock;
mod frame_loop;
mod input;
mod timer;

pub use clock::{Clock, FrameClock, ManualClock, SystemClock};
pub use frame_loop::{FrameLoop, FrameScheduler, LoopState};
pub use input::{client_to_ndc, PointerButton, PointerState};
pub use timer::AutoSpawnTimer;
