//! Diya Player - hosts a Diya scene in a native window
//!
//! The window stands in for the container: its client area is the drawable
//! region, its redraw requests are the frame scheduler.

mod player_app;
mod window_host;

pub use player_app::PlayerApp;
pub use window_host::{WindowContainer, WindowHost, WindowScheduler};
