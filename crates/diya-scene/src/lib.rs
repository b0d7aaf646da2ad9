//! Diya Scene - The lamp scene as a unit a host can embed
//!
//! `create_scene` looks up a container through a [`SceneHost`], builds the
//! fixture, and returns a [`SceneHandle`]. The host delivers display ticks to
//! [`SceneHandle::tick`], forwards clicks to [`SceneHandle::pointer_click`],
//! polls [`SceneHandle::poll_auto_spawn`], and finally calls
//! [`SceneHandle::dispose`].

mod config;
mod handle;
mod host;

pub use config::{AutoSpawnConfig, FrameConfig, SceneConfig};
pub use handle::{create_scene, SceneHandle};
pub use host::{surface_size, Container, SceneHost};
