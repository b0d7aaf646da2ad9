//! Output surface abstraction

use crate::camera::Camera;
use crate::context::RenderError;
use crate::scene_graph::SceneGraph;

/// Something the scene can be drawn into.
///
/// The window-backed implementation is [`crate::WindowSurface`]; tests supply
/// recording fakes.
pub trait RenderSurface {
    /// Current drawable size in physical pixels
    fn size(&self) -> (u32, u32);

    /// Resize the drawable. Zero-area sizes are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<(), RenderError>;

    /// Drop all GPU resources. Calling it again does nothing.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}
