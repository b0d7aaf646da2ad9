//! What a scene needs from the environment hosting it

use diya_core::{ClientRect, Result};
use diya_render::RenderSurface;
use diya_runtime::{Clock, FrameScheduler};

/// The drawable region a scene renders into
pub trait Container {
    /// Layout size in client (logical) pixels
    fn client_size(&self) -> (f64, f64);

    /// Physical pixels per client pixel
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// On-screen rectangle in the same coordinates as pointer events
    fn bounding_rect(&self) -> ClientRect;

    /// Show a pointer cursor while hovering the region
    fn set_pointer_cursor(&mut self, _enabled: bool) {}
}

/// The environment a scene is created in: container lookup, output surfaces,
/// frame scheduling, and wall time.
pub trait SceneHost {
    fn find_container(&mut self, id: &str) -> Option<Box<dyn Container>>;

    /// Create an output surface for `container` at a physical size
    fn create_surface(
        &mut self,
        container: &dyn Container,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn RenderSurface>>;

    fn frame_scheduler(&mut self) -> Box<dyn FrameScheduler>;

    fn clock(&self) -> Box<dyn Clock>;
}

/// Physical surface size for a container, with the pixel ratio capped at `max_pixel_ratio`
pub fn surface_size(container: &dyn Container, max_pixel_ratio: f64) -> (u32, u32) {
    let (width, height) = container.client_size();
    let ratio = container.device_pixel_ratio().min(max_pixel_ratio).max(0.0);
    // `as` saturates: negative and NaN sizes become zero
    ((width * ratio).round() as u32, (height * ratio).round() as u32)
}
