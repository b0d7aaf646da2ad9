//! SceneHost implementation backed by a single winit window

use diya_core::{ClientRect, DiyaError, Result};
use diya_render::{RenderSurface, WindowSurface};
use diya_runtime::{Clock, FrameScheduler, SystemClock};
use diya_scene::{Container, SceneHost};
use std::sync::Arc;
use winit::window::{CursorIcon, Window};

/// The window's client area as a scene container
pub struct WindowContainer {
    window: Arc<Window>,
}

impl WindowContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl Container for WindowContainer {
    fn client_size(&self) -> (f64, f64) {
        let size = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        (size.width, size.height)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn bounding_rect(&self) -> ClientRect {
        let (width, height) = self.client_size();
        ClientRect::new(0.0, 0.0, width, height)
    }

    fn set_pointer_cursor(&mut self, enabled: bool) {
        let icon = if enabled {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        self.window.set_cursor(icon);
    }
}

/// Schedules ticks as window redraws
pub struct WindowScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

/// A host with one container, the window, registered under `container_id`
pub struct WindowHost {
    window: Arc<Window>,
    container_id: String,
}

impl WindowHost {
    pub fn new(window: Arc<Window>, container_id: impl Into<String>) -> Self {
        Self {
            window,
            container_id: container_id.into(),
        }
    }
}

impl SceneHost for WindowHost {
    fn find_container(&mut self, id: &str) -> Option<Box<dyn Container>> {
        if id == self.container_id {
            Some(Box::new(WindowContainer::new(self.window.clone())))
        } else {
            None
        }
    }

    fn create_surface(
        &mut self,
        _container: &dyn Container,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn RenderSurface>> {
        let surface =
            WindowSurface::new(self.window.clone(), width, height).map_err(DiyaError::from)?;
        Ok(Box::new(surface))
    }

    fn frame_scheduler(&mut self) -> Box<dyn FrameScheduler> {
        Box::new(WindowScheduler {
            window: self.window.clone(),
        })
    }

    fn clock(&self) -> Box<dyn Clock> {
        Box::new(SystemClock::new())
    }
}
