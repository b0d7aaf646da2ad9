//! RenderSurface backed by a winit window and wgpu

use crate::camera::Camera;
use crate::context::{RenderContext, RenderError};
use crate::scene_graph::SceneGraph;
use crate::scene_renderer::SceneRenderer;
use crate::surface::RenderSurface;
use std::sync::Arc;
use winit::window::Window;

struct GpuState {
    context: RenderContext,
    renderer: SceneRenderer,
}

/// A window's swapchain plus the renderer drawing into it
pub struct WindowSurface {
    window: Arc<Window>,
    gpu: Option<GpuState>,
    size: (u32, u32),
}

impl WindowSurface {
    /// Create the GPU context for `window` at a physical size. Blocks until the
    /// adapter and device are ready.
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, RenderError> {
        let context = pollster::block_on(RenderContext::new(window.clone(), width, height))?;
        let renderer = SceneRenderer::new(&context.device, context.format());
        let size = context.size();

        Ok(Self {
            window,
            gpu: Some(GpuState { context, renderer }),
            size,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl RenderSurface for WindowSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(width, height);
            self.size = (width, height);
        }
    }

    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<(), RenderError> {
        let gpu = self.gpu.as_mut().ok_or(RenderError::Released)?;
        let GpuState { context, renderer } = gpu;

        renderer.prepare(&context.device, &context.queue, scene, camera);

        let output = match context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                context.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(RenderError::SurfaceError(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Diya Render Encoder"),
            });
        renderer.render(&mut encoder, &view, &context.depth_view);

        context.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut gpu) = self.gpu.take() {
            gpu.renderer.clear();
            log::info!("Window surface released");
        }
    }

    fn is_released(&self) -> bool {
        self.gpu.is_none()
    }
}
