//! Player application implementing winit ApplicationHandler

use crate::window_host::WindowHost;
use diya_core::{RandomSource, Vec3, XorShiftRng};
use diya_runtime::{PointerButton, PointerState};
use diya_scene::{create_scene, SceneConfig, SceneHandle};
use log::{error, info};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

pub struct PlayerApp {
    config: SceneConfig,
    container_id: String,
    window: Option<Arc<Window>>,
    scene: Option<SceneHandle>,
    pointer: PointerState,
    /// Placement of keyboard-triggered bursts
    rng: XorShiftRng,
}

impl PlayerApp {
    pub fn new(config: SceneConfig, container_id: impl Into<String>) -> Self {
        let rng = match config.seed {
            Some(seed) => XorShiftRng::new(seed ^ 0x5EED),
            None => XorShiftRng::from_time(),
        };
        Self {
            config,
            container_id: container_id.into(),
            window: None,
            scene: None,
            pointer: PointerState::new(),
            rng,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title("Diya")
            .with_transparent(true)
            .with_inner_size(LogicalSize::new(960.0, 540.0));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let mut host = WindowHost::new(window, self.container_id.clone());
        match create_scene(&mut host, &self.container_id, self.config.clone()) {
            Ok(scene) => self.scene = Some(scene),
            Err(e) => {
                error!("Failed to create scene: {}", e);
                event_loop.exit();
            }
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scene) = &mut self.scene {
            scene.dispose();
        }
        event_loop.exit();
    }

    /// Spawn a burst somewhere in the auto-spawn box
    fn spawn_random(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };
        let lo = self.config.auto_spawn.box_min();
        let hi = self.config.auto_spawn.box_max();
        let position = Vec3::new(
            self.rng.range(lo.x, hi.x),
            self.rng.range(lo.y, hi.y),
            self.rng.range(lo.z, hi.z),
        );
        if scene.spawn_firework(position).is_none() {
            info!("Burst limit reached, spawn ignored");
        }
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }
}

impl ApplicationHandler for PlayerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.initialize(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => self.shutdown(event_loop),
                    PhysicalKey::Code(KeyCode::Space | KeyCode::KeyF) => self.spawn_random(),
                    _ => {}
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                // Pointer coordinates are logical, like the container's rect
                let scale = self.scale_factor();
                self.pointer.process_move(position.x / scale, position.y / scale);
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer.process_leave();
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => self.pointer.process_button_down(button),
                    ElementState::Released => self.pointer.process_button_up(button),
                }

                if let Some(scene) = &mut self.scene {
                    for (x, y) in self.pointer.drain_clicks() {
                        scene.pointer_click(x, y);
                    }
                }
            }

            WindowEvent::Resized(_) => {
                // The next tick fits the surface to the new size
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(scene) = &mut self.scene {
                    scene.tick();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(scene) = &mut self.scene {
            scene.poll_auto_spawn();
        }
    }
}
