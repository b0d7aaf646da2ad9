//! Scene creation and the handle that drives a live scene

use crate::config::SceneConfig;
use crate::host::{surface_size, Container, SceneHost};
use diya_core::{DiyaError, RandomSource, Result, Vec3, XorShiftRng};
use diya_particles::{BurstEngine, BurstId};
use diya_render::{Camera, RenderSurface, SceneFixture, SceneGraph};
use diya_runtime::{client_to_ndc, AutoSpawnTimer, Clock, FrameClock, FrameLoop, LoopState};
use log::{debug, info, warn};

/// Depth in normalized device coordinates that clicks are unprojected at
const CLICK_NDC_DEPTH: f32 = 0.5;

/// Build a lamp scene inside the container named `container_id`.
///
/// The container is looked up before anything else is allocated, so a missing
/// container leaves nothing behind.
pub fn create_scene(
    host: &mut dyn SceneHost,
    container_id: &str,
    config: SceneConfig,
) -> Result<SceneHandle> {
    config.validate()?;

    let mut container = host
        .find_container(container_id)
        .ok_or_else(|| DiyaError::ContainerNotFound(container_id.to_string()))?;

    let mut rng = match config.seed {
        Some(seed) => XorShiftRng::new(seed),
        None => XorShiftRng::from_time(),
    };

    let (width, height) = surface_size(container.as_ref(), config.max_pixel_ratio);
    let surface = host.create_surface(container.as_ref(), width, height)?;

    let mut graph = SceneGraph::new();
    let fixture = SceneFixture::build(&mut graph, config.sparkles_count, &mut rng);

    let mut camera = Camera::new();
    camera.set_viewport(width, height);

    if config.fireworks_on_click {
        container.set_pointer_cursor(true);
    }

    let engine = BurstEngine::new(config.fireworks.clone(), Box::new(rng.fork()));

    let clock = host.clock();
    let now = clock.now();
    let frame_clock = FrameClock::new(now, config.frame.max_dt);

    let auto_timer = if config.auto_fireworks {
        let mut timer = AutoSpawnTimer::new(
            config.auto_spawn.interval_min_ms / 1000.0,
            config.auto_spawn.interval_max_ms / 1000.0,
            Box::new(rng.fork()),
        );
        timer.arm(now);
        Some(timer)
    } else {
        None
    };

    let frame_loop = FrameLoop::start(host.frame_scheduler());

    info!(
        "Scene created in '{}' ({}x{}, click={}, auto={})",
        container_id, width, height, config.fireworks_on_click, config.auto_fireworks
    );

    Ok(SceneHandle {
        container_id: container_id.to_string(),
        config,
        container,
        surface,
        graph,
        camera,
        fixture,
        engine,
        clock,
        frame_clock,
        frame_loop,
        auto_timer,
        rng: Box::new(rng),
    })
}

/// A live scene. Dropping the handle without calling [`SceneHandle::dispose`]
/// releases it as well.
pub struct SceneHandle {
    container_id: String,
    config: SceneConfig,
    container: Box<dyn Container>,
    surface: Box<dyn RenderSurface>,
    graph: SceneGraph,
    camera: Camera,
    fixture: SceneFixture,
    engine: BurstEngine,
    clock: Box<dyn Clock>,
    frame_clock: FrameClock,
    frame_loop: FrameLoop,
    auto_timer: Option<AutoSpawnTimer>,
    /// Placement of auto-spawned bursts
    rng: Box<dyn RandomSource>,
}

impl SceneHandle {
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.frame_loop.state()
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Completed ticks
    pub fn ticks(&self) -> u64 {
        self.frame_loop.ticks()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn RenderSurface {
        self.surface.as_mut()
    }

    pub fn fixture(&self) -> &SceneFixture {
        &self.fixture
    }

    pub fn engine(&self) -> &BurstEngine {
        &self.engine
    }

    /// Run one display tick: simulate, fit the surface, render, and schedule
    /// the next tick. Returns false, doing nothing, once the scene is disposed.
    pub fn tick(&mut self) -> bool {
        if !self.frame_loop.begin_tick() {
            return false;
        }

        let now = self.clock.now();
        let dt = self.frame_clock.advance(now);

        self.fixture
            .animate(&mut self.graph, self.frame_clock.elapsed(now));

        let retired = self.engine.update(dt, &mut self.graph);
        if retired > 0 {
            debug!("{} bursts expired, {} live", retired, self.engine.live_count());
        }

        self.fit_surface();

        if let Err(e) = self.surface.render(&self.graph, &self.camera) {
            warn!("Render failed: {}", e);
        }

        self.frame_loop.finish_tick();
        true
    }

    /// Resize the surface and camera to the container if they disagree.
    /// Zero-area containers are left alone.
    fn fit_surface(&mut self) {
        let (width, height) = surface_size(self.container.as_ref(), self.config.max_pixel_ratio);
        if width == 0 || height == 0 {
            return;
        }
        if self.surface.size() != (width, height) {
            debug!("Resizing surface to {}x{}", width, height);
            self.surface.resize(width, height);
            self.camera.set_viewport(width, height);
        }
    }

    /// Spawn a burst at `position`. Returns `None` after disposal or when the
    /// live-burst cap is reached.
    pub fn spawn_firework(&mut self, position: Vec3) -> Option<BurstId> {
        if !self.frame_loop.is_running() {
            return None;
        }
        self.engine.spawn(position, &mut self.graph)
    }

    /// Handle a click at client coordinates. Spawns a burst at the clicked
    /// point, half-way into the depth range, when click spawning is enabled.
    pub fn pointer_click(&mut self, client_x: f64, client_y: f64) -> Option<BurstId> {
        if !self.frame_loop.is_running() || !self.config.fireworks_on_click {
            return None;
        }

        let rect = self.container.bounding_rect();
        let [x, y] = client_to_ndc(&rect, client_x, client_y)?;
        let world = self.camera.unproject([x, y, CLICK_NDC_DEPTH]);
        self.spawn_firework(world)
    }

    /// Fire the auto-spawn timer if it is due
    pub fn poll_auto_spawn(&mut self) -> Option<BurstId> {
        if !self.frame_loop.is_running() {
            return None;
        }
        let now = self.clock.now();
        let timer = self.auto_timer.as_mut()?;
        if !timer.poll(now) {
            return None;
        }

        let lo = self.config.auto_spawn.box_min();
        let hi = self.config.auto_spawn.box_max();
        let position = Vec3::new(
            self.rng.range(lo.x, hi.x),
            self.rng.range(lo.y, hi.y),
            self.rng.range(lo.z, hi.z),
        );
        self.spawn_firework(position)
    }

    /// When the auto-spawn timer next wants polling, in clock seconds
    pub fn next_auto_spawn(&self) -> Option<f64> {
        self.auto_timer.as_ref().and_then(AutoSpawnTimer::deadline)
    }

    /// Tear the scene down: stop ticking, cancel the auto-spawn timer, release
    /// every live burst, and release the surface. Returns false if the scene
    /// was already disposed.
    pub fn dispose(&mut self) -> bool {
        if !self.frame_loop.stop() {
            return false;
        }

        if let Some(timer) = &mut self.auto_timer {
            timer.cancel();
        }
        let released = self.engine.clear(&mut self.graph);
        self.surface.release();
        if self.config.fireworks_on_click {
            self.container.set_pointer_cursor(false);
        }

        info!(
            "Scene in '{}' disposed ({} live bursts released)",
            self.container_id, released
        );
        true
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
