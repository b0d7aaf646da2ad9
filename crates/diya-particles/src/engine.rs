//! The burst engine: spawns, simulates and retires bursts

use crate::burst::{Burst, BurstId};
use crate::config::BurstConfig;
use diya_core::{PointCloudHost, PointStyle, RandomSource, Vec3};
use log::{debug, warn};

/// Owns every live burst. Nothing outside the engine keeps a burst across
/// frames; the scene graph only sees the point-cloud node each burst mirrors.
pub struct BurstEngine {
    config: BurstConfig,
    bursts: Vec<Burst>,
    rng: Box<dyn RandomSource>,
    next_id: u64,
}

impl BurstEngine {
    pub fn new(config: BurstConfig, rng: Box<dyn RandomSource>) -> Self {
        let capacity = config.max_live_bursts;
        Self {
            config,
            bursts: Vec::with_capacity(capacity),
            rng,
            next_id: 1,
        }
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    pub fn live_count(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_full(&self) -> bool {
        self.bursts.len() >= self.config.max_live_bursts
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn get(&self, id: BurstId) -> Option<&Burst> {
        self.bursts.iter().find(|b| b.id() == id)
    }

    /// Spawn a burst at `origin` and attach its point cloud to `host`.
    ///
    /// Returns `None` without allocating anything when the live cap is reached.
    pub fn spawn(&mut self, origin: Vec3, host: &mut dyn PointCloudHost) -> Option<BurstId> {
        if self.is_full() {
            warn!(
                "[particles] burst cap of {} reached, spawn ignored",
                self.config.max_live_bursts
            );
            return None;
        }

        let (speed_min, speed_max) = (self.config.speed_min, self.config.speed_max);
        let velocities: Vec<Vec3> = (0..self.config.particle_count)
            .map(|_| {
                let direction = self.rng.unit_direction();
                direction * self.rng.range(speed_min, speed_max)
            })
            .collect();
        let lifetime = self
            .rng
            .range(self.config.lifetime_min, self.config.lifetime_max);

        let style = PointStyle {
            size: self.config.point_size,
            color: self.config.color,
            opacity: 1.0,
        };
        let positions = vec![origin; velocities.len()];
        let node = host.attach_points(&positions, style);

        let id = BurstId(self.next_id);
        self.next_id += 1;
        self.bursts
            .push(Burst::new(id, node, origin, velocities, lifetime));

        debug!(
            "[particles] spawned {:?} at ({:.2}, {:.2}, {:.2}), lifetime {:.2}s",
            id, origin.x, origin.y, origin.z, lifetime
        );
        Some(id)
    }

    /// Advance every burst by `dt` seconds and retire the expired ones.
    ///
    /// `dt` is expected to be clamped by the caller; negative steps are treated
    /// as zero. Returns the number of bursts retired in this pass.
    pub fn update(&mut self, dt: f32, host: &mut dyn PointCloudHost) -> usize {
        let dt = dt.max(0.0);
        let gravity = self.config.gravity;
        let mut retired = 0;

        // Reverse traversal: swap_remove only moves in an already-visited entry
        for i in (0..self.bursts.len()).rev() {
            let burst = &mut self.bursts[i];
            burst.step(dt, gravity);

            if burst.is_alive() {
                host.update_points(burst.node(), burst.positions(), burst.opacity());
            } else {
                let expired = self.bursts.swap_remove(i);
                host.release_points(expired.node());
                debug!(
                    "[particles] retired {:?} at age {:.2}s",
                    expired.id(),
                    expired.age()
                );
                retired += 1;
            }
        }

        retired
    }

    /// Release every live burst. Returns how many were released.
    pub fn clear(&mut self, host: &mut dyn PointCloudHost) -> usize {
        let count = self.bursts.len();
        for burst in self.bursts.drain(..) {
            host.release_points(burst.node());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diya_core::{NodeId, XorShiftRng};
    use std::collections::HashMap;

    /// Point-cloud host that records every call
    #[derive(Default)]
    struct RecordingHost {
        next: u64,
        attached: HashMap<NodeId, Vec<Vec3>>,
        opacity: HashMap<NodeId, f32>,
        releases: HashMap<NodeId, u32>,
        updates_after_release: u32,
    }

    impl PointCloudHost for RecordingHost {
        fn attach_points(&mut self, positions: &[Vec3], style: PointStyle) -> NodeId {
            self.next += 1;
            let node = NodeId::from_raw(self.next);
            self.attached.insert(node, positions.to_vec());
            self.opacity.insert(node, style.opacity);
            node
        }

        fn update_points(&mut self, node: NodeId, positions: &[Vec3], opacity: f32) {
            if self.releases.contains_key(&node) {
                self.updates_after_release += 1;
            }
            self.attached.insert(node, positions.to_vec());
            self.opacity.insert(node, opacity);
        }

        fn release_points(&mut self, node: NodeId) {
            *self.releases.entry(node).or_default() += 1;
            self.attached.remove(&node);
        }
    }

    fn engine(config: BurstConfig, seed: u32) -> BurstEngine {
        BurstEngine::new(config, Box::new(XorShiftRng::new(seed)))
    }

    fn fixed_lifetime(lifetime: f32) -> BurstConfig {
        BurstConfig {
            lifetime_min: lifetime,
            lifetime_max: lifetime,
            ..Default::default()
        }
    }

    #[test]
    fn spawn_initializes_burst() {
        let mut host = RecordingHost::default();
        let mut engine = engine(BurstConfig::default(), 1);
        let origin = Vec3::new(0.5, 1.0, -0.25);

        let id = engine.spawn(origin, &mut host).unwrap();
        let burst = engine.get(id).unwrap();

        assert_eq!(burst.len(), 200);
        assert_eq!(burst.age(), 0.0);
        assert!((1.8..3.2).contains(&burst.lifetime()));
        for p in burst.particles() {
            assert_eq!(p.position, origin);
            let speed = p.velocity.length();
            assert!(speed >= 1.2 - 1e-4 && speed < 2.7 + 1e-4, "speed {speed}");
        }
        assert_eq!(host.attached.len(), 1);
        assert_eq!(host.attached[&burst.node()].len(), 200);
    }

    #[test]
    fn gravity_scenario_one_second() {
        let mut host = RecordingHost::default();
        let mut engine = engine(fixed_lifetime(5.0), 11);
        let id = engine.spawn(Vec3::ZERO, &mut host).unwrap();
        let before: Vec<Vec3> = engine.get(id).unwrap().velocities().to_vec();

        engine.update(1.0, &mut host);

        let after = engine.get(id).unwrap().velocities();
        for (v0, v1) in before.iter().zip(after) {
            assert!((v0.y - v1.y - 1.6).abs() < 1e-5);
            assert_eq!(v0.x, v1.x);
            assert_eq!(v0.z, v1.z);
        }
    }

    #[test]
    fn position_uses_start_of_step_velocity() {
        let mut host = RecordingHost::default();
        let mut engine = engine(fixed_lifetime(5.0), 5);
        let origin = Vec3::new(0.0, 2.0, 0.0);
        let id = engine.spawn(origin, &mut host).unwrap();
        let v0: Vec<Vec3> = engine.get(id).unwrap().velocities().to_vec();

        let dt = 0.25;
        engine.update(dt, &mut host);

        let burst = engine.get(id).unwrap();
        for (p, v) in burst.particles().zip(&v0) {
            assert!((p.position.y - (origin.y + v.y * dt)).abs() < 1e-5);
            assert!((p.velocity.y - (v.y - 1.6 * dt)).abs() < 1e-5);
        }
    }

    #[test]
    fn age_is_monotonic() {
        let mut host = RecordingHost::default();
        let mut engine = engine(fixed_lifetime(100.0), 3);
        let id = engine.spawn(Vec3::ZERO, &mut host).unwrap();

        let mut expected = 0.0f32;
        for dt in [0.0, 0.016, 0.05, 0.0, 0.033, 0.001] {
            let before = engine.get(id).unwrap().age();
            engine.update(dt, &mut host);
            let after = engine.get(id).unwrap().age();
            expected += dt;
            assert!(after >= before);
            assert!((after - (before + dt)).abs() < 1e-6);
            assert!((after - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn negative_dt_does_not_rewind() {
        let mut host = RecordingHost::default();
        let mut engine = engine(fixed_lifetime(2.0), 3);
        let id = engine.spawn(Vec3::ZERO, &mut host).unwrap();
        engine.update(0.5, &mut host);
        engine.update(-1.0, &mut host);
        assert_eq!(engine.get(id).unwrap().age(), 0.5);
    }

    #[test]
    fn opacity_and_expiry_boundary() {
        let mut host = RecordingHost::default();
        let mut engine = engine(fixed_lifetime(2.0), 9);
        let id = engine.spawn(Vec3::ZERO, &mut host).unwrap();
        let node = engine.get(id).unwrap().node();

        engine.update(1.0, &mut host);
        assert_eq!(engine.get(id).unwrap().opacity(), 0.5);
        assert_eq!(host.opacity[&node], 0.5);

        engine.update(1.0, &mut host);
        let burst = engine.get(id).expect("still alive at age == lifetime");
        assert_eq!(burst.opacity(), 0.0);

        assert_eq!(engine.update(0.01, &mut host), 1);
        assert!(engine.get(id).is_none());
        assert_eq!(host.releases[&node], 1);
    }

    #[test]
    fn expired_bursts_released_exactly_once() {
        let mut host = RecordingHost::default();
        let mut engine = engine(BurstConfig::default(), 21);
        for i in 0..10 {
            engine.spawn(Vec3::new(i as f32, 0.0, 0.0), &mut host);
        }
        assert_eq!(engine.live_count(), 10);

        // 4 seconds in 0.05s steps exceeds every lifetime in [1.8, 3.2)
        for _ in 0..80 {
            engine.update(0.05, &mut host);
        }

        assert_eq!(engine.live_count(), 0);
        assert_eq!(host.releases.len(), 10);
        assert!(host.releases.values().all(|&n| n == 1));
        assert_eq!(host.updates_after_release, 0);
        assert!(host.attached.is_empty());
    }

    #[test]
    fn removal_mid_pass_skips_nothing() {
        let mut host = RecordingHost::default();
        let mut engine = engine(BurstConfig::default(), 8);

        // Interleave short and long lived bursts
        for i in 0..6 {
            engine.config.lifetime_min = if i % 2 == 0 { 0.1 } else { 10.0 };
            engine.config.lifetime_max = engine.config.lifetime_min;
            engine.spawn(Vec3::ZERO, &mut host);
        }

        assert_eq!(engine.update(0.2, &mut host), 3);
        assert_eq!(engine.live_count(), 3);
        for burst in engine.bursts() {
            // Survivors were each stepped exactly once
            assert!((burst.age() - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn cap_refuses_extra_spawns() {
        let mut host = RecordingHost::default();
        let config = BurstConfig {
            max_live_bursts: 2,
            ..Default::default()
        };
        let mut engine = engine(config, 4);
        assert!(engine.spawn(Vec3::ZERO, &mut host).is_some());
        assert!(engine.spawn(Vec3::ZERO, &mut host).is_some());
        assert!(engine.spawn(Vec3::ZERO, &mut host).is_none());
        assert_eq!(engine.live_count(), 2);
        assert_eq!(host.attached.len(), 2);
    }

    #[test]
    fn clear_releases_all() {
        let mut host = RecordingHost::default();
        let mut engine = engine(BurstConfig::default(), 6);
        engine.spawn(Vec3::ZERO, &mut host);
        engine.spawn(Vec3::UP, &mut host);

        assert_eq!(engine.clear(&mut host), 2);
        assert_eq!(engine.live_count(), 0);
        assert!(host.releases.values().all(|&n| n == 1));
        assert_eq!(engine.clear(&mut host), 0);
    }
}
