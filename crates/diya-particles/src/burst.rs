//! Burst state: one firework's particles, age and lifetime

use diya_core::{NodeId, Vec3};
use std::fmt;

/// Identifies a burst for as long as it is alive
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BurstId(pub(crate) u64);

impl BurstId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BurstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BurstId({})", self.0)
    }
}

/// A single point of a burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// A transient point cloud owned by the engine.
///
/// Positions and velocities are kept as parallel arrays so the positions can
/// be handed to the scene graph without repacking.
pub struct Burst {
    id: BurstId,
    node: NodeId,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    age: f32,
    lifetime: f32,
}

impl Burst {
    pub(crate) fn new(
        id: BurstId,
        node: NodeId,
        origin: Vec3,
        velocities: Vec<Vec3>,
        lifetime: f32,
    ) -> Self {
        Self {
            id,
            node,
            positions: vec![origin; velocities.len()],
            velocities,
            age: 0.0,
            lifetime,
        }
    }

    pub fn id(&self) -> BurstId {
        self.id
    }

    /// Scene graph node mirroring this burst
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        self.positions
            .iter()
            .zip(&self.velocities)
            .map(|(&position, &velocity)| Particle { position, velocity })
    }

    /// `max(0, 1 - age / lifetime)`
    pub fn opacity(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).max(0.0)
    }

    /// Alive while `age <= lifetime`; opacity reaching zero does not end it
    pub fn is_alive(&self) -> bool {
        self.age <= self.lifetime
    }

    /// Advance one explicit-Euler step: positions move with the velocity at
    /// the start of the step, then gravity pulls the vertical velocity down.
    pub(crate) fn step(&mut self, dt: f32, gravity: f32) {
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity * dt;
            velocity.y -= gravity * dt;
        }
        self.age += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst_with(velocities: Vec<Vec3>, lifetime: f32) -> Burst {
        Burst::new(
            BurstId(1),
            NodeId::from_raw(1),
            Vec3::new(0.0, 1.0, 0.0),
            velocities,
            lifetime,
        )
    }

    #[test]
    fn particles_start_co_located() {
        let b = burst_with(vec![Vec3::UP, Vec3::FORWARD, Vec3::ONE], 2.0);
        assert_eq!(b.len(), 3);
        assert!(b.positions().iter().all(|p| *p == Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(b.age(), 0.0);
        assert_eq!(b.opacity(), 1.0);
    }

    #[test]
    fn explicit_euler_step() {
        let mut b = burst_with(vec![Vec3::new(0.0, 2.0, 0.0)], 5.0);
        b.step(0.5, 1.6);
        let p = b.particles().next().unwrap();
        // y = 1 + 2 * 0.5, vy = 2 - 1.6 * 0.5
        assert!((p.position.y - 2.0).abs() < 1e-6);
        assert!((p.velocity.y - 1.2).abs() < 1e-6);
        assert_eq!(p.position.x, 0.0);
        assert_eq!(p.velocity.x, 0.0);
        assert!((b.age() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn opacity_fades_linearly() {
        let mut b = burst_with(vec![Vec3::ZERO], 2.0);
        b.step(1.0, 0.0);
        assert_eq!(b.opacity(), 0.5);
        b.step(1.0, 0.0);
        assert_eq!(b.opacity(), 0.0);
        assert!(b.is_alive());
        b.step(0.01, 0.0);
        assert_eq!(b.opacity(), 0.0);
        assert!(!b.is_alive());
    }
}
