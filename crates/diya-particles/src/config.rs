//! Burst configuration (parsed from the `[fireworks]` TOML table)

use diya_core::{DiyaError, Result};
use serde::Deserialize;

/// Tunables for every burst an engine spawns
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Particles per burst
    pub particle_count: usize,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Downward acceleration in units/s²
    pub gravity: f32,
    /// Point size of the burst's point cloud
    pub point_size: f32,
    pub color: [f32; 3],
    /// Live bursts beyond this are refused
    pub max_live_bursts: usize,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            particle_count: 200,
            lifetime_min: 1.8,
            lifetime_max: 3.2,
            speed_min: 1.2,
            speed_max: 2.7,
            gravity: 1.6,
            point_size: 0.06,
            color: [1.0, 1.0, 1.0],
            max_live_bursts: 32,
        }
    }
}

impl BurstConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(DiyaError::InvalidConfig(
                "fireworks.particle_count must be at least 1".into(),
            ));
        }
        if self.max_live_bursts == 0 {
            return Err(DiyaError::InvalidConfig(
                "fireworks.max_live_bursts must be at least 1".into(),
            ));
        }
        if !(self.lifetime_min > 0.0 && self.lifetime_min <= self.lifetime_max) {
            return Err(DiyaError::InvalidConfig(format!(
                "fireworks lifetime range [{}, {}] is empty or non-positive",
                self.lifetime_min, self.lifetime_max
            )));
        }
        if !(self.speed_min >= 0.0 && self.speed_min <= self.speed_max) {
            return Err(DiyaError::InvalidConfig(format!(
                "fireworks speed range [{}, {}] is empty or negative",
                self.speed_min, self.speed_max
            )));
        }
        if !self.gravity.is_finite() {
            return Err(DiyaError::InvalidConfig("fireworks.gravity must be finite".into()));
        }
        Ok(())
    }
}
