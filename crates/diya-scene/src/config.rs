//! Scene configuration, loaded from TOML
//!
//! Every field is optional; an empty document yields the defaults.
//!
//! ```toml
//! sparkles_count = 70
//! fireworks_on_click = true
//! auto_fireworks = false
//!
//! [fireworks]
//! particle_count = 200
//!
//! [frame]
//! max_dt = 0.05
//!
//! [auto_spawn]
//! interval_min_ms = 900
//! interval_max_ms = 1700
//! ```

use diya_core::{DiyaError, Result, Vec3};
use diya_particles::BurstConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Ambient sparkle points scattered around the lamp
    pub sparkles_count: usize,
    /// Spawn a burst where the container is clicked
    pub fireworks_on_click: bool,
    /// Spawn bursts on a jittered timer
    pub auto_fireworks: bool,
    /// Fixed random seed; `None` seeds from the clock
    pub seed: Option<u32>,
    /// Upper bound on the device-pixel ratio used to size the surface
    pub max_pixel_ratio: f64,
    pub fireworks: BurstConfig,
    pub frame: FrameConfig,
    pub auto_spawn: AutoSpawnConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sparkles_count: 70,
            fireworks_on_click: false,
            auto_fireworks: false,
            seed: None,
            max_pixel_ratio: 2.0,
            fireworks: BurstConfig::default(),
            frame: FrameConfig::default(),
            auto_spawn: AutoSpawnConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Largest simulation step per tick, in seconds
    pub max_dt: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_dt: 0.05 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutoSpawnConfig {
    pub interval_min_ms: f64,
    pub interval_max_ms: f64,
    /// Corners of the box auto-spawned bursts are placed in
    pub box_min: [f32; 3],
    pub box_max: [f32; 3],
}

impl Default for AutoSpawnConfig {
    fn default() -> Self {
        Self {
            interval_min_ms: 900.0,
            interval_max_ms: 1700.0,
            box_min: [-1.6, 0.6, -0.6],
            box_max: [1.6, 1.8, 0.6],
        }
    }
}

impl AutoSpawnConfig {
    pub fn box_min(&self) -> Vec3 {
        Vec3::from_array(self.box_min)
    }

    pub fn box_max(&self) -> Vec3 {
        Vec3::from_array(self.box_max)
    }
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        self.fireworks.validate()?;

        if !(self.max_pixel_ratio >= 1.0 && self.max_pixel_ratio <= 4.0) {
            return Err(DiyaError::ValueOutOfRange {
                field: "max_pixel_ratio".into(),
                min: 1.0,
                max: 4.0,
                value: self.max_pixel_ratio,
            });
        }

        if !(self.frame.max_dt > 0.0 && self.frame.max_dt <= 1.0) {
            return Err(DiyaError::ValueOutOfRange {
                field: "frame.max_dt".into(),
                min: 0.0,
                max: 1.0,
                value: self.frame.max_dt,
            });
        }

        let auto = &self.auto_spawn;
        if !(auto.interval_min_ms > 0.0 && auto.interval_min_ms <= auto.interval_max_ms) {
            return Err(DiyaError::InvalidConfig(format!(
                "auto_spawn interval range [{}, {}] ms is empty or non-positive",
                auto.interval_min_ms, auto.interval_max_ms
            )));
        }
        if auto.box_min.iter().zip(&auto.box_max).any(|(lo, hi)| lo > hi) {
            return Err(DiyaError::InvalidConfig(format!(
                "auto_spawn box min {:?} exceeds max {:?}",
                auto.box_min, auto.box_max
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.sparkles_count, 70);
        assert!(!config.fireworks_on_click);
        assert!(!config.auto_fireworks);
    }

    #[test]
    fn test_nested_tables() {
        let config = SceneConfig::from_toml_str(
            r#"
            fireworks_on_click = true
            seed = 42

            [fireworks]
            particle_count = 50
            gravity = 2.0

            [frame]
            max_dt = 0.1

            [auto_spawn]
            interval_min_ms = 500
            interval_max_ms = 600
            "#,
        )
        .unwrap();

        assert!(config.fireworks_on_click);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.fireworks.particle_count, 50);
        assert_eq!(config.fireworks.gravity, 2.0);
        assert_eq!(config.fireworks.lifetime_min, 1.8);
        assert_eq!(config.frame.max_dt, 0.1);
        assert_eq!(config.auto_spawn.interval_max_ms, 600.0);
        assert_eq!(config.auto_spawn.box_min, [-1.6, 0.6, -0.6]);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = SceneConfig::from_toml_str("[frame]\nmax_dt = 0.0").unwrap_err();
        assert!(matches!(err, DiyaError::ValueOutOfRange { .. }));

        let err = SceneConfig::from_toml_str("max_pixel_ratio = 0.5").unwrap_err();
        assert!(matches!(err, DiyaError::ValueOutOfRange { .. }));

        let err = SceneConfig::from_toml_str(
            "[auto_spawn]\ninterval_min_ms = 2000\ninterval_max_ms = 1000",
        )
        .unwrap_err();
        assert!(matches!(err, DiyaError::InvalidConfig(_)));

        let err = SceneConfig::from_toml_str("[fireworks]\nparticle_count = 0").unwrap_err();
        assert!(matches!(err, DiyaError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = SceneConfig::from_toml_str("sparkles_count = \"lots\"").unwrap_err();
        assert!(matches!(err, DiyaError::TomlParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, DiyaError::IoError(_)));
    }
}
