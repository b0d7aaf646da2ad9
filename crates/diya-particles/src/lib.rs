//! Diya Particles - transient firework bursts
//!
//! Provides the burst engine behind every firework in the scene:
//! - Co-located spawn with uniformly random directions and speeds
//! - Explicit-Euler integration under constant gravity
//! - Opacity fade derived from age over lifetime
//! - Expiry that detaches the burst's point cloud in the same update pass
//! - A cap on live bursts so sustained spawning stays bounded

pub mod burst;
pub mod config;
pub mod engine;

pub use burst::{Burst, BurstId, Particle};
pub use config::BurstConfig;
pub use engine::BurstEngine;
