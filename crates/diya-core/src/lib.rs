//! Diya Core - Foundational types for the Diya lamp scene
//!
//! This crate provides the types every other Diya crate depends on:
//! - `NodeId` - Scene graph node identifiers
//! - `Vec3`, `Transform`, `Color`, `ClientRect` - Spatial types
//! - `RandomSource` / `XorShiftRng` - Injectable randomness
//! - `PointCloudHost` - The seam between particle simulation and the scene graph
//! - Error types and Result alias

mod error;
mod host;
mod id;
mod rand;
mod types;

pub use error::{DiyaError, Result};
pub use host::{PointCloudHost, PointStyle};
pub use id::NodeId;
pub use rand::{RandomSource, XorShiftRng};
pub use types::{mat4_mul, ClientRect, Color, Transform, Vec3};
