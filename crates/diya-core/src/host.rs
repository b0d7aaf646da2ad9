//! Drawable point-cloud seam between simulation and the scene graph

use crate::id::NodeId;
use crate::types::Vec3;

/// Appearance of a point-cloud node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    /// World-space point size
    pub size: f32,
    /// Base RGB color; alpha is driven by opacity
    pub color: [f32; 3],
    pub opacity: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            size: 0.06,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
        }
    }
}

/// Something that can hold transient point clouds: normally the scene graph.
///
/// A node returned by `attach_points` stays valid until it is passed to
/// `release_points`. Releasing an unknown or already-released node must be
/// harmless.
pub trait PointCloudHost {
    /// Add a new point cloud and return its node
    fn attach_points(&mut self, positions: &[Vec3], style: PointStyle) -> NodeId;

    /// Replace the positions and opacity of an attached point cloud
    fn update_points(&mut self, node: NodeId, positions: &[Vec3], opacity: f32);

    /// Detach the node and drop everything it owns
    fn release_points(&mut self, node: NodeId);
}
