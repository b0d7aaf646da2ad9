//! Diya Render - Scene graph, camera, and wgpu rendering
//!
//! The scene graph and camera are plain data and usable without a GPU. The
//! wgpu side (`RenderContext`, pipelines, `SceneRenderer`, `WindowSurface`)
//! draws a graph into a winit window.

mod camera;
mod context;
mod fixture;
mod pipeline;
mod point_pipeline;
mod primitives;
mod scene_graph;
mod scene_renderer;
mod surface;
mod window_surface;

pub use camera::{mat4_inverse, mat4_transform_point, Camera};
pub use context::{RenderContext, RenderError};
pub use fixture::SceneFixture;
pub use pipeline::{MeshPipeline, MAX_POINT_LIGHTS};
pub use point_pipeline::PointPipeline;
pub use primitives::{
    create_circle_mesh, create_cone_mesh, create_plane_mesh, create_sphere_mesh, create_torus_mesh,
    Mesh, Vertex,
};
pub use scene_graph::{Fog, Light, Material, Node, NodeKind, PointCloud, SceneGraph};
pub use scene_renderer::{frame_uniforms, SceneRenderer};
pub use surface::RenderSurface;
pub use window_surface::WindowSurface;

#[cfg(test)]
mod tests {
    #[test]
    fn test_mesh_shader_parses() {
        let module = naga::front::wgsl::parse_str(include_str!("shader.wgsl"))
            .expect("shader.wgsl should parse");
        let entry_points: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }

    #[test]
    fn test_point_shader_parses() {
        let module = naga::front::wgsl::parse_str(include_str!("point_shader.wgsl"))
            .expect("point_shader.wgsl should parse");
        let entry_points: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_point"));
        assert!(entry_points.contains(&"fs_point"));
    }
}
