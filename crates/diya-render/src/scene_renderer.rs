//! Scene renderer - converts SceneGraph nodes to GPU draws
//!
//! GPU resources are cached per node id. Each frame the cache is trimmed to
//! the nodes still in the graph, so a node detached from the scene frees its
//! buffers on the next render.

use crate::camera::{mat4_inverse, Camera};
use crate::pipeline::{
    DrawUniforms, FrameUniforms, MeshPipeline, PointLightGpu, MAX_POINT_LIGHTS,
};
use crate::point_pipeline::{CloudUniforms, PointDrawCall, PointFrameUniforms, PointPipeline};
use crate::primitives::Mesh;
use crate::scene_graph::{Light, Material, NodeKind, SceneGraph};
use diya_core::NodeId;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

struct MeshDrawCall {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    transparent: bool,
}

/// Renders a SceneGraph to a color + depth target
pub struct SceneRenderer {
    mesh_pipeline: MeshPipeline,
    point_pipeline: PointPipeline,
    mesh_draws: HashMap<NodeId, MeshDrawCall>,
    point_draws: HashMap<NodeId, PointDrawCall>,
    /// Draw order for this frame: opaque first, then transparent
    mesh_order: Vec<NodeId>,
    point_order: Vec<NodeId>,
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            mesh_pipeline: MeshPipeline::new(device, format),
            point_pipeline: PointPipeline::new(device, format),
            mesh_draws: HashMap::new(),
            point_draws: HashMap::new(),
            mesh_order: Vec::new(),
            point_order: Vec::new(),
        }
    }

    /// Number of nodes that currently own GPU resources
    pub fn cached_draw_count(&self) -> usize {
        self.mesh_draws.len() + self.point_draws.len()
    }

    /// Upload everything needed to draw `scene` from `camera`
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
        camera: &Camera,
    ) {
        self.release_detached(scene);

        queue.write_buffer(
            &self.mesh_pipeline.frame_buffer,
            0,
            bytemuck::cast_slice(&[frame_uniforms(scene, camera)]),
        );
        queue.write_buffer(
            &self.point_pipeline.frame_buffer,
            0,
            bytemuck::cast_slice(&[point_frame_uniforms(scene, camera)]),
        );

        self.mesh_order.clear();
        self.point_order.clear();
        let mut transparent = Vec::new();

        for (id, node) in scene.iter() {
            let Some(model) = scene.world_matrix(id) else {
                continue;
            };

            match &node.kind {
                NodeKind::Mesh { mesh, material } => {
                    let draw = self
                        .mesh_draws
                        .entry(id)
                        .or_insert_with(|| create_mesh_draw(device, &self.mesh_pipeline, mesh));
                    draw.transparent = material.is_transparent();
                    queue.write_buffer(
                        &draw.uniform_buffer,
                        0,
                        bytemuck::cast_slice(&[draw_uniforms(model, material)]),
                    );
                    if draw.transparent {
                        transparent.push(id);
                    } else {
                        self.mesh_order.push(id);
                    }
                }
                NodeKind::Points(cloud) => {
                    if cloud.positions.is_empty() {
                        continue;
                    }

                    let needs_alloc = self
                        .point_draws
                        .get(&id)
                        .map_or(true, |d| d.capacity < cloud.positions.len());
                    if needs_alloc {
                        let draw = self
                            .point_pipeline
                            .create_draw_call(device, cloud.positions.len());
                        self.point_draws.insert(id, draw);
                    }
                    let Some(draw) = self.point_draws.get_mut(&id) else {
                        continue;
                    };

                    if draw.revision != cloud.revision {
                        let packed: Vec<[f32; 4]> = cloud
                            .positions
                            .iter()
                            .map(|p| [p.x, p.y, p.z, 1.0])
                            .collect();
                        queue.write_buffer(&draw.point_buffer, 0, bytemuck::cast_slice(&packed));
                        draw.point_count = packed.len() as u32;
                        draw.revision = cloud.revision;
                    }

                    let style = cloud.style;
                    let uniforms = CloudUniforms {
                        model,
                        color: [style.color[0], style.color[1], style.color[2], style.opacity],
                        size: [style.size, 0.0, 0.0, 0.0],
                    };
                    queue.write_buffer(&draw.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
                    self.point_order.push(id);
                }
                NodeKind::Group | NodeKind::Light(_) => {}
            }
        }

        self.mesh_order.extend(transparent);
    }

    /// Record the scene into `encoder`. Call `prepare` first.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Diya Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    // Transparent clear so the host page shows through
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &self.mesh_pipeline.frame_bind_group, &[]);
        for id in &self.mesh_order {
            let Some(draw) = self.mesh_draws.get(id) else {
                continue;
            };
            let pipeline = if draw.transparent {
                &self.mesh_pipeline.transparent_pipeline
            } else {
                &self.mesh_pipeline.opaque_pipeline
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &draw.bind_group, &[]);
            pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..draw.index_count, 0, 0..1);
        }

        if self.point_order.is_empty() {
            return;
        }

        let pp = &self.point_pipeline;
        pass.set_pipeline(&pp.pipeline);
        pass.set_bind_group(0, &pp.frame_bind_group, &[]);
        pass.set_index_buffer(pp.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for id in &self.point_order {
            let Some(draw) = self.point_draws.get(id) else {
                continue;
            };
            if draw.point_count == 0 {
                continue;
            }
            pass.set_bind_group(1, &draw.bind_group, &[]);
            pass.draw_indexed(0..6, 0, 0..draw.point_count);
        }
    }

    /// Drop cached GPU resources for nodes no longer in the graph
    fn release_detached(&mut self, scene: &SceneGraph) {
        let before = self.cached_draw_count();
        self.mesh_draws
            .retain(|id, _| matches!(scene.get(*id).map(|n| &n.kind), Some(NodeKind::Mesh { .. })));
        self.point_draws
            .retain(|id, _| matches!(scene.get(*id).map(|n| &n.kind), Some(NodeKind::Points(_))));
        let released = before - self.cached_draw_count();
        if released > 0 {
            log::debug!("Released GPU resources for {} detached nodes", released);
        }
    }

    /// Drop every cached GPU resource
    pub fn clear(&mut self) {
        self.mesh_draws.clear();
        self.point_draws.clear();
        self.mesh_order.clear();
        self.point_order.clear();
    }
}

fn create_mesh_draw(device: &wgpu::Device, pipeline: &MeshPipeline, mesh: &Mesh) -> MeshDrawCall {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Vertex Buffer"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Index Buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let (uniform_buffer, bind_group) = pipeline.create_draw_binding(device);

    MeshDrawCall {
        vertex_buffer,
        index_buffer,
        index_count: mesh.index_count() as u32,
        uniform_buffer,
        bind_group,
        transparent: false,
    }
}

/// Gather camera, lights, and fog into the mesh frame uniforms
pub fn frame_uniforms(scene: &SceneGraph, camera: &Camera) -> FrameUniforms {
    let mut uniforms = FrameUniforms {
        view_proj: camera.view_projection_matrix(),
        camera_pos: extend(camera.position_array(), 1.0),
        ..Default::default()
    };

    let mut point_count = 0usize;
    for (id, node) in scene.iter() {
        let NodeKind::Light(light) = &node.kind else {
            continue;
        };
        match *light {
            Light::Ambient { color, intensity } => {
                for (acc, c) in uniforms.ambient.iter_mut().zip(color.rgb()) {
                    *acc += c * intensity;
                }
            }
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => {
                for (acc, c) in uniforms.sky_color.iter_mut().zip(sky.rgb()) {
                    *acc += c * intensity;
                }
                for (acc, c) in uniforms.ground_color.iter_mut().zip(ground.rgb()) {
                    *acc += c * intensity;
                }
            }
            Light::Point {
                color,
                intensity,
                distance,
                decay,
            } => {
                if point_count >= MAX_POINT_LIGHTS {
                    log::warn!("Point light {} ignored: limit of {} reached", id, MAX_POINT_LIGHTS);
                    continue;
                }
                let Some(position) = scene.world_position(id) else {
                    continue;
                };
                uniforms.point_lights[point_count] = PointLightGpu {
                    position_range: extend(position.to_array(), distance),
                    color_intensity: extend(color.rgb(), intensity),
                    params: [decay, 0.0, 0.0, 0.0],
                };
                point_count += 1;
            }
        }
    }
    uniforms.light_count = [point_count as u32, 0, 0, 0];

    if let Some(fog) = scene.fog {
        uniforms.fog = extend(fog.color.rgb(), fog.density);
    }

    uniforms
}

fn point_frame_uniforms(scene: &SceneGraph, camera: &Camera) -> PointFrameUniforms {
    PointFrameUniforms {
        view_proj: camera.view_projection_matrix(),
        camera_right: extend(camera.right_vector(), 0.0),
        camera_up: extend(camera.up_vector(), 0.0),
        camera_pos: extend(camera.position_array(), 1.0),
        fog: scene
            .fog
            .map_or([0.0; 4], |fog| extend(fog.color.rgb(), fog.density)),
    }
}

fn draw_uniforms(model: [[f32; 4]; 4], material: &Material) -> DrawUniforms {
    let emissive = material.emissive.rgb().map(|c| c * material.emissive_intensity);
    DrawUniforms {
        model,
        normal_matrix: normal_matrix(&model),
        color: extend(material.color.rgb(), material.opacity),
        emissive: extend(emissive, if material.unlit { 1.0 } else { 0.0 }),
    }
}

/// Inverse-transpose of the model matrix, for transforming normals
fn normal_matrix(model: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let inv = mat4_inverse(model);
    let mut out = [[0.0f32; 4]; 4];
    for (c, col) in out.iter_mut().enumerate() {
        for (r, val) in col.iter_mut().enumerate() {
            *val = inv[r][c];
        }
    }
    out
}

fn extend(v: [f32; 3], w: f32) -> [f32; 4] {
    [v[0], v[1], v[2], w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::SceneFixture;
    use diya_core::{Color, Transform, Vec3, XorShiftRng};

    fn lamp_scene() -> SceneGraph {
        let mut graph = SceneGraph::new();
        let mut rng = XorShiftRng::new(11);
        SceneFixture::build(&mut graph, 5, &mut rng);
        graph
    }

    #[test]
    fn test_frame_uniforms_from_fixture() {
        let graph = lamp_scene();
        let u = frame_uniforms(&graph, &Camera::new());

        assert_eq!(u.light_count[0], 1);
        assert!((u.ambient[0] - 0.15).abs() < 1e-6);
        assert!((u.fog[3] - 0.08).abs() < 1e-6);
        assert!((u.point_lights[0].position_range[1] - 0.4).abs() < 1e-5);
        assert!((u.point_lights[0].position_range[3] - 5.0).abs() < 1e-6);
        assert!((u.point_lights[0].color_intensity[3] - 1.8).abs() < 1e-6);
        assert_eq!(u.camera_pos, [0.0, 1.2, 3.2, 1.0]);
    }

    #[test]
    fn test_point_lights_are_capped() {
        let mut graph = SceneGraph::new();
        for i in 0..(MAX_POINT_LIGHTS + 2) {
            graph.add(
                crate::scene_graph::Node::light(
                    format!("p{i}"),
                    Light::Point {
                        color: Color::WHITE,
                        intensity: 1.0,
                        distance: 0.0,
                        decay: 2.0,
                    },
                )
                .with_transform(Transform::from_position(Vec3::new(i as f32, 0.0, 0.0))),
            );
        }
        let u = frame_uniforms(&graph, &Camera::new());
        assert_eq!(u.light_count[0] as usize, MAX_POINT_LIGHTS);
    }

    #[test]
    fn test_unlit_flag_and_emissive_scale() {
        let material = Material {
            emissive: Color::new(0.5, 0.25, 0.0, 1.0),
            emissive_intensity: 2.0,
            unlit: true,
            ..Default::default()
        };
        let u = draw_uniforms(crate::pipeline::IDENTITY, &material);
        assert_eq!(u.emissive, [1.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_normal_matrix_of_uniform_scale() {
        let model = Transform::IDENTITY
            .with_scale(Vec3::new(2.0, 2.0, 2.0))
            .to_matrix();
        let n = normal_matrix(&model);
        assert!((n[0][0] - 0.5).abs() < 1e-6);
        assert!((n[1][1] - 0.5).abs() < 1e-6);
        assert!(n[0][1].abs() < 1e-6);
    }
}
