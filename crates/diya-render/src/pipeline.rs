//! Lit mesh render pipeline

use crate::context::DEPTH_FORMAT;
use crate::primitives::Vertex;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

pub const MAX_POINT_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct PointLightGpu {
    pub position_range: [f32; 4],
    pub color_intensity: [f32; 4],
    pub params: [f32; 4],
}

/// Per-frame camera, light, and fog data (bind group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// Ambient color premultiplied by intensity
    pub ambient: [f32; 4],
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub fog: [f32; 4],
    pub light_count: [u32; 4],
    pub point_lights: [PointLightGpu; MAX_POINT_LIGHTS],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: IDENTITY,
            camera_pos: [0.0; 4],
            ambient: [0.0; 4],
            sky_color: [0.0; 4],
            ground_color: [0.0; 4],
            fog: [0.0; 4],
            light_count: [0; 4],
            point_lights: [PointLightGpu::default(); MAX_POINT_LIGHTS],
        }
    }
}

/// Per-mesh model and material data (bind group 1)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: [f32; 4],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            model: IDENTITY,
            normal_matrix: IDENTITY,
            color: [1.0; 4],
            emissive: [0.0; 4],
        }
    }
}

pub(crate) const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Opaque and transparent variants of the mesh pipeline
pub struct MeshPipeline {
    pub opaque_pipeline: wgpu::RenderPipeline,
    pub transparent_pipeline: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub draw_bind_group_layout: wgpu::BindGroupLayout,
    pub frame_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
}

impl MeshPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let frame_bind_group_layout = uniform_layout(
            device,
            "Mesh Frame Bind Group Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let draw_bind_group_layout = uniform_layout(
            device,
            "Mesh Draw Bind Group Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &draw_bind_group_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str, blend: wgpu::BlendState, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Torus, disc and plane are all seen from both sides
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque_pipeline = build("Mesh Opaque Pipeline", wgpu::BlendState::REPLACE, true);
        let transparent_pipeline = build(
            "Mesh Transparent Pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FrameUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("Mesh Frame Bind Group"),
        });

        Self {
            opaque_pipeline,
            transparent_pipeline,
            frame_bind_group_layout,
            draw_bind_group_layout,
            frame_buffer,
            frame_bind_group,
        }
    }

    /// Create the uniform buffer and bind group for one mesh node
    pub fn create_draw_binding(&self, device: &wgpu::Device) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Draw Uniform Buffer"),
            contents: bytemuck::cast_slice(&[DrawUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.draw_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Mesh Draw Bind Group"),
        });
        (buffer, bind_group)
    }
}

pub(crate) fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}
