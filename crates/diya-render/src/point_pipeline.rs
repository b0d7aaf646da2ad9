//! Instanced point-cloud render pipeline
//!
//! Each point is a camera-facing quad; point positions come from a storage
//! buffer indexed by instance. Depth test on, depth write off.

use crate::context::DEPTH_FORMAT;
use crate::pipeline::{uniform_layout, IDENTITY};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Camera and fog data shared by every point draw in a frame (bind group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PointFrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub camera_pos: [f32; 4],
    pub fog: [f32; 4],
}

impl Default for PointFrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: IDENTITY,
            camera_right: [1.0, 0.0, 0.0, 0.0],
            camera_up: [0.0, 1.0, 0.0, 0.0],
            camera_pos: [0.0; 4],
            fog: [0.0; 4],
        }
    }
}

/// Per-cloud transform and appearance (bind group 1, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CloudUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub size: [f32; 4],
}

/// GPU resources for one point-cloud node
pub struct PointDrawCall {
    pub uniform_buffer: wgpu::Buffer,
    pub point_buffer: wgpu::Buffer,
    /// Capacity of `point_buffer` in points
    pub capacity: usize,
    pub point_count: u32,
    pub bind_group: wgpu::BindGroup,
    /// Scene-graph revision last uploaded
    pub revision: u64,
}

pub struct PointPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub cloud_bind_group_layout: wgpu::BindGroupLayout,
    pub quad_index_buffer: wgpu::Buffer,
    pub frame_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
}

impl PointPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("point_shader.wgsl").into()),
        });

        let frame_bind_group_layout = uniform_layout(
            device,
            "Point Frame Bind Group Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );

        // Group 1: cloud uniforms + positions storage buffer (read-only)
        let cloud_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
                label: Some("Point Cloud Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &cloud_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_point"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_point"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quad_indices: [u32; 6] = [0, 1, 2, 2, 1, 3];
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Quad Index Buffer"),
            contents: bytemuck::cast_slice(&quad_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[PointFrameUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("Point Frame Bind Group"),
        });

        Self {
            pipeline,
            frame_bind_group_layout,
            cloud_bind_group_layout,
            quad_index_buffer,
            frame_buffer,
            frame_bind_group,
        }
    }

    /// Allocate a draw call able to hold `capacity` points
    pub fn create_draw_call(&self, device: &wgpu::Device, capacity: usize) -> PointDrawCall {
        // Storage bindings may not be empty
        let capacity = capacity.max(1);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Cloud Uniform Buffer"),
            size: std::mem::size_of::<CloudUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let point_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Cloud Positions"),
            size: (capacity * std::mem::size_of::<[f32; 4]>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.cloud_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: point_buffer.as_entire_binding(),
                },
            ],
            label: Some("Point Cloud Bind Group"),
        });

        PointDrawCall {
            uniform_buffer,
            point_buffer,
            capacity,
            point_count: 0,
            bind_group,
            revision: u64::MAX,
        }
    }
}
