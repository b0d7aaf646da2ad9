//! Mesh primitives (plane, torus, circle, cone, sphere)

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// A vertex with position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A mesh with vertices and indices
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Horizontal plane on XZ facing +Y, centred on the origin
pub fn create_plane_mesh(width: f32, depth: f32) -> Mesh {
    let hw = width / 2.0;
    let hd = depth / 2.0;
    let n = [0.0, 1.0, 0.0];

    let vertices = vec![
        Vertex::new([-hw, 0.0, -hd], n),
        Vertex::new([hw, 0.0, -hd], n),
        Vertex::new([hw, 0.0, hd], n),
        Vertex::new([-hw, 0.0, hd], n),
    ];

    let indices: Vec<u32> = vec![0, 2, 1, 0, 3, 2];

    Mesh { vertices, indices }
}

/// Torus in the XY plane around the Z axis.
///
/// `radius` is the distance from the centre to the middle of the tube.
pub fn create_torus_mesh(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Mesh {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);

    let mut vertices = Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;

            let position = [
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ];
            let centre = [radius * u.cos(), radius * u.sin(), 0.0];
            let normal = normalize([
                position[0] - centre[0],
                position[1] - centre[1],
                position[2] - centre[2],
            ]);
            vertices.push(Vertex::new(position, normal));
        }
    }

    let stride = tubular_segments + 1;
    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Mesh { vertices, indices }
}

/// Flat disc in the XY plane facing +Z
pub fn create_circle_mesh(radius: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let n = [0.0, 0.0, 1.0];

    let mut vertices = Vec::with_capacity(segments as usize + 2);
    vertices.push(Vertex::new([0.0, 0.0, 0.0], n));
    for s in 0..=segments {
        let theta = s as f32 / segments as f32 * TAU;
        vertices.push(Vertex::new([radius * theta.cos(), radius * theta.sin(), 0.0], n));
    }

    let mut indices = Vec::with_capacity(segments as usize * 3);
    for s in 1..=segments {
        indices.extend_from_slice(&[s, s + 1, 0]);
    }

    Mesh { vertices, indices }
}

/// Cone along Y, base at `-height / 2` and apex at `+height / 2`, with a base cap
pub fn create_cone_mesh(radius: f32, height: f32, radial_segments: u32) -> Mesh {
    let radial_segments = radial_segments.max(3);
    let half = height / 2.0;
    let slope = radius / height;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side: one apex vertex per segment so each face gets its own normal
    for s in 0..=radial_segments {
        let theta = s as f32 / radial_segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let normal = normalize([sin, slope, cos]);
        vertices.push(Vertex::new([0.0, half, 0.0], normal));
        vertices.push(Vertex::new([radius * sin, -half, radius * cos], normal));
    }
    for s in 0..radial_segments {
        let apex = s * 2;
        let base = apex + 1;
        let next_base = base + 2;
        indices.extend_from_slice(&[apex, base, next_base]);
    }

    // Base cap
    let centre = vertices.len() as u32;
    let down = [0.0, -1.0, 0.0];
    vertices.push(Vertex::new([0.0, -half, 0.0], down));
    for s in 0..=radial_segments {
        let theta = s as f32 / radial_segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        vertices.push(Vertex::new([radius * sin, -half, radius * cos], down));
    }
    for s in 0..radial_segments {
        let a = centre + 1 + s;
        indices.extend_from_slice(&[centre, a + 1, a]);
    }

    Mesh { vertices, indices }
}

/// UV sphere centred on the origin
pub fn create_sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let phi = v * PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let theta = u * TAU;
            let normal = [-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin()];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            vertices.push(Vertex::new(position, normal));
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh { vertices, indices }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_range(mesh: &Mesh) {
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.index_count() % 3, 0);
    }

    #[test]
    fn test_plane_faces_up() {
        let mesh = create_plane_mesh(20.0, 20.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(mesh.vertices.iter().all(|v| v.position[0].abs() == 10.0));
    }

    #[test]
    fn test_torus_extent() {
        let mesh = create_torus_mesh(0.9, 0.25, 24, 80);
        assert_indices_in_range(&mesh);
        let max_r = mesh
            .vertices
            .iter()
            .map(|v| (v.position[0].powi(2) + v.position[1].powi(2)).sqrt())
            .fold(0.0f32, f32::max);
        assert!((max_r - 1.15).abs() < 1e-3);
        let max_z = mesh.vertices.iter().map(|v| v.position[2].abs()).fold(0.0f32, f32::max);
        assert!(max_z <= 0.25 + 1e-5);
    }

    #[test]
    fn test_circle_fan() {
        let mesh = create_circle_mesh(0.6, 32);
        assert_indices_in_range(&mesh);
        assert_eq!(mesh.index_count(), 32 * 3);
        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_cone_apex_and_base() {
        let mesh = create_cone_mesh(0.18, 0.5, 16);
        assert_indices_in_range(&mesh);
        let top = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let bottom = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((top - 0.25).abs() < 1e-6);
        assert!((bottom + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_radius() {
        let mesh = create_sphere_mesh(0.06, 12, 8);
        assert_indices_in_range(&mesh);
        for v in &mesh.vertices {
            let r = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - 0.06).abs() < 1e-5);
        }
    }
}
