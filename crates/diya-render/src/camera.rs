//! Perspective camera with unprojection

use diya_core::{mat4_mul, Vec3};

/// A perspective camera looking from `position` towards `target`
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let position = Vec3::new(0.0, 1.2, 3.2);
        Self {
            position,
            target: position + Vec3::FORWARD,
            up: Vec3::UP,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            aspect: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the aspect ratio from a surface size. Zero-sized surfaces are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn position_array(&self) -> [f32; 3] {
        self.position.to_array()
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the projection matrix (4x4, column-major, clip depth in [-1, 1])
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let fov_rad = self.fov.to_radians();
        let f = 1.0 / (fov_rad / 2.0).tan();

        let depth = self.far - self.near;

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(self.far + self.near) / depth, -1.0],
            [0.0, 0.0, -(2.0 * self.far * self.near) / depth, 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_mul(&self.projection_matrix(), &self.view_matrix())
    }

    /// Get inverse of the combined view-projection matrix (for unprojecting)
    pub fn inverse_view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_inverse(&self.view_projection_matrix())
    }

    /// Camera right vector (world space)
    pub fn right_vector(&self) -> [f32; 3] {
        let f = (self.target - self.position).normalized();
        f.cross(&self.up).normalized().to_array()
    }

    /// Camera up vector (world space, perpendicular to forward and right)
    pub fn up_vector(&self) -> [f32; 3] {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        s.cross(&f).to_array()
    }

    /// Camera forward direction (world space)
    pub fn forward_vector(&self) -> [f32; 3] {
        (self.target - self.position).normalized().to_array()
    }

    /// Map a point in normalized device coordinates back to world space
    pub fn unproject(&self, ndc: [f32; 3]) -> Vec3 {
        let inv_vp = self.inverse_view_projection_matrix();
        Vec3::from_array(mat4_transform_point(&inv_vp, ndc))
    }

    /// Distance in front of the camera at which NDC depth `ndc_z` lies
    pub fn view_distance_at_ndc_depth(&self, ndc_z: f32) -> f32 {
        let (n, f) = (self.near, self.far);
        2.0 * f * n / ((f + n) - ndc_z * (f - n))
    }
}

/// Transform a 3D point by a 4x4 column-major matrix (with perspective divide).
pub fn mat4_transform_point(m: &[[f32; 4]; 4], p: [f32; 3]) -> [f32; 3] {
    let x = m[0][0] * p[0] + m[1][0] * p[1] + m[2][0] * p[2] + m[3][0];
    let y = m[0][1] * p[0] + m[1][1] * p[1] + m[2][1] * p[2] + m[3][1];
    let z = m[0][2] * p[0] + m[1][2] * p[1] + m[2][2] * p[2] + m[3][2];
    let w = m[0][3] * p[0] + m[1][3] * p[1] + m[2][3] * p[2] + m[3][3];

    if w.abs() < 1e-10 {
        [x, y, z]
    } else {
        [x / w, y / w, z / w]
    }
}

/// Compute the inverse of a 4x4 column-major matrix using cofactor expansion
pub fn mat4_inverse(m: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let s = |col: usize, row: usize| -> f32 { m[col][row] };

    let c00 = s(2, 2) * s(3, 3) - s(3, 2) * s(2, 3);
    let c02 = s(1, 2) * s(3, 3) - s(3, 2) * s(1, 3);
    let c03 = s(1, 2) * s(2, 3) - s(2, 2) * s(1, 3);

    let c04 = s(2, 1) * s(3, 3) - s(3, 1) * s(2, 3);
    let c06 = s(1, 1) * s(3, 3) - s(3, 1) * s(1, 3);
    let c07 = s(1, 1) * s(2, 3) - s(2, 1) * s(1, 3);

    let c08 = s(2, 1) * s(3, 2) - s(3, 1) * s(2, 2);
    let c10 = s(1, 1) * s(3, 2) - s(3, 1) * s(1, 2);
    let c11 = s(1, 1) * s(2, 2) - s(2, 1) * s(1, 2);

    let c12 = s(2, 0) * s(3, 3) - s(3, 0) * s(2, 3);
    let c14 = s(1, 0) * s(3, 3) - s(3, 0) * s(1, 3);
    let c15 = s(1, 0) * s(2, 3) - s(2, 0) * s(1, 3);

    let c16 = s(2, 0) * s(3, 2) - s(3, 0) * s(2, 2);
    let c18 = s(1, 0) * s(3, 2) - s(3, 0) * s(1, 2);
    let c19 = s(1, 0) * s(2, 2) - s(2, 0) * s(1, 2);

    let c20 = s(2, 0) * s(3, 1) - s(3, 0) * s(2, 1);
    let c22 = s(1, 0) * s(3, 1) - s(3, 0) * s(1, 1);
    let c23 = s(1, 0) * s(2, 1) - s(2, 0) * s(1, 1);

    let f0 = [c00, c00, c02, c03];
    let f1 = [c04, c04, c06, c07];
    let f2 = [c08, c08, c10, c11];
    let f3 = [c12, c12, c14, c15];
    let f4 = [c16, c16, c18, c19];
    let f5 = [c20, c20, c22, c23];

    let v0 = [s(1, 0), s(0, 0), s(0, 0), s(0, 0)];
    let v1 = [s(1, 1), s(0, 1), s(0, 1), s(0, 1)];
    let v2 = [s(1, 2), s(0, 2), s(0, 2), s(0, 2)];
    let v3 = [s(1, 3), s(0, 3), s(0, 3), s(0, 3)];

    let mut inv = [[0.0f32; 4]; 4];
    let sign_a = [1.0, -1.0, 1.0, -1.0];
    let sign_b = [-1.0, 1.0, -1.0, 1.0];

    for i in 0..4 {
        inv[0][i] = sign_a[i] * (v1[i] * f0[i] - v2[i] * f1[i] + v3[i] * f2[i]);
        inv[1][i] = sign_b[i] * (v0[i] * f0[i] - v2[i] * f3[i] + v3[i] * f4[i]);
        inv[2][i] = sign_a[i] * (v0[i] * f1[i] - v1[i] * f3[i] + v3[i] * f5[i]);
        inv[3][i] = sign_b[i] * (v0[i] * f2[i] - v1[i] * f4[i] + v2[i] * f5[i]);
    }

    let det = s(0, 0) * inv[0][0] + s(1, 0) * inv[0][1] + s(2, 0) * inv[0][2] + s(3, 0) * inv[0][3];

    if det.abs() < 1e-10 {
        return [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
    }

    let inv_det = 1.0 / det;
    for col in &mut inv {
        for val in col.iter_mut() {
            *val *= inv_det;
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn default_looks_down_negative_z() {
        let cam = Camera::new();
        assert_eq!(cam.forward_vector(), [0.0, 0.0, -1.0]);
        assert_eq!(cam.position_array(), [0.0, 1.2, 3.2]);
    }

    #[test]
    fn inverse_times_forward_is_identity() {
        let mut cam = Camera::new();
        cam.set_viewport(1280, 720);
        let vp = cam.view_projection_matrix();
        let inv = cam.inverse_view_projection_matrix();
        let id = mat4_mul(&inv, &vp);
        for (i, col) in id.iter().enumerate() {
            for (j, v) in col.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(approx(*v, expected, 1e-3), "[{i}][{j}] = {v}");
            }
        }
    }

    #[test]
    fn unproject_center_lies_on_view_axis() {
        let mut cam = Camera::new();
        cam.set_viewport(800, 600);
        let p = cam.unproject([0.0, 0.0, 0.5]);
        let expected = cam.view_distance_at_ndc_depth(0.5);

        assert!(approx(p.x, 0.0, 1e-3));
        assert!(approx(p.y, 1.2, 1e-3));
        assert!(approx(cam.position.z - p.z, expected, 1e-3));
        assert!(expected > cam.near && expected < cam.far);
    }

    #[test]
    fn project_unproject_roundtrip() {
        let mut cam = Camera::new();
        cam.set_viewport(640, 480);
        let world = [0.3, 0.9, 0.0];
        let clip = mat4_transform_point(&cam.view_projection_matrix(), world);
        let back = cam.unproject(clip);
        // Depth precision drops towards the far plane
        assert!(approx(back.x, world[0], 1e-2));
        assert!(approx(back.y, world[1], 1e-2));
        assert!(approx(back.z, world[2], 1e-2));
    }

    #[test]
    fn zero_viewport_keeps_aspect() {
        let mut cam = Camera::new();
        cam.set_viewport(400, 200);
        cam.set_viewport(0, 200);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn basis_vectors_are_orthonormal() {
        let cam = Camera::new();
        let r = Vec3::from_array(cam.right_vector());
        let u = Vec3::from_array(cam.up_vector());
        let f = Vec3::from_array(cam.forward_vector());
        assert!(approx(r.dot(&u), 0.0, 1e-6));
        assert!(approx(r.dot(&f), 0.0, 1e-6));
        assert!(approx(r.length(), 1.0, 1e-6));
    }
}
