//! View/projection math and the camera uniform uploaded each frame.
//!
//! The camera itself lives on the [`crate::data_structures::Stage`] as a
//! position and a view direction; this module only turns that pair plus the
//! surface extent into the matrices the shaders consume.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Matrix4, Point3, Rad, Vector3, perspective};

/// wgpu clip space has z in 0..1 while cgmath produces OpenGL's -1..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Right-handed look-at from a position and a (not necessarily normalized)
/// view direction, with world up on the y axis.
pub fn view_matrix(cam_pos: Vector3<f32>, cam_dir: Vector3<f32>) -> Matrix4<f32> {
    let eye = Point3::new(cam_pos.x, cam_pos.y, cam_pos.z);
    let target = Point3::new(
        cam_pos.x + cam_dir.x,
        cam_pos.y + cam_dir.y,
        cam_pos.z + cam_dir.z,
    );
    Matrix4::look_at_rh(eye, target, Vector3::unit_y())
}

/// Perspective projection for the given surface extent, already shifted into
/// wgpu clip space. A degenerate extent falls back to a square aspect so the
/// matrix stays finite.
pub fn proj_matrix(width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    OPENGL_TO_WGPU_MATRIX * perspective(Rad(FRAC_PI_2), aspect, 0.5, 2000.0)
}

/// Per-frame camera data as the shaders see it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    cam_pos: [f32; 4],
    cam_dir: [f32; 4],
}

impl CameraUniform {
    pub fn new(cam_pos: Vector3<f32>, cam_dir: Vector3<f32>, width: u32, height: u32) -> Self {
        let view_proj = proj_matrix(width, height) * view_matrix(cam_pos, cam_dir);
        Self {
            view_proj: view_proj.into(),
            cam_pos: [cam_pos.x, cam_pos.y, cam_pos.z, 1.0],
            cam_dir: [cam_dir.x, cam_dir.y, cam_dir.z, 0.0],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0), 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn point_in_front_of_camera_lands_inside_clip_space() {
        let uniform = CameraUniform::new(
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(0.0, 0.0, -1.0),
            640,
            480,
        );
        let view_proj: Matrix4<f32> = uniform.view_proj.into();
        let clip = view_proj * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn zero_extent_does_not_poison_the_matrix() {
        let matrix = proj_matrix(0, 0);
        let column: [f32; 4] = matrix.x.into();
        assert!(column.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn uniform_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
    }
}
