//! Perspective camera for view and projection matrix generation.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

/// GPU layout of the camera: view-projection plus eye position (80 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

/// A perspective camera. The projection is reverse-Z: near maps to depth 1.0.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Orientation; the camera looks down its local -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height of the drawing surface.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// A camera at `position` facing -Z, with `fov_degrees` vertical field of view.
    pub fn perspective(
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
        position: Vec3,
    ) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Reverse-Z projection: near and far are passed swapped.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Turn to face `target`, keeping world +Y as up. No-op if `target`
    /// coincides with the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            return;
        };
        let right = forward
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or_else(|| self.rotation * Vec3::X);
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize();
    }

    /// Set the aspect ratio from a surface size. Zero height is ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(75.0, 16.0 / 9.0, 0.1, 100.0, Vec3::new(0.0, 0.0, 2.0))
    }
}
