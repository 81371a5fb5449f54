//! Transform and projection builders shared by every sample.
//!
//! Matrices are column-major `glam::Mat4` in a right-handed view space.
//! Projections use the WebGPU clip convention: NDC depth runs from 0 at the
//! near plane to 1 at the far plane.

use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Field of view used by `mvp_matrix` (72 degrees)
pub const MVP_FOV: f32 = 2.0 * PI / 5.0;
pub const MVP_NEAR: f32 = 1.0;
pub const MVP_FAR: f32 = 100.0;

/// Orthographic volume of the shadow-casting light
pub const LIGHT_ORTHO_HALF_EXTENT: f32 = 40.0;
pub const LIGHT_ORTHO_NEAR: f32 = -50.0;
pub const LIGHT_ORTHO_FAR: f32 = 200.0;

/// Position, per-axis rotation (radians) and non-uniform scale of one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// `T * Rx * Ry * Rz * S`
    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(self.position, self.rotation, self.scale)
    }
}

/// Compose translation, rotations applied in X, Y, Z order, and scale
pub fn model_matrix(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_z(rotation.z)
        * Mat4::from_scale(scale)
}

/// Perspective camera looking at a fixed target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(fov: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            near,
            far,
            ..Self::default()
        }
    }

    pub fn with_eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self
    }

    /// Look-at view matrix. An eye placed on the target yields identity.
    pub fn view(&self) -> Mat4 {
        if self.eye.abs_diff_eq(self.target, f32::EPSILON) {
            Mat4::IDENTITY
        } else {
            Mat4::look_at_rh(self.eye, self.target, self.up)
        }
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// `Perspective * LookAt`
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

/// `Perspective(fov, aspect, near, far) * LookAt(eye, origin, +Y)`
pub fn projection_matrix(aspect: f32, fov: f32, near: f32, far: f32, eye: Vec3) -> Mat4 {
    Camera::new(fov, near, far)
        .with_eye(eye)
        .view_projection(aspect)
}

/// MVP for the single-object samples: 72 degree perspective, near 1, far 100
pub fn mvp_matrix(aspect: f32, transform: &Transform) -> Mat4 {
    Mat4::perspective_rh(MVP_FOV, aspect, MVP_NEAR, MVP_FAR) * transform.model_matrix()
}

/// Orthographic view-projection of a light looking at the origin
pub fn light_space_matrix(light_position: Vec3) -> Mat4 {
    let e = LIGHT_ORTHO_HALF_EXTENT;
    let projection = Mat4::orthographic_rh(-e, e, -e, e, LIGHT_ORTHO_NEAR, LIGHT_ORTHO_FAR);
    projection * Mat4::look_at_rh(light_position, Vec3::ZERO, Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPS: f32 = 1e-5;

    #[test]
    fn identity_rotation_and_scale_is_pure_translation() {
        let t = Transform::from_position(Vec3::new(1.0, -2.0, 3.5));
        let m = t.model_matrix();
        assert!(m.abs_diff_eq(Mat4::from_translation(t.position), EPS));
        assert_eq!(m.w_axis, Vec4::new(1.0, -2.0, 3.5, 1.0));
    }

    #[test]
    fn perspective_maps_near_to_zero_and_far_to_one() {
        let (near, far) = (1.0, 100.0);
        let p = Mat4::perspective_rh(MVP_FOV, 1.5, near, far);

        let at_near = p * Vec4::new(0.0, 0.0, -near, 1.0);
        let at_far = p * Vec4::new(0.0, 0.0, -far, 1.0);

        assert!((at_near.z / at_near.w).abs() < EPS);
        assert!((at_far.z / at_far.w - 1.0).abs() < EPS);
    }

    #[test]
    fn composition_is_associative() {
        let p = projection_matrix(1.3, 60f32.to_radians(), 0.1, 100.0, Vec3::new(0.0, 10.0, 20.0));
        let a = model_matrix(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 0.2, 0.1), Vec3::ONE);
        let b = model_matrix(Vec3::new(-4.0, 0.5, -9.0), Vec3::new(1.0, -0.7, 2.0), Vec3::new(2.0, 0.5, 1.0));
        assert!(((p * a) * b).abs_diff_eq(p * (a * b), 1e-3));
    }

    #[test]
    fn model_matrix_round_trips_through_inverse() {
        let m = model_matrix(
            Vec3::new(3.0, -1.0, -20.0),
            Vec3::new(0.4, 1.1, -0.6),
            Vec3::new(2.0, 20.0, 2.0),
        );
        assert!((m * m.inverse()).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn rotations_apply_x_then_y_then_z() {
        let r = Vec3::new(0.5, 0.25, 1.0);
        let m = model_matrix(Vec3::ZERO, r, Vec3::ONE);
        let expected = Mat4::from_rotation_x(r.x) * Mat4::from_rotation_y(r.y) * Mat4::from_rotation_z(r.z);
        assert!(m.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn single_cube_mvp_matches_independent_computation() {
        let transform = Transform::from_position(Vec3::new(0.0, 0.0, -5.0));
        let mvp = mvp_matrix(1.0, &transform);
        let expected = Mat4::perspective_rh(72f32.to_radians(), 1.0, 1.0, 100.0)
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        assert!(mvp.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn camera_at_target_has_identity_view() {
        let camera = Camera::default();
        assert_eq!(camera.view(), Mat4::IDENTITY);
        let moved = camera.with_eye(Vec3::new(0.0, 0.0, 20.0));
        let origin = moved.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.z + 20.0).abs() < EPS);
    }

    #[test]
    fn light_space_keeps_origin_inside_clip_volume() {
        let lsm = light_space_matrix(Vec3::new(50.0, 100.0, 0.0));
        let clip = lsm * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < EPS && clip.y.abs() < EPS);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}
