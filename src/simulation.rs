//! CPU-side scene state: randomly placed objects, bouncing motion, and the
//! particle update rule the compute shader runs on the GPU.

use crate::math::Transform;
use glam::{Mat4, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// One drawable object with its color and vertical speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub transform: Transform,
    pub color: [f32; 4],
    pub velocity: f32,
}

impl SceneObject {
    pub fn new(transform: Transform, color: [f32; 4]) -> Self {
        Self {
            transform,
            color,
            velocity: 0.0,
        }
    }
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn random_color(rng: &mut StdRng) -> [f32; 4] {
    [rng.gen(), rng.gen(), rng.gen(), 1.0]
}

/// Instanced cubes scattered on a plane at z = -20
pub fn instanced_cubes(rng: &mut StdRng, count: u32) -> Vec<SceneObject> {
    (0..count)
        .map(|_| {
            let position = Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), -20.0);
            SceneObject::new(Transform::from_position(position), [1.0; 4])
        })
        .collect()
}

/// Per-instance rotation of the instanced cubes at time `t`
pub fn instanced_rotation(t: f32, index: usize) -> Vec3 {
    let phase = t + index as f32;
    Vec3::new(phase.sin(), phase.cos(), 0.0)
}

/// Randomly rotated and colored objects for the `basic_lights` sample
pub fn lights_scene(rng: &mut StdRng, count: u32) -> Vec<SceneObject> {
    (0..count)
        .map(|_| {
            let position = Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                -50.0 - rng.gen_range(0.0..50.0),
            );
            let rotation = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            let color = random_color(rng);
            SceneObject::new(Transform::new(position, rotation, Vec3::ONE), color)
        })
        .collect()
}

/// Lower and upper y bounds of the bouncing spheres
pub const BOUNCE_LIMIT: f32 = 9.0;

/// Center box, floor, then `count - 2` bouncing spheres
pub fn shadow_scene(rng: &mut StdRng, count: u32) -> Vec<SceneObject> {
    let mut objects = Vec::with_capacity(count as usize);
    objects.push(SceneObject::new(
        Transform::new(
            Vec3::new(0.0, 0.0, -20.0),
            Vec3::new(0.0, PI / 4.0, 0.0),
            Vec3::new(2.0, 20.0, 2.0),
        ),
        [0.5, 0.5, 0.5, 1.0],
    ));
    objects.push(SceneObject::new(
        Transform::new(
            Vec3::new(0.0, -10.0, -20.0),
            Vec3::ZERO,
            Vec3::new(50.0, 0.5, 40.0),
        ),
        [1.0; 4],
    ));

    for _ in 2..count {
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let position = Vec3::new(
            (1.0 + rng.gen::<f32>() * 12.0) * side,
            -8.0 + rng.gen::<f32>() * 15.0,
            -20.0 + (1.0 + rng.gen::<f32>() * 12.0) * side,
        );
        let rotation = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        let s = rng.gen::<f32>().max(0.5);
        let mut object = SceneObject::new(
            Transform::new(position, rotation, Vec3::splat(s)),
            random_color(rng),
        );
        object.velocity = (rng.gen::<f32>() / 10.0).max(0.09) * side;
        objects.push(object);
    }
    objects
}

/// Advance every sphere (index 2 onwards) and reverse it outside the limits
pub fn bounce_spheres(objects: &mut [SceneObject]) {
    for object in objects.iter_mut().skip(2) {
        object.transform.position.y += object.velocity;
        let y = object.transform.position.y;
        if !(-BOUNCE_LIMIT..=BOUNCE_LIMIT).contains(&y) {
            object.velocity = -object.velocity;
        }
    }
}

pub fn model_matrices(objects: &[SceneObject]) -> Vec<Mat4> {
    objects.iter().map(|o| o.transform.model_matrix()).collect()
}

pub fn colors(objects: &[SceneObject]) -> Vec<[f32; 4]> {
    objects.iter().map(|o| o.color).collect()
}

/// Axis-aligned box the particles bounce inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for ParticleBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-500.0, -250.0, -500.0),
            max: Vec3::new(500.0, 250.0, 500.0),
        }
    }
}

impl ParticleBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// `min <= max` on every axis
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// `[count, xmin, xmax, ymin, ymax, zmin, zmax]`, the compute shader's input
    pub fn to_input(&self, count: u32) -> [f32; 7] {
        [
            count as f32,
            self.min.x,
            self.max.x,
            self.min.y,
            self.max.y,
            self.min.z,
            self.max.z,
        ]
    }

    /// One compute step: move, clamp to the bounds, reflect on crossed axes
    pub fn step(&self, position: Vec3, velocity: Vec3) -> (Vec3, Vec3) {
        let mut pos = position.to_array();
        let mut vel = velocity.to_array();
        let (min, max) = (self.min.to_array(), self.max.to_array());
        for axis in 0..3 {
            pos[axis] += vel[axis];
            if pos[axis] < min[axis] {
                pos[axis] = min[axis];
                vel[axis] = -vel[axis];
            } else if pos[axis] > max[axis] {
                pos[axis] = max[axis];
                vel[axis] = -vel[axis];
            }
        }
        (Vec3::from(pos), Vec3::from(vel))
    }

    /// Apply `step` to the translation column of a model matrix
    pub fn step_model(&self, model: &mut Mat4, velocity: &mut Vec4) {
        let (pos, vel) = self.step(model.w_axis.truncate(), velocity.truncate());
        model.w_axis = pos.extend(model.w_axis.w);
        *velocity = vel.extend(velocity.w);
    }
}

/// Initial particle state: random positions inside the bounds, scale 2,
/// velocities in [-0.5, 0.5) per axis
pub fn particle_seed(rng: &mut StdRng, capacity: u32, bounds: &ParticleBounds) -> (Vec<Mat4>, Vec<Vec4>) {
    let mut models = Vec::with_capacity(capacity as usize);
    let mut velocities = Vec::with_capacity(capacity as usize);
    for _ in 0..capacity {
        let position = Vec3::new(
            rng.gen_range(bounds.min.x..bounds.max.x),
            rng.gen_range(bounds.min.y..bounds.max.y),
            rng.gen_range(bounds.min.z..bounds.max.z),
        );
        models.push(Transform::from_position(position).with_uniform_scale(2.0).model_matrix());
        velocities.push(Vec4::new(
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
            1.0,
        ));
    }
    (models, velocities)
}

/// Orbiting camera eye of the particle sample at time `t` seconds
pub fn particle_camera_eye(t: f32) -> Vec3 {
    let angle = t / 5.0;
    Vec3::new(1000.0 * angle.sin(), 50.0, 1000.0 * angle.cos())
}

/// `matrices[i] = projection * matrices[i]`, the CPU side of `gpu_compute`
pub fn multiply_all(projection: Mat4, matrices: &mut [Mat4]) {
    for m in matrices.iter_mut() {
        *m = projection * *m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_reflects_at_upper_bound() {
        let bounds = ParticleBounds::default();
        let (pos, vel) = bounds.step(Vec3::new(499.8, 0.0, 0.0), Vec3::new(0.4, 0.1, -0.2));
        assert_eq!(pos.x, 500.0);
        assert_eq!(vel.x, -0.4);
        assert_eq!(vel.y, 0.1);
        assert_eq!(vel.z, -0.2);
    }

    #[test]
    fn particle_reflects_at_lower_bound_on_every_axis() {
        let bounds = ParticleBounds::default();
        let (pos, vel) = bounds.step(
            Vec3::new(-499.9, -249.9, -499.9),
            Vec3::new(-0.5, -0.5, -0.5),
        );
        assert_eq!(pos, bounds.min);
        assert_eq!(vel, Vec3::splat(0.5));
    }

    #[test]
    fn inverted_bounds_are_invalid() {
        assert!(ParticleBounds::default().is_valid());
        assert!(ParticleBounds::new(Vec3::ZERO, Vec3::ZERO).is_valid());
        let inverted = ParticleBounds::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(!inverted.is_valid());
    }

    #[test]
    fn shrunk_bounds_clamp_outside_particle_in_one_step() {
        let bounds = ParticleBounds::new(Vec3::splat(-10.0), Vec3::splat(10.0));
        let (pos, vel) = bounds.step(Vec3::new(400.0, -200.0, 3.0), Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(pos, Vec3::new(10.0, -10.0, 3.5));
        assert_eq!(vel, Vec3::new(-0.5, -0.5, 0.5));
    }

    #[test]
    fn particles_stay_inside_bounds() {
        let bounds = ParticleBounds::default();
        let mut rng = seeded_rng(7);
        let (mut models, mut velocities) = particle_seed(&mut rng, 64, &bounds);
        for _ in 0..5_000 {
            for (m, v) in models.iter_mut().zip(velocities.iter_mut()) {
                bounds.step_model(m, v);
            }
        }
        for m in &models {
            let p = m.w_axis.truncate();
            assert!(p.cmpge(bounds.min).all() && p.cmple(bounds.max).all());
            assert_eq!(m.w_axis.w, 1.0);
            assert_eq!(m.x_axis.x, 2.0);
        }
    }

    #[test]
    fn shader_input_layout() {
        let input = ParticleBounds::default().to_input(150_000);
        assert_eq!(input, [150_000.0, -500.0, 500.0, -250.0, 250.0, -500.0, 500.0]);
    }

    #[test]
    fn shadow_scene_has_box_floor_and_spheres() {
        let mut rng = seeded_rng(1);
        let scene = shadow_scene(&mut rng, 30);
        assert_eq!(scene.len(), 30);
        assert_eq!(scene[0].transform.scale, Vec3::new(2.0, 20.0, 2.0));
        assert_eq!(scene[1].transform.position.y, -10.0);
        for sphere in &scene[2..] {
            assert!(sphere.velocity.abs() >= 0.09);
            assert!(sphere.transform.scale.x >= 0.5);
        }
    }

    #[test]
    fn spheres_bounce_between_limits() {
        let mut rng = seeded_rng(2);
        let mut scene = shadow_scene(&mut rng, 10);
        let floor = scene[1];
        for _ in 0..10_000 {
            bounce_spheres(&mut scene);
        }
        assert_eq!(scene[1], floor);
        for sphere in &scene[2..] {
            let y = sphere.transform.position.y;
            assert!(y.abs() <= BOUNCE_LIMIT + 0.2);
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let a = lights_scene(&mut seeded_rng(9), 20);
        let b = lights_scene(&mut seeded_rng(9), 20);
        assert_eq!(a, b);
        assert!(a.iter().all(|o| o.transform.position.z <= -50.0));
    }

    #[test]
    fn multiply_all_matches_per_matrix_product() {
        let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let original: Vec<Mat4> = (0..4)
            .map(|i| Mat4::from_translation(Vec3::splat(i as f32)))
            .collect();
        let mut matrices = original.clone();
        multiply_all(projection, &mut matrices);
        for (m, o) in matrices.iter().zip(&original) {
            assert_eq!(*m, projection * *o);
        }
    }
}
