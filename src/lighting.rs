//! Light uniforms and CPU references for the lit samples' fragment math.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Depth bias subtracted before the shadow comparison
pub const SHADOW_BIAS: f32 = 0.005;

/// Constant ambient term of the shadow sample
pub const SHADOW_AMBIENT: f32 = 0.3;

/// Shadow map resolution (square)
pub const SHADOW_MAP_SIZE: u32 = 2048;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AmbientUniform {
    pub intensity: f32,
    _pad: [f32; 3],
}

impl AmbientUniform {
    pub fn new(intensity: f32) -> Self {
        Self {
            intensity,
            _pad: [0.0; 3],
        }
    }
}

/// `array<vec4<f32>, 2>`: position, then (intensity, radius, _, _)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub intensity: f32,
    pub radius: f32,
    _pad: [f32; 2],
}

impl PointLightUniform {
    pub fn new(position: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            intensity,
            radius,
            _pad: [0.0; 2],
        }
    }
}

/// `array<vec4<f32>, 2>`: direction, then (intensity, _, _, _)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    pub direction: [f32; 4],
    pub intensity: f32,
    _pad: [f32; 3],
}

impl DirectionalLightUniform {
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.extend(0.0).to_array(),
            intensity,
            _pad: [0.0; 3],
        }
    }
}

/// Point light orbit of the `basic_lights` sample at time `t` seconds
pub fn point_light_position(t: f32) -> Vec3 {
    Vec3::new(10.0 * t.sin(), 10.0 * t.cos(), -60.0 + 10.0 * t.cos())
}

/// Directional light sweep of the `basic_lights` sample at time `t` seconds
pub fn directional_light_direction(t: f32) -> Vec3 {
    Vec3::new((t / 1.5).sin(), 0.0, (t / 1.5).cos())
}

pub fn lambert(light_dir: Vec3, normal: Vec3) -> f32 {
    light_dir.normalize_or_zero().dot(normal).max(0.0)
}

/// Point light contribution with `(1 - d / r)^2` falloff inside the radius
pub fn point_light_term(light: &PointLightUniform, frag_position: Vec3, normal: Vec3) -> f32 {
    let to_light = Vec4::from(light.position).truncate() - frag_position;
    let distance = to_light.length();
    if distance >= light.radius {
        return 0.0;
    }
    let falloff = (1.0 - distance / light.radius).powi(2);
    light.intensity * lambert(to_light, normal) * falloff
}

/// Map a light-space clip position to shadow-map UV (y flipped) plus depth
pub fn shadow_coords(light_clip: Vec4) -> Vec3 {
    let uv = light_clip.truncate().truncate() * Vec2::new(0.5, -0.5) + Vec2::splat(0.5);
    uv.extend(light_clip.z)
}

/// Texel offsets of the 3x3 PCF kernel for a square map of `size` texels
pub fn pcf_offsets(size: u32) -> [Vec2; 9] {
    let texel = 1.0 / size.max(1) as f32;
    let mut offsets = [Vec2::ZERO; 9];
    for (i, offset) in offsets.iter_mut().enumerate() {
        let x = (i % 3) as f32 - 1.0;
        let y = (i / 3) as f32 - 1.0;
        *offset = Vec2::new(x, y) * texel;
    }
    offsets
}

/// Average of the nine comparison results
pub fn pcf_shadow_factor(lit: &[bool; 9]) -> f32 {
    lit.iter().filter(|&&l| l).count() as f32 / 9.0
}

/// Nearest-texel PCF over a row-major depth map, matching the fragment shader
pub fn sample_shadow_map(depths: &[f32], size: u32, coords: Vec3) -> f32 {
    let reference = coords.z - SHADOW_BIAS;
    let max = size.saturating_sub(1) as f32;
    let lit = pcf_offsets(size).map(|offset| {
        let uv = coords.truncate() + offset;
        let x = (uv.x * size as f32).floor().clamp(0.0, max) as usize;
        let y = (uv.y * size as f32).floor().clamp(0.0, max) as usize;
        depths
            .get(y * size as usize + x)
            .map(|&stored| reference < stored)
            .unwrap_or(true)
    });
    pcf_shadow_factor(&lit)
}

/// `min(ambient + shadow * diffuse, 1)`
pub fn light_factor(shadow: f32, diffuse: f32) -> f32 {
    (SHADOW_AMBIENT + shadow * diffuse).min(1.0)
}

/// Light orbit of the shadow sample: radius 50 at height 100
pub fn shadow_light_position(t: f32) -> Vec3 {
    Vec3::new((t / 1.5).sin() * 50.0, 100.0, (t / 1.5).cos() * 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layouts() {
        assert_eq!(std::mem::size_of::<AmbientUniform>(), 16);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<DirectionalLightUniform>(), 32);
    }

    #[test]
    fn pcf_factor_is_bounded() {
        assert_eq!(pcf_shadow_factor(&[false; 9]), 0.0);
        assert_eq!(pcf_shadow_factor(&[true; 9]), 1.0);
        for mask in 0u32..512 {
            let lit: [bool; 9] = std::array::from_fn(|i| mask & (1 << i) != 0);
            let f = pcf_shadow_factor(&lit);
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn shadow_coords_flip_y_into_uv_space() {
        let c = shadow_coords(Vec4::new(-1.0, 1.0, 0.25, 1.0));
        assert_eq!(c, Vec3::new(0.0, 0.0, 0.25));
        let c = shadow_coords(Vec4::new(1.0, -1.0, 0.75, 1.0));
        assert_eq!(c, Vec3::new(1.0, 1.0, 0.75));
    }

    #[test]
    fn pcf_kernel_is_centered() {
        let offsets = pcf_offsets(SHADOW_MAP_SIZE);
        assert_eq!(offsets[4], Vec2::ZERO);
        let sum: Vec2 = offsets.iter().sum();
        assert!(sum.length() < 1e-9);
        assert_eq!(offsets[0], Vec2::splat(-1.0 / 2048.0));
    }

    #[test]
    fn shadow_map_sampling_respects_bias() {
        let size = 8;
        let depths = vec![0.5; (size * size) as usize];
        // in front of the occluder
        assert_eq!(sample_shadow_map(&depths, size, Vec3::new(0.5, 0.5, 0.3)), 1.0);
        // behind it
        assert_eq!(sample_shadow_map(&depths, size, Vec3::new(0.5, 0.5, 0.9)), 0.0);
        // on the surface itself: bias keeps it lit
        assert_eq!(sample_shadow_map(&depths, size, Vec3::new(0.5, 0.5, 0.5)), 1.0);
    }

    #[test]
    fn shadow_edge_is_softened() {
        let size = 8u32;
        // left half occluded at depth 0.2, right half open
        let depths: Vec<f32> = (0..size * size)
            .map(|i| if i % size < 4 { 0.2 } else { 1.0 })
            .collect();
        let on_edge = Vec3::new(4.0 / 8.0 + 0.01, 0.5, 0.6);
        let f = sample_shadow_map(&depths, size, on_edge);
        assert!((f - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn light_factor_adds_ambient_and_saturates() {
        assert_eq!(light_factor(0.0, 1.0), SHADOW_AMBIENT);
        assert_eq!(light_factor(1.0, 1.0), 1.0);
        assert!((light_factor(0.5, 0.4) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn point_light_falls_off_to_zero_at_radius() {
        let light = PointLightUniform::new(Vec3::ZERO, 1.0, 20.0);
        let n = Vec3::Y;
        assert!((point_light_term(&light, Vec3::new(0.0, -10.0, 0.0), n) - 0.25).abs() < 1e-6);
        assert_eq!(point_light_term(&light, Vec3::new(0.0, -20.0, 0.0), n), 0.0);
        assert_eq!(point_light_term(&light, Vec3::new(0.0, 5.0, 0.0), n), 0.0);
    }

    #[test]
    fn shadow_light_orbits_at_fixed_radius() {
        for t in [0.0, 1.0, 7.5, 100.0] {
            let p = shadow_light_position(t);
            assert_eq!(p.y, 100.0);
            assert!((Vec2::new(p.x, p.z).length() - 50.0).abs() < 1e-3);
        }
    }
}
