use crate::SampleError;
use serde::{Deserialize, Serialize};

/// Instance capacity of the `cubes_instance` sample
pub const CUBES_INSTANCE_NUM: u32 = 10;

/// Object count of the `basic_lights` sample (half boxes, half spheres)
pub const BASIC_LIGHTS_NUM: u32 = 500;

/// Object count of the `shadow_mapping` sample (center box, floor, spheres)
pub const SHADOW_MAPPING_NUM: u32 = 30;

/// Default active particle count
pub const PARTICLES_NUM: u32 = 150_000;

/// Particle buffer capacity, fixed at startup
pub const PARTICLES_MAX: u32 = 300_000;

/// Workgroup size of the particle and matrix compute shaders
pub const COMPUTE_WORKGROUP_SIZE: u32 = 128;

/// Matrix counts offered by the `gpu_compute` benchmark
pub const MATRIX_COUNTS: [u32; 4] = [10_000, 100_000, 500_000, 1_000_000];

/// Workgroup sizes offered by the `gpu_compute` benchmark
pub const WORKGROUP_SIZES: [u32; 3] = [64, 128, 256];

/// Offscreen surface and frame loop configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Surface width in pixels
    pub width: u32,

    /// Surface height in pixels
    pub height: u32,

    /// Number of frames the loop records and submits
    pub frames: u32,

    /// Simulated display refresh rate
    pub fps: f32,

    /// Surface size applied at the halfway frame
    pub resize_to: Option<(u32, u32)>,

    /// Seed for randomly placed scene objects
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            frames: 120,
            fps: 60.0,
            resize_to: None,
            seed: 0x5eed,
        }
    }
}

impl RenderConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_resize(mut self, size: Option<(u32, u32)>) -> Self {
        self.resize_to = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Seconds between two simulated frames
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.fps
    }

    /// Frame index at which `resize_to` is applied
    pub fn resize_frame(&self) -> u32 {
        self.frames / 2
    }

    pub fn validate(&self) -> Result<(), SampleError> {
        if self.width == 0 || self.height == 0 {
            return Err(SampleError::InvalidParameter(format!(
                "surface size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(SampleError::InvalidParameter(format!(
                "frame rate must be positive, got {}",
                self.fps
            )));
        }
        if let Some((w, h)) = self.resize_to {
            if w == 0 || h == 0 {
                return Err(SampleError::InvalidParameter(format!(
                    "resize target must be non-zero, got {}x{}",
                    w, h
                )));
            }
        }
        Ok(())
    }
}

/// Scalar inputs that the samples expose as UI controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneParams {
    /// Ambient light intensity, 0..=1
    pub ambient: f32,

    /// Point light intensity, 0..=1
    pub point_intensity: f32,

    /// Point light radius, 0..=40
    pub point_radius: f32,

    /// Directional light intensity, 0..=1
    pub dir_intensity: f32,

    /// Active particle count, clamped to `PARTICLES_MAX`
    pub particle_count: u32,

    /// Triangle color, RGBA
    pub color: [f32; 4],
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            point_intensity: 1.0,
            point_radius: 20.0,
            dir_intensity: 0.5,
            particle_count: PARTICLES_NUM,
            color: [1.0, 1.0, 0.0, 1.0],
        }
    }
}

impl SceneParams {
    pub fn with_ambient(mut self, value: f32) -> Self {
        self.ambient = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_point_intensity(mut self, value: f32) -> Self {
        self.point_intensity = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_point_radius(mut self, value: f32) -> Self {
        self.point_radius = value.clamp(0.0, 40.0);
        self
    }

    pub fn with_dir_intensity(mut self, value: f32) -> Self {
        self.dir_intensity = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_particle_count(mut self, count: u32) -> Self {
        if count > PARTICLES_MAX {
            log::warn!(
                "particle count {} exceeds capacity, clamped to {}",
                count,
                PARTICLES_MAX
            );
        }
        self.particle_count = count.min(PARTICLES_MAX);
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// Parse a `#rrggbb` color input into RGBA floats
pub fn parse_hex_color(input: &str) -> Result<[f32; 4], SampleError> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(SampleError::InvalidParameter(format!(
            "expected #rrggbb, got '{}'",
            input
        )));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| SampleError::InvalidParameter(format!("bad hex color '{}'", input)))
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0])
}

/// Parse a `WIDTHxHEIGHT` size
pub fn parse_size(input: &str) -> Result<(u32, u32), SampleError> {
    let invalid = || SampleError::InvalidParameter(format!("expected WxH, got '{}'", input));
    let (w, h) = input.split_once(['x', 'X']).ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}

/// `gpu_compute` benchmark configuration
#[derive(Debug, Clone)]
pub struct ComputeConfig {
    /// Number of 4x4 matrices multiplied per pass
    pub matrix_count: u32,

    /// CPU passes (mean reported)
    pub cpu_iterations: u32,

    /// GPU dispatches (mean reported)
    pub gpu_iterations: u32,

    /// Workgroup size for the GPU dispatch
    pub workgroup_size: u32,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            matrix_count: 1_000_000,
            cpu_iterations: 10,
            gpu_iterations: 100,
            workgroup_size: COMPUTE_WORKGROUP_SIZE,
        }
    }
}

impl ComputeConfig {
    pub fn with_matrix_count(mut self, count: u32) -> Self {
        self.matrix_count = count;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.gpu_iterations = iterations;
        self
    }

    pub fn with_cpu_iterations(mut self, iterations: u32) -> Self {
        self.cpu_iterations = iterations;
        self
    }

    pub fn with_workgroup_size(mut self, size: u32) -> Self {
        self.workgroup_size = size;
        self
    }

    /// Number of workgroups needed to cover every matrix
    pub fn num_workgroups(&self) -> u32 {
        dispatch_size(self.matrix_count, self.workgroup_size)
    }

    /// Size in bytes of one matrix array
    pub fn matrix_bytes(&self) -> u64 {
        self.matrix_count as u64 * 64
    }
}

/// `ceil(count / workgroup_size)`
pub fn dispatch_size(count: u32, workgroup_size: u32) -> u32 {
    count.div_ceil(workgroup_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_channels() {
        let c = parse_hex_color("#ff8000").unwrap();
        assert_eq!(c[0], 1.0);
        assert!((c[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[2], 0.0);
        assert_eq!(c[3], 1.0);

        assert!(parse_hex_color("00ff00").is_ok());
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn size_parses_both_separators() {
        assert_eq!(parse_size("640x480").unwrap(), (640, 480));
        assert_eq!(parse_size("1024X768").unwrap(), (1024, 768));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("640").is_err());
    }

    #[test]
    fn non_positive_frame_rate_is_rejected() {
        for fps in [0.0, -30.0, f32::NAN] {
            let config = RenderConfig::default().with_fps(fps);
            assert!(matches!(
                config.validate(),
                Err(SampleError::InvalidParameter(_))
            ));
        }
        let config = RenderConfig::default().with_fps(30.0);
        assert!(config.validate().is_ok());
        assert!((config.frame_interval() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn particle_count_never_exceeds_capacity() {
        let params = SceneParams::default().with_particle_count(PARTICLES_MAX + 1);
        assert_eq!(params.particle_count, PARTICLES_MAX);
        let params = SceneParams::default().with_particle_count(42);
        assert_eq!(params.particle_count, 42);
    }

    #[test]
    fn light_inputs_are_clamped() {
        let params = SceneParams::default()
            .with_ambient(3.0)
            .with_point_radius(-1.0)
            .with_dir_intensity(0.25);
        assert_eq!(params.ambient, 1.0);
        assert_eq!(params.point_radius, 0.0);
        assert_eq!(params.dir_intensity, 0.25);
    }

    #[test]
    fn dispatch_rounds_up() {
        assert_eq!(dispatch_size(128, 128), 1);
        assert_eq!(dispatch_size(129, 128), 2);
        assert_eq!(dispatch_size(0, 128), 0);
        assert_eq!(ComputeConfig::default().num_workgroups(), 7813);
    }

    #[test]
    fn render_config_rejects_empty_surface() {
        assert!(RenderConfig::default().validate().is_ok());
        assert!(RenderConfig::default().with_size(0, 10).validate().is_err());
        assert!(RenderConfig::default()
            .with_resize(Some((10, 0)))
            .validate()
            .is_err());
    }
}
