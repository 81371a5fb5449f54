pub mod config;
pub mod geometry;
pub mod lighting;
pub mod math;
pub mod reporter;
pub mod results;
pub mod simulation;
pub mod tui;

#[cfg(feature = "webgpu")]
pub mod benchmark;

#[cfg(feature = "webgpu")]
pub mod samples;

#[cfg(feature = "webgpu")]
pub mod webgpu;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("No WebGPU adapter found")]
    NoAdapter,

    #[error("No GPU device: {0}")]
    NoDevice(String),

    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),

    #[error("Pipeline creation failed: {0}")]
    PipelineCreation(String),

    #[error("Buffer creation failed: {0}")]
    BufferCreation(String),

    #[error("Readback failed: {0}")]
    Readback(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The samples in the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    HelloWebgpu,
    BasicTriangle,
    BasicTriangleMsaa,
    ColorTriangle,
    RotatingCube,
    CubesDynamicOffsets,
    CubesInstance,
    TexturedCube,
    BasicLights,
    ShadowMapping,
    GpuParticles,
    GpuCompute,
}

impl SampleKind {
    pub fn name(&self) -> &'static str {
        match self {
            SampleKind::HelloWebgpu => "hello_webgpu",
            SampleKind::BasicTriangle => "basic_triangle",
            SampleKind::BasicTriangleMsaa => "basic_triangle_msaa",
            SampleKind::ColorTriangle => "color_triangle",
            SampleKind::RotatingCube => "rotating_cube",
            SampleKind::CubesDynamicOffsets => "cubes_dynamic_offsets",
            SampleKind::CubesInstance => "cubes_instance",
            SampleKind::TexturedCube => "textured_cube",
            SampleKind::BasicLights => "basic_lights",
            SampleKind::ShadowMapping => "shadow_mapping",
            SampleKind::GpuParticles => "gpu_particles",
            SampleKind::GpuCompute => "gpu_compute",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SampleKind::HelloWebgpu => "Adapter info, features and limits",
            SampleKind::BasicTriangle => "Red triangle generated in the vertex shader",
            SampleKind::BasicTriangleMsaa => "Red triangle with 4x MSAA",
            SampleKind::ColorTriangle => "Vertex-buffer triangle with a uniform color",
            SampleKind::RotatingCube => "Single cube, MVP uniform updated per frame",
            SampleKind::CubesDynamicOffsets => "Two cubes sharing one uniform via dynamic offsets",
            SampleKind::CubesInstance => "Instanced cubes with a storage buffer of MVPs",
            SampleKind::TexturedCube => "Rotating cube sampling a checkerboard texture",
            SampleKind::BasicLights => "Ambient, point and directional lighting",
            SampleKind::ShadowMapping => "Directional shadow map with 3x3 PCF",
            SampleKind::GpuParticles => "Compute-driven bouncing cubes",
            SampleKind::GpuCompute => "GPU vs CPU matrix multiplication benchmark",
        }
    }

    /// Returns true if the sample renders frames (as opposed to probing or benchmarking)
    pub fn renders_frames(&self) -> bool {
        !matches!(self, SampleKind::HelloWebgpu | SampleKind::GpuCompute)
    }

    /// Returns true if the sample reads any of the scene parameters
    pub fn uses_scene_params(&self) -> bool {
        matches!(
            self,
            SampleKind::ColorTriangle | SampleKind::BasicLights | SampleKind::GpuParticles
        )
    }

    pub fn all() -> Vec<SampleKind> {
        vec![
            SampleKind::HelloWebgpu,
            SampleKind::BasicTriangle,
            SampleKind::BasicTriangleMsaa,
            SampleKind::ColorTriangle,
            SampleKind::RotatingCube,
            SampleKind::CubesDynamicOffsets,
            SampleKind::CubesInstance,
            SampleKind::TexturedCube,
            SampleKind::BasicLights,
            SampleKind::ShadowMapping,
            SampleKind::GpuParticles,
            SampleKind::GpuCompute,
        ]
    }

    /// Samples that draw frames through the frame loop
    pub fn rendering() -> Vec<SampleKind> {
        Self::all()
            .into_iter()
            .filter(|s| s.renders_frames())
            .collect()
    }

    pub fn from_name(name: &str) -> Option<SampleKind> {
        Self::all().into_iter().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_names_round_trip() {
        for kind in SampleKind::all() {
            assert_eq!(SampleKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SampleKind::from_name("nope"), None);
    }

    #[test]
    fn probe_and_benchmark_do_not_render() {
        let rendering = SampleKind::rendering();
        assert!(!rendering.contains(&SampleKind::HelloWebgpu));
        assert!(!rendering.contains(&SampleKind::GpuCompute));
        assert_eq!(rendering.len(), SampleKind::all().len() - 2);
    }
}
