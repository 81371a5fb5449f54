//! WebGPU plumbing shared by the samples (cross-platform through wgpu)

mod device;
mod pipeline;
pub mod readback;
pub mod shaders;
mod target;

pub use device::{probe_adapter, GpuContext, LimitsRequest};
pub use pipeline::{
    buffer_layout_entry, create_compute_pipeline, create_shader_module, RenderPipelineBuilder,
};
pub use target::{RenderTarget, COLOR_FORMAT, DEPTH_FORMAT};
