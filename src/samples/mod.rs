//! The rendering samples and the frame loop that drives them

mod cubes;
mod lights;
mod particles;
mod shadow;
mod triangle;

pub use cubes::{CubesDynamicOffsets, CubesInstance, RotatingCube, TexturedCube};
pub use lights::BasicLights;
pub use particles::GpuParticles;
pub use shadow::ShadowMapping;
pub use triangle::{BasicTriangle, ColorTriangle};

use crate::config::{RenderConfig, SceneParams};
use crate::geometry::{self, Mesh};
use crate::results::FrameStats;
use crate::webgpu::{GpuContext, RenderTarget};
use crate::{SampleError, SampleKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use wgpu::util::DeviceExt;

/// Background of every sample
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// One sample: GPU resources built once, then updated and drawn per frame
pub trait Sample {
    fn kind(&self) -> SampleKind;

    /// Advance simulation state to `t` seconds and upload it
    fn update(&mut self, ctx: &GpuContext, target: &RenderTarget, t: f32);

    /// Record and submit one frame into `target`
    fn render(&self, ctx: &GpuContext, target: &RenderTarget);

    /// Called after `target` changed size
    fn resize(&mut self, _ctx: &GpuContext, _target: &RenderTarget) {}

    /// Apply UI-style parameters; samples ignore the ones they do not expose
    fn set_params(&mut self, _ctx: &GpuContext, _params: &SceneParams) {}
}

/// Build the GPU resources of a rendering sample
///
/// The target is configured for the attachments the sample needs (depth,
/// multisampling) before its pipelines are created.
pub fn create_sample(
    kind: SampleKind,
    ctx: &GpuContext,
    target: &mut RenderTarget,
    config: &RenderConfig,
    params: &SceneParams,
) -> Result<Box<dyn Sample>, SampleError> {
    log::info!("Starting sample {}", kind);

    let mut sample: Box<dyn Sample> = match kind {
        SampleKind::BasicTriangle => Box::new(BasicTriangle::new(ctx, target, false)?),
        SampleKind::BasicTriangleMsaa => Box::new(BasicTriangle::new(ctx, target, true)?),
        SampleKind::ColorTriangle => Box::new(ColorTriangle::new(ctx, target)?),
        SampleKind::RotatingCube => Box::new(RotatingCube::new(ctx, target)?),
        SampleKind::CubesDynamicOffsets => Box::new(CubesDynamicOffsets::new(ctx, target)?),
        SampleKind::CubesInstance => Box::new(CubesInstance::new(ctx, target, config.seed)?),
        SampleKind::TexturedCube => Box::new(TexturedCube::new(ctx, target)?),
        SampleKind::BasicLights => Box::new(BasicLights::new(ctx, target, config.seed)?),
        SampleKind::ShadowMapping => Box::new(ShadowMapping::new(ctx, target, config.seed)?),
        SampleKind::GpuParticles => Box::new(GpuParticles::new(ctx, target, config.seed)?),
        SampleKind::HelloWebgpu | SampleKind::GpuCompute => {
            return Err(SampleError::InvalidParameter(format!(
                "{} does not render frames",
                kind
            )))
        }
    };

    sample.set_params(ctx, params);
    Ok(sample)
}

/// Run `config.frames` frames of `kind` on a simulated clock
///
/// The resize in `config.resize_to` is applied at `config.resize_frame()`.
/// When `capture` is set the last frame is written there as PNG.
pub fn run_frames(
    ctx: &GpuContext,
    kind: SampleKind,
    config: &RenderConfig,
    params: &SceneParams,
    capture: Option<&Path>,
) -> Result<FrameStats, SampleError> {
    config.validate()?;

    let mut target = RenderTarget::new(&ctx.device, config.width, config.height);
    let mut sample = create_sample(kind, ctx, &mut target, config, params)?;

    let progress = ProgressBar::new(config.frames as u64);
    progress.set_style(
        ProgressStyle::with_template("{msg:25} [{bar:40.cyan/blue}] {pos}/{len} frames")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_message(kind.name());

    let mut timings = Vec::with_capacity(config.frames as usize);
    for frame in 0..config.frames {
        if let Some((width, height)) = config.resize_to {
            if frame == config.resize_frame() {
                target.resize(&ctx.device, width, height);
                sample.resize(ctx, &target);
            }
        }

        let t = frame as f32 * config.frame_interval();
        let start = Instant::now();
        sample.update(ctx, &target, t);
        sample.render(ctx, &target);
        timings.push(start.elapsed());
        progress.inc(1);
    }
    progress.finish_and_clear();
    ctx.device.poll(wgpu::Maintain::Wait);

    if let Some(path) = capture {
        target.save_png(ctx, path)?;
    }

    Ok(FrameStats::new(
        kind,
        target.size(),
        &timings,
        kind.uses_scene_params().then_some(*params),
    ))
}

/// Sphere used by the lit samples, sized to match the unit box
pub const SPHERE_RADIUS: f32 = 0.5;
pub const SPHERE_SEGMENTS: u16 = 16;

/// Vertex and index buffers of an uploaded `Mesh`
pub(crate) struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.index_count(),
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: std::ops::Range<u32>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, instances);
    }
}

pub(crate) fn sphere_mesh() -> Mesh {
    geometry::sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS)
}

/// Command encoder + render pass boilerplate shared by the single-pass samples
pub(crate) fn submit_pass<F>(ctx: &GpuContext, target: &RenderTarget, label: &str, draw: F)
where
    F: FnOnce(&mut wgpu::RenderPass<'_>),
{
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(target.color_attachment(CLEAR_COLOR))],
            depth_stencil_attachment: target.depth_attachment(),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        draw(&mut pass);
    }
    ctx.queue.submit(std::iter::once(encoder.finish()));
}
