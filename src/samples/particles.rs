//! Compute-driven particles: a compute pass moves up to `PARTICLES_MAX`
//! cubes inside a box, then one instanced draw renders the active ones.

use super::{MeshBuffers, Sample, CLEAR_COLOR};
use crate::config::{dispatch_size, SceneParams, COMPUTE_WORKGROUP_SIZE, PARTICLES_MAX, PARTICLES_NUM};
use crate::geometry::{self, MeshVertex};
use crate::math::projection_matrix;
use crate::simulation::{self, ParticleBounds};
use crate::webgpu::{
    create_compute_pipeline, readback, shaders, GpuContext, RenderPipelineBuilder, RenderTarget,
    DEPTH_FORMAT,
};
use crate::{SampleError, SampleKind};
use glam::Mat4;
use wgpu::util::DeviceExt;

const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 10_000.0;

const MAT4_SIZE: u64 = std::mem::size_of::<Mat4>() as u64;

pub struct GpuParticles {
    render_pipeline: wgpu::RenderPipeline,
    compute_pipeline: wgpu::ComputePipeline,
    box_mesh: MeshBuffers,
    input_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    projection_buffer: wgpu::Buffer,
    render_group: wgpu::BindGroup,
    compute_group: wgpu::BindGroup,
    bounds: ParticleBounds,
    count: u32,
}

impl GpuParticles {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget, seed: u64) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        let render_pipeline = RenderPipelineBuilder::new("Particles", shaders::PARTICLE_VERT)
            .with_vertex_buffer(MeshVertex::layout())
            .with_fragment(shaders::POSITION_FRAG, target.format())
            .with_depth(DEPTH_FORMAT)
            .with_cull_mode(wgpu::Face::Back)
            .build(device)?;
        let compute_pipeline =
            create_compute_pipeline(device, "Particle Update", shaders::COMPUTE_POSITION, None)?;

        let box_mesh = MeshBuffers::new(device, "Particle Box", &geometry::box_mesh());

        // every slot up to capacity is seeded so the count can grow later
        let bounds = ParticleBounds::default();
        let count = PARTICLES_NUM;
        let (models, velocities) =
            simulation::particle_seed(&mut simulation::seeded_rng(seed), PARTICLES_MAX, &bounds);

        let input_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Input"),
            contents: bytemuck::cast_slice(&bounds.to_input(count)),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let velocity_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Velocity"),
            contents: bytemuck::cast_slice(&velocities),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Models"),
            contents: bytemuck::cast_slice(&models),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });
        let projection_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Projection"),
            size: MAT4_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle MVP"),
            size: MAT4_SIZE * PARTICLES_MAX as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        log::debug!(
            "Allocated particle buffers for {} instances ({} active)",
            PARTICLES_MAX,
            count
        );

        let compute_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Compute Bind Group"),
            layout: &compute_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: velocity_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: projection_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: mvp_buffer.as_entire_binding(),
                },
            ],
        });
        let render_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Render Bind Group"),
            layout: &render_pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: mvp_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            render_pipeline,
            compute_pipeline,
            box_mesh,
            input_buffer,
            model_buffer,
            projection_buffer,
            render_group,
            compute_group,
            bounds,
            count,
        })
    }

    /// Active particle count
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Change the active count, clamped to capacity, and re-upload the input
    pub fn set_count(&mut self, ctx: &GpuContext, count: u32) {
        self.count = count.min(PARTICLES_MAX);
        self.upload_input(ctx);
    }

    pub fn bounds(&self) -> ParticleBounds {
        self.bounds
    }

    /// Replace the bounding box; particles outside it are clamped on the next step
    pub fn set_bounds(&mut self, ctx: &GpuContext, bounds: ParticleBounds) -> Result<(), SampleError> {
        if !bounds.is_valid() {
            return Err(SampleError::InvalidParameter(format!(
                "particle bounds are inverted: min {} max {}",
                bounds.min, bounds.max
            )));
        }
        self.bounds = bounds;
        self.upload_input(ctx);
        Ok(())
    }

    fn upload_input(&self, ctx: &GpuContext) {
        ctx.queue.write_buffer(
            &self.input_buffer,
            0,
            bytemuck::cast_slice(&self.bounds.to_input(self.count)),
        );
    }

    /// Read the first `count` model matrices back from the GPU
    pub fn read_models(&self, ctx: &GpuContext, count: u32) -> Result<Vec<Mat4>, SampleError> {
        let count = count.min(PARTICLES_MAX);
        let bytes = readback::read_buffer(ctx, &self.model_buffer, MAT4_SIZE * count as u64)?;
        Ok(bytes
            .chunks_exact(MAT4_SIZE as usize)
            .map(bytemuck::pod_read_unaligned::<Mat4>)
            .collect())
    }
}

impl Sample for GpuParticles {
    fn kind(&self) -> SampleKind {
        SampleKind::GpuParticles
    }

    fn update(&mut self, ctx: &GpuContext, target: &RenderTarget, t: f32) {
        let eye = simulation::particle_camera_eye(t);
        let projection =
            projection_matrix(target.aspect(), 60f32.to_radians(), CAMERA_NEAR, CAMERA_FAR, eye);
        ctx.queue
            .write_buffer(&self.projection_buffer, 0, bytemuck::bytes_of(&projection));
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particles Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Compute Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.compute_pipeline);
            compute_pass.set_bind_group(0, &self.compute_group, &[]);
            compute_pass.dispatch_workgroups(dispatch_size(self.count, COMPUTE_WORKGROUP_SIZE), 1, 1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(target.color_attachment(CLEAR_COLOR))],
                depth_stencil_attachment: target.depth_attachment(),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.render_pipeline);
            pass.set_bind_group(0, &self.render_group, &[]);
            self.box_mesh.draw(&mut pass, 0..self.count);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    fn set_params(&mut self, ctx: &GpuContext, params: &SceneParams) {
        if params.particle_count != self.count {
            self.set_count(ctx, params.particle_count);
        }
    }
}
