use super::{sphere_mesh, submit_pass, MeshBuffers, Sample};
use crate::config::{SceneParams, BASIC_LIGHTS_NUM};
use crate::geometry::{self, MeshVertex};
use crate::lighting::{
    directional_light_direction, point_light_position, AmbientUniform, DirectionalLightUniform,
    PointLightUniform,
};
use crate::math::Camera;
use crate::simulation;
use crate::webgpu::{shaders, GpuContext, RenderPipelineBuilder, RenderTarget, DEPTH_FORMAT};
use crate::{SampleError, SampleKind};
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Boxes and spheres lit by ambient, point and directional lights
///
/// The first half of the instances are boxes, the second half spheres.
pub struct BasicLights {
    pipeline: wgpu::RenderPipeline,
    box_mesh: MeshBuffers,
    sphere_mesh: MeshBuffers,
    projection_buffer: wgpu::Buffer,
    ambient_buffer: wgpu::Buffer,
    point_buffer: wgpu::Buffer,
    directional_buffer: wgpu::Buffer,
    object_group: wgpu::BindGroup,
    light_group: wgpu::BindGroup,
    camera: Camera,
    params: SceneParams,
    count: u32,
}

impl BasicLights {
    pub fn new(ctx: &GpuContext, target: &mut RenderTarget, seed: u64) -> Result<Self, SampleError> {
        let device = &ctx.device;
        target.enable_depth(device);

        let pipeline = RenderPipelineBuilder::new("Basic Lights", shaders::NORMAL_VERT)
            .with_vertex_buffer(MeshVertex::layout())
            .with_fragment(shaders::LAMBERT_FRAG, target.format())
            .with_depth(DEPTH_FORMAT)
            .with_cull_mode(wgpu::Face::Back)
            .build(device)?;

        let box_mesh = MeshBuffers::new(device, "Box", &geometry::box_mesh());
        let sphere_mesh = MeshBuffers::new(device, "Sphere", &sphere_mesh());

        let objects = simulation::lights_scene(&mut simulation::seeded_rng(seed), BASIC_LIGHTS_NUM);
        let model_views = simulation::model_matrices(&objects);
        let model_view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model View Storage"),
            contents: bytemuck::cast_slice(&model_views),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Color Storage"),
            contents: bytemuck::cast_slice(&simulation::colors(&objects)),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let camera = Camera::default();
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Projection Uniform"),
            contents: bytemuck::bytes_of(&camera.view_projection(target.aspect())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let params = SceneParams::default();
        let ambient_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ambient Light"),
            contents: bytemuck::bytes_of(&AmbientUniform::new(params.ambient)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let point_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Light"),
            contents: bytemuck::bytes_of(&PointLightUniform::new(
                point_light_position(0.0),
                params.point_intensity,
                params.point_radius,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let directional_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Directional Light"),
            contents: bytemuck::bytes_of(&DirectionalLightUniform::new(
                directional_light_direction(0.0),
                params.dir_intensity,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let object_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_view_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: projection_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: color_buffer.as_entire_binding(),
                },
            ],
        });
        let light_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Light Bind Group"),
            layout: &pipeline.get_bind_group_layout(1),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ambient_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: point_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: directional_buffer.as_entire_binding(),
                },
            ],
        });

        Ok(Self {
            pipeline,
            box_mesh,
            sphere_mesh,
            projection_buffer,
            ambient_buffer,
            point_buffer,
            directional_buffer,
            object_group,
            light_group,
            camera,
            params,
            count: objects.len() as u32,
        })
    }

    fn projection(&self, target: &RenderTarget) -> Mat4 {
        self.camera.view_projection(target.aspect())
    }
}

impl Sample for BasicLights {
    fn kind(&self) -> SampleKind {
        SampleKind::BasicLights
    }

    fn update(&mut self, ctx: &GpuContext, _target: &RenderTarget, t: f32) {
        let ambient = AmbientUniform::new(self.params.ambient);
        let point = PointLightUniform::new(
            point_light_position(t),
            self.params.point_intensity,
            self.params.point_radius,
        );
        let directional =
            DirectionalLightUniform::new(directional_light_direction(t), self.params.dir_intensity);

        ctx.queue
            .write_buffer(&self.ambient_buffer, 0, bytemuck::bytes_of(&ambient));
        ctx.queue
            .write_buffer(&self.point_buffer, 0, bytemuck::bytes_of(&point));
        ctx.queue
            .write_buffer(&self.directional_buffer, 0, bytemuck::bytes_of(&directional));
    }

    fn render(&self, ctx: &GpuContext, target: &RenderTarget) {
        let half = self.count / 2;
        submit_pass(ctx, target, "Basic Lights Pass", |pass| {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.object_group, &[]);
            pass.set_bind_group(1, &self.light_group, &[]);
            self.box_mesh.draw(pass, 0..half);
            self.sphere_mesh.draw(pass, half..self.count);
        });
    }

    fn resize(&mut self, ctx: &GpuContext, target: &RenderTarget) {
        let projection = self.projection(target);
        ctx.queue
            .write_buffer(&self.projection_buffer, 0, bytemuck::bytes_of(&projection));
    }

    fn set_params(&mut self, _ctx: &GpuContext, params: &SceneParams) {
        // uploaded with the light positions on the next update
        self.params = *params;
    }
}
