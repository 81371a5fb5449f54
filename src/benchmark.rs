//! `gpu_compute`: `projection * model` over N matrices on the CPU and on the GPU

use crate::config::ComputeConfig;
use crate::math::{projection_matrix, Transform};
use crate::results::{BenchmarkResult, Processor};
use crate::simulation::{multiply_all, seeded_rng};
use crate::webgpu::{readback, shaders, create_compute_pipeline, GpuContext, LimitsRequest};
use crate::SampleError;
use glam::{Mat4, Vec3};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::time::Instant;
use wgpu::util::DeviceExt;

/// Largest accepted difference between a CPU and a GPU matrix element
pub const GPU_TOLERANCE: f32 = 1e-3;

const WARMUP_DISPATCHES: u32 = 2;

/// Both sides of one benchmark run
#[derive(Debug, Clone)]
pub struct ComputeOutcome {
    pub cpu: BenchmarkResult,
    pub gpu: BenchmarkResult,
    pub max_abs_error: f32,
}

impl ComputeOutcome {
    pub fn within_tolerance(&self) -> bool {
        self.max_abs_error <= GPU_TOLERANCE
    }
}

/// Random model matrices, reproducible from `seed`
pub fn benchmark_models(seed: u64, count: u32) -> Vec<Mat4> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            Transform::new(
                Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-30.0..-5.0),
                ),
                Vec3::new(rng.gen(), rng.gen(), rng.gen()),
                Vec3::ONE,
            )
            .model_matrix()
        })
        .collect()
}

pub fn benchmark_projection() -> Mat4 {
    projection_matrix(1.0, 60f32.to_radians(), 0.1, 100.0, Vec3::new(0.0, 0.0, 5.0))
}

/// Largest element-wise difference between two matrix lists
pub fn max_abs_error(a: &[Mat4], b: &[Mat4]) -> f32 {
    a.iter()
        .zip(b)
        .flat_map(|(x, y)| {
            x.to_cols_array()
                .into_iter()
                .zip(y.to_cols_array())
                .map(|(p, q)| (p - q).abs())
        })
        .fold(0.0, f32::max)
}

fn progress_bar(len: u32, message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::with_template("{msg:25} [{bar:40.cyan/blue}] {pos}/{len} passes")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_message(message);
    progress
}

/// Time `config.cpu_iterations` passes of `multiply_all`, each on a fresh copy
pub fn run_cpu(config: &ComputeConfig, models: &[Mat4], projection: Mat4) -> (BenchmarkResult, Vec<Mat4>) {
    let progress = progress_bar(config.cpu_iterations, "cpu multiply");
    let mut timings = Vec::with_capacity(config.cpu_iterations as usize);
    let mut result = models.to_vec();

    for _ in 0..config.cpu_iterations.max(1) {
        result.copy_from_slice(models);
        let start = Instant::now();
        multiply_all(projection, &mut result);
        timings.push(start.elapsed());
        progress.inc(1);
    }
    progress.finish_and_clear();

    (
        BenchmarkResult::from_timings(Processor::Cpu, config.matrix_count, None, &timings),
        result,
    )
}

/// Reject configurations the device cannot dispatch or bind
pub fn check_compute_limits(config: &ComputeConfig, limits: &wgpu::Limits) -> Result<(), SampleError> {
    if config.matrix_count == 0 {
        return Err(SampleError::InvalidParameter(
            "matrix count must be non-zero".into(),
        ));
    }
    if config.matrix_bytes() > limits.max_storage_buffer_binding_size as u64 {
        return Err(SampleError::BufferCreation(format!(
            "{} matrices need {} bytes, storage bindings are limited to {}",
            config.matrix_count,
            config.matrix_bytes(),
            limits.max_storage_buffer_binding_size
        )));
    }
    if config.workgroup_size == 0
        || config.workgroup_size > limits.max_compute_workgroup_size_x
        || config.workgroup_size > limits.max_compute_invocations_per_workgroup
    {
        return Err(SampleError::InvalidParameter(format!(
            "workgroup size {} is not supported by this device",
            config.workgroup_size
        )));
    }
    if config.num_workgroups() > limits.max_compute_workgroups_per_dimension {
        return Err(SampleError::InvalidParameter(format!(
            "{} matrices at workgroup size {} need {} workgroups, the device allows {}",
            config.matrix_count,
            config.workgroup_size,
            config.num_workgroups(),
            limits.max_compute_workgroups_per_dimension
        )));
    }
    Ok(())
}

/// GPU side of the benchmark
pub struct MatrixBenchmark {
    ctx: GpuContext,
}

impl MatrixBenchmark {
    /// Device with the adapter's full limits, for large storage buffers
    pub fn new() -> Result<Self, SampleError> {
        Ok(Self {
            ctx: GpuContext::with_limits(LimitsRequest::AdapterMax)?,
        })
    }

    pub fn device_name(&self) -> String {
        self.ctx.device_name()
    }

    pub fn backend_name(&self) -> &'static str {
        self.ctx.backend_name()
    }

    /// Run both sides and compare the results
    pub fn run(&self, config: &ComputeConfig, seed: u64) -> Result<ComputeOutcome, SampleError> {
        log::info!(
            "Multiplying {} matrices ({} cpu / {} gpu passes, workgroup {})",
            config.matrix_count,
            config.cpu_iterations,
            config.gpu_iterations,
            config.workgroup_size
        );
        check_compute_limits(config, &self.ctx.device.limits())?;

        let models = benchmark_models(seed, config.matrix_count);
        let projection = benchmark_projection();

        let (cpu, expected) = run_cpu(config, &models, projection);
        let (gpu, actual) = self.run_gpu(config, &models, projection)?;
        let max_abs_error = max_abs_error(&expected, &actual);

        if max_abs_error > GPU_TOLERANCE {
            log::warn!(
                "GPU result differs from CPU by {:.2e} (tolerance {:.0e})",
                max_abs_error,
                GPU_TOLERANCE
            );
        }

        Ok(ComputeOutcome {
            cpu,
            gpu,
            max_abs_error,
        })
    }

    /// Time `config.gpu_iterations` dispatches and read the product back
    pub fn run_gpu(
        &self,
        config: &ComputeConfig,
        models: &[Mat4],
        projection: Mat4,
    ) -> Result<(BenchmarkResult, Vec<Mat4>), SampleError> {
        check_compute_limits(config, &self.ctx.device.limits())?;
        let device = &self.ctx.device;

        let source = shaders::compute_transform(config.workgroup_size);
        let pipeline = create_compute_pipeline(device, "Matrix Transform", &source, None)?;

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Matrices"),
            contents: bytemuck::cast_slice(models),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Projection Matrix"),
            contents: bytemuck::bytes_of(&projection),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let mvp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MVP Matrices"),
            size: config.matrix_bytes(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let count_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Matrix Count"),
            contents: bytemuck::cast_slice(&[config.matrix_count, 0, 0, 0]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Matrix Transform Bind Group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: projection_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: mvp_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: count_buffer.as_entire_binding(),
                },
            ],
        });

        for _ in 0..WARMUP_DISPATCHES {
            self.dispatch(&pipeline, &bind_group, config);
        }

        let progress = progress_bar(config.gpu_iterations, "gpu multiply");
        let mut timings = Vec::with_capacity(config.gpu_iterations as usize);
        for _ in 0..config.gpu_iterations {
            let start = Instant::now();
            self.dispatch(&pipeline, &bind_group, config);
            timings.push(start.elapsed());
            progress.inc(1);
        }
        progress.finish_and_clear();

        let bytes = readback::read_buffer(&self.ctx, &mvp_buffer, config.matrix_bytes())?;
        let result = bytes
            .chunks_exact(std::mem::size_of::<Mat4>())
            .map(bytemuck::pod_read_unaligned::<Mat4>)
            .collect();

        Ok((
            BenchmarkResult::from_timings(
                Processor::Gpu,
                config.matrix_count,
                Some(config.workgroup_size),
                &timings,
            ),
            result,
        ))
    }

    /// Submit one dispatch and wait for it
    fn dispatch(&self, pipeline: &wgpu::ComputePipeline, bind_group: &wgpu::BindGroup, config: &ComputeConfig) {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Matrix Transform Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Matrix Transform Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, bind_group, &[]);
            compute_pass.dispatch_workgroups(config.num_workgroups(), 1, 1);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        self.ctx.device.poll(wgpu::Maintain::Wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_are_reproducible() {
        assert_eq!(benchmark_models(3, 16), benchmark_models(3, 16));
        assert_ne!(benchmark_models(3, 16), benchmark_models(4, 16));
    }

    #[test]
    fn error_is_largest_element_difference() {
        let a = vec![Mat4::IDENTITY; 3];
        let mut b = a.clone();
        assert_eq!(max_abs_error(&a, &b), 0.0);
        b[2].w_axis.x = 0.25;
        b[1].x_axis.y = -0.5;
        assert_eq!(max_abs_error(&a, &b), 0.5);
    }

    #[test]
    fn empty_matrix_set_is_rejected() {
        let config = ComputeConfig::default().with_matrix_count(0);
        let result = check_compute_limits(&config, &wgpu::Limits::default());
        assert!(matches!(result, Err(SampleError::InvalidParameter(_))));
    }

    #[test]
    fn dispatch_wider_than_device_is_rejected() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: u32::MAX,
            ..wgpu::Limits::default()
        };
        let config = ComputeConfig::default()
            .with_matrix_count(5_000_000)
            .with_workgroup_size(64);
        assert_eq!(config.num_workgroups(), 78_125);
        let result = check_compute_limits(&config, &limits);
        assert!(matches!(result, Err(SampleError::InvalidParameter(_))));

        let config = config.with_workgroup_size(256);
        assert!(check_compute_limits(&config, &limits).is_ok());
    }

    #[test]
    fn default_config_fits_default_limits() {
        assert!(check_compute_limits(&ComputeConfig::default(), &wgpu::Limits::default()).is_ok());
    }

    #[test]
    fn cpu_pass_matches_single_multiply() {
        let config = ComputeConfig::default()
            .with_matrix_count(64)
            .with_cpu_iterations(3);
        let models = benchmark_models(1, config.matrix_count);
        let projection = benchmark_projection();

        let (result, product) = run_cpu(&config, &models, projection);
        assert_eq!(result.processor, Processor::Cpu);
        assert_eq!(result.timing.samples, 3);
        for (p, m) in product.iter().zip(&models) {
            assert_eq!(*p, projection * *m);
        }
    }
}
