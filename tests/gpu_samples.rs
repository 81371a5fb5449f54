//! End-to-end checks against a real adapter. Each test returns early when
//! the machine has no WebGPU adapter.

use glam::Vec3;
use webgpu_samples::benchmark::MatrixBenchmark;
use webgpu_samples::config::{ComputeConfig, RenderConfig, SceneParams, PARTICLES_MAX};
use webgpu_samples::samples::{self, BasicTriangle, ColorTriangle, GpuParticles, Sample};
use webgpu_samples::simulation::{self, ParticleBounds};
use webgpu_samples::webgpu::{create_shader_module, probe_adapter, GpuContext, RenderTarget};
use webgpu_samples::{SampleError, SampleKind};

fn context() -> Option<GpuContext> {
    match GpuContext::new() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping: {}", e);
            None
        }
    }
}

fn center_pixel(ctx: &GpuContext, target: &RenderTarget) -> [u8; 4] {
    let (width, height) = target.size();
    let pixels = target.read_pixels(ctx).unwrap();
    assert_eq!(pixels.len(), (width * height * 4) as usize);
    let offset = (((height / 2) * width + width / 2) * 4) as usize;
    [
        pixels[offset],
        pixels[offset + 1],
        pixels[offset + 2],
        pixels[offset + 3],
    ]
}

#[test]
fn basic_triangle_covers_center_in_red() {
    let Some(ctx) = context() else { return };
    let mut target = RenderTarget::new(&ctx.device, 64, 64);
    let mut sample = BasicTriangle::new(&ctx, &mut target, false).unwrap();

    sample.update(&ctx, &target, 0.0);
    sample.render(&ctx, &target);

    assert_eq!(center_pixel(&ctx, &target), [255, 0, 0, 255]);
}

#[test]
fn msaa_triangle_resolves_to_red() {
    let Some(ctx) = context() else { return };
    let mut target = RenderTarget::new(&ctx.device, 64, 64);
    let sample = BasicTriangle::new(&ctx, &mut target, true).unwrap();
    assert_eq!(sample.kind(), SampleKind::BasicTriangleMsaa);
    assert_eq!(target.sample_count(), 4);

    sample.render(&ctx, &target);

    assert_eq!(center_pixel(&ctx, &target), [255, 0, 0, 255]);
}

#[test]
fn color_triangle_uses_uniform_color() {
    let Some(ctx) = context() else { return };
    let mut target = RenderTarget::new(&ctx.device, 64, 64);
    let mut sample = ColorTriangle::new(&ctx, &mut target).unwrap();

    sample.set_params(&ctx, &SceneParams::default().with_color([0.0, 1.0, 0.0, 1.0]));
    sample.render(&ctx, &target);

    assert_eq!(center_pixel(&ctx, &target), [0, 255, 0, 255]);
}

#[test]
fn particle_step_matches_cpu() {
    let Some(ctx) = context() else { return };
    let seed = 11;
    let active = 100;

    let mut target = RenderTarget::new(&ctx.device, 64, 64);
    let mut sample = GpuParticles::new(&ctx, &mut target, seed).unwrap();
    sample.set_count(&ctx, active);
    assert_eq!(sample.count(), active);

    sample.update(&ctx, &target, 0.0);
    sample.render(&ctx, &target);
    let gpu = sample.read_models(&ctx, active + 1).unwrap();

    let bounds = ParticleBounds::default();
    let (mut expected, mut velocities) =
        simulation::particle_seed(&mut simulation::seeded_rng(seed), active + 1, &bounds);
    let untouched = expected[active as usize];
    for (model, velocity) in expected.iter_mut().zip(velocities.iter_mut()).take(active as usize) {
        bounds.step_model(model, velocity);
    }

    for (i, (g, e)) in gpu.iter().zip(&expected).enumerate().take(active as usize) {
        assert!(
            g.abs_diff_eq(*e, 1e-3),
            "particle {} differs: {:?} vs {:?}",
            i,
            g.w_axis,
            e.w_axis
        );
    }
    assert_eq!(gpu[active as usize], untouched);
}

#[test]
fn particle_count_is_clamped_to_capacity() {
    let Some(ctx) = context() else { return };
    let mut target = RenderTarget::new(&ctx.device, 32, 32);
    let mut sample = GpuParticles::new(&ctx, &mut target, 1).unwrap();
    sample.set_count(&ctx, PARTICLES_MAX + 1);
    assert_eq!(sample.count(), PARTICLES_MAX);
}

#[test]
fn particles_follow_runtime_bounds() {
    let Some(ctx) = context() else { return };
    let mut target = RenderTarget::new(&ctx.device, 32, 32);
    let mut sample = GpuParticles::new(&ctx, &mut target, 3).unwrap();
    sample.set_count(&ctx, 256);

    let inverted = ParticleBounds::new(Vec3::splat(1.0), Vec3::splat(-1.0));
    assert!(matches!(
        sample.set_bounds(&ctx, inverted),
        Err(SampleError::InvalidParameter(_))
    ));
    assert_eq!(sample.bounds(), ParticleBounds::default());

    let bounds = ParticleBounds::new(Vec3::splat(-10.0), Vec3::splat(10.0));
    sample.set_bounds(&ctx, bounds).unwrap();
    sample.update(&ctx, &target, 0.0);
    sample.render(&ctx, &target);

    for model in sample.read_models(&ctx, 256).unwrap() {
        let p = model.w_axis.truncate();
        assert!(p.cmpge(bounds.min).all() && p.cmple(bounds.max).all(), "{} escaped", p);
    }
}

#[test]
fn frame_loop_applies_resize() {
    let Some(ctx) = context() else { return };
    let config = RenderConfig::default()
        .with_size(96, 64)
        .with_frames(4)
        .with_resize(Some((48, 48)));

    let stats = samples::run_frames(
        &ctx,
        SampleKind::RotatingCube,
        &config,
        &SceneParams::default(),
        None,
    )
    .unwrap();

    assert_eq!(stats.frames, 4);
    assert_eq!((stats.width, stats.height), (48, 48));
}

#[test]
fn every_rendering_sample_runs_a_few_frames() {
    let Some(ctx) = context() else { return };
    let config = RenderConfig::default().with_size(64, 48).with_frames(2);
    let params = SceneParams::default().with_particle_count(1_000);

    for kind in SampleKind::rendering() {
        let stats = samples::run_frames(&ctx, kind, &config, &params, None)
            .unwrap_or_else(|e| panic!("{} failed: {}", kind, e));
        assert_eq!(stats.sample, kind.name());
    }
}

#[test]
fn capture_writes_png() {
    let Some(ctx) = context() else { return };
    let path = std::env::temp_dir().join("webgpu_samples_capture_test.png");
    let config = RenderConfig::default().with_size(32, 32).with_frames(1);

    samples::run_frames(
        &ctx,
        SampleKind::BasicTriangle,
        &config,
        &SceneParams::default(),
        Some(&path),
    )
    .unwrap();

    let image = image::open(&path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (32, 32));
    assert_eq!(image.get_pixel(16, 16).0, [255, 0, 0, 255]);
    std::fs::remove_file(&path).ok();
}

#[test]
fn broken_shader_reports_compilation_error() {
    let Some(ctx) = context() else { return };
    let result = create_shader_module(&ctx.device, "Broken", "fn main( {");
    assert!(matches!(result, Err(SampleError::ShaderCompilation(_))));
}

#[test]
fn adapter_report_lists_limits() {
    let Some(ctx) = context() else { return };
    let report = ctx.probe();
    assert!(!report.backend.is_empty());
    assert!(report.limits.len() > 10);
    assert!(report.limit("max_bind_groups").unwrap_or(0) >= 4);
}

#[test]
fn standalone_adapter_report_lists_limits() {
    if GpuContext::new().is_err() {
        return;
    }
    let report = probe_adapter().unwrap();
    assert!(report.limit("max_compute_workgroup_size_x").unwrap_or(0) >= 64);
}

#[test]
fn gpu_compute_matches_cpu() {
    if GpuContext::new().is_err() {
        return;
    }
    let bench = MatrixBenchmark::new().unwrap();
    let config = ComputeConfig::default()
        .with_matrix_count(1_000)
        .with_cpu_iterations(1)
        .with_iterations(2)
        .with_workgroup_size(64);

    let outcome = bench.run(&config, 5).unwrap();
    assert!(outcome.within_tolerance(), "error {}", outcome.max_abs_error);
    assert_eq!(outcome.gpu.timing.samples, 2);
}
