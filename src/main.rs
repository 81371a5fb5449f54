use clap::Parser;
use console::Style;
use std::path::{Path, PathBuf};
use webgpu_samples::{
    benchmark::MatrixBenchmark,
    config::{parse_hex_color, parse_size, ComputeConfig, RenderConfig, SceneParams},
    reporter,
    results::GalleryReport,
    samples,
    tui::{GallerySelection, InteractiveTui},
    webgpu::GpuContext,
    SampleError, SampleKind,
};

#[derive(Parser, Debug)]
#[command(name = "webgpu-samples")]
#[command(about = "WebGPU tutorial samples rendered offscreen through wgpu")]
struct Args {
    /// Run in batch mode (non-interactive)
    #[arg(long)]
    batch: bool,

    /// Sample to run, or "all"
    #[arg(long, short = 's', default_value = "all")]
    sample: String,

    /// Surface width
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Surface height
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Frames per sample
    #[arg(long, short = 'f', default_value_t = 120)]
    frames: u32,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Resize the surface to WxH at the halfway frame
    #[arg(long)]
    resize: Option<String>,

    /// Seed for random scenes
    #[arg(long)]
    seed: Option<u64>,

    /// Ambient light intensity (0-1)
    #[arg(long)]
    ambient: Option<f32>,

    /// Point light intensity (0-1)
    #[arg(long)]
    point: Option<f32>,

    /// Point light radius (0-40)
    #[arg(long)]
    radius: Option<f32>,

    /// Directional light intensity (0-1)
    #[arg(long)]
    dir: Option<f32>,

    /// Active particle count
    #[arg(long)]
    count: Option<u32>,

    /// Triangle color as #rrggbb
    #[arg(long)]
    color: Option<String>,

    /// Matrices multiplied by gpu_compute
    #[arg(long, short = 'n', default_value_t = 1_000_000)]
    matrices: u32,

    /// GPU dispatches timed by gpu_compute
    #[arg(long, short = 'i', default_value_t = 100)]
    iterations: u32,

    /// Workgroup size for gpu_compute
    #[arg(long, short = 'w', default_value_t = 128)]
    workgroup: u32,

    /// Write the last frame of each sample as PNG
    #[arg(long)]
    capture: Option<PathBuf>,

    /// Output file for results (.json or .csv)
    #[arg(long)]
    output: Option<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = if args.batch {
        run_batch_mode(args)
    } else {
        run_interactive_mode()
    };

    if let Err(e) = result {
        eprintln!("{} {}", Style::new().red().bold().apply_to("error:"), e);
        std::process::exit(1);
    }
}

fn run_interactive_mode() -> Result<(), SampleError> {
    let tui = InteractiveTui::new();

    let Some(selection) = tui.run() else {
        return Ok(());
    };

    println!();
    println!(
        "Running: {}",
        selection
            .samples
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Surface: {}x{}, {} frames",
        selection.render.width, selection.render.height, selection.render.frames
    );
    println!();

    let report = run_gallery(&selection, None)?;
    reporter::print_results(&report);

    if let Some(filename) = tui.ask_save_results() {
        match reporter::export(&report, &filename) {
            Ok(()) => println!("Results saved to {}", filename),
            Err(e) => eprintln!("Failed to save results: {}", e),
        }
    }
    Ok(())
}

fn run_batch_mode(args: Args) -> Result<(), SampleError> {
    let samples = match args.sample.as_str() {
        "all" => SampleKind::all(),
        name => match SampleKind::from_name(name) {
            Some(kind) => vec![kind],
            None => {
                return Err(SampleError::InvalidParameter(format!(
                    "unknown sample {}, available: all, {}",
                    name,
                    SampleKind::all()
                        .iter()
                        .map(|s| s.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )))
            }
        },
    };

    let mut render = RenderConfig::default()
        .with_size(args.width, args.height)
        .with_frames(args.frames)
        .with_fps(args.fps)
        .with_resize(args.resize.as_deref().map(parse_size).transpose()?);
    if let Some(seed) = args.seed {
        render = render.with_seed(seed);
    }
    render.validate()?;

    let mut params = SceneParams::default();
    if let Some(ambient) = args.ambient {
        params = params.with_ambient(ambient);
    }
    if let Some(point) = args.point {
        params = params.with_point_intensity(point);
    }
    if let Some(radius) = args.radius {
        params = params.with_point_radius(radius);
    }
    if let Some(dir) = args.dir {
        params = params.with_dir_intensity(dir);
    }
    if let Some(count) = args.count {
        params = params.with_particle_count(count);
    }
    if let Some(color) = args.color.as_deref() {
        params = params.with_color(parse_hex_color(color)?);
    }

    let compute = ComputeConfig::default()
        .with_matrix_count(args.matrices)
        .with_iterations(args.iterations)
        .with_workgroup_size(args.workgroup);

    let selection = GallerySelection {
        samples,
        render,
        params,
        compute,
    };
    let report = run_gallery(&selection, args.capture.as_deref())?;

    reporter::print_results(&report);

    if let Some(output) = args.output {
        reporter::export(&report, &output)?;
        println!("Results saved to {}", output);
    }
    Ok(())
}

/// `out.png` stays as is for one sample, becomes `out-<sample>.png` for several
fn capture_path(base: &Path, kind: SampleKind, several: bool) -> PathBuf {
    if !several {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    base.with_file_name(format!("{}-{}.png", stem, kind.name()))
}

fn run_gallery(selection: &GallerySelection, capture: Option<&Path>) -> Result<GalleryReport, SampleError> {
    let needs_context = selection
        .samples
        .iter()
        .any(|s| *s != SampleKind::GpuCompute);
    let ctx = if needs_context {
        Some(GpuContext::new()?)
    } else {
        None
    };
    let benchmark = if selection.samples.contains(&SampleKind::GpuCompute) {
        Some(MatrixBenchmark::new()?)
    } else {
        None
    };

    let mut report = match (&ctx, &benchmark) {
        (Some(ctx), _) => GalleryReport::new(ctx.device_name(), ctx.backend_name().to_string()),
        (None, Some(bench)) => {
            GalleryReport::new(bench.device_name(), bench.backend_name().to_string())
        }
        (None, None) => {
            return Err(SampleError::InvalidParameter("no samples selected".into()));
        }
    };

    let info_style = Style::new().dim();
    let rendering = selection
        .samples
        .iter()
        .filter(|s| s.renders_frames())
        .count();

    for &kind in &selection.samples {
        println!("{}", info_style.apply_to(format!("  Running {}...", kind.name())));

        match (kind, &ctx, &benchmark) {
            (SampleKind::HelloWebgpu, Some(ctx), _) => {
                let adapter = ctx.probe();
                reporter::print_adapter(&adapter);
                report.adapter = Some(adapter);
            }
            (SampleKind::GpuCompute, _, Some(bench)) => {
                let outcome = bench.run(&selection.compute, selection.render.seed)?;
                report.max_abs_error = Some(outcome.max_abs_error);
                report.add_benchmark(outcome.cpu);
                report.add_benchmark(outcome.gpu);
            }
            (kind, Some(ctx), _) => {
                let path = capture.map(|base| capture_path(base, kind, rendering > 1));
                let run = samples::run_frames(
                    ctx,
                    kind,
                    &selection.render,
                    &selection.params,
                    path.as_deref(),
                )?;
                reporter::print_run_line(&run);
                report.add_run(run);
            }
            _ => {}
        }
    }

    Ok(report)
}
