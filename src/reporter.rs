use crate::results::{AdapterReport, BenchmarkResult, FrameStats, GalleryReport};
use crate::SampleError;
use console::Style;
use serde::Serialize;
use std::path::Path;

const RULE: &str =
    "================================================================================";

fn print_banner(title: &str) {
    let header_style = Style::new().bold().cyan();
    println!();
    println!("{}", header_style.apply_to(RULE));
    println!("{}", header_style.apply_to(format!("{:^80}", title)));
    println!("{}", header_style.apply_to(RULE));
    println!();
}

/// Print the `hello_webgpu` probe
pub fn print_adapter(report: &AdapterReport) {
    let label_style = Style::new().bold();
    let value_style = Style::new().green();

    print_banner("HELLO WEBGPU");

    println!(
        "{}: {} ({}, {})",
        label_style.apply_to("Adapter"),
        value_style.apply_to(&report.name),
        report.device_type,
        report.backend
    );
    println!(
        "{}: vendor {:#06x}, device {:#06x}",
        label_style.apply_to("PCI ids"),
        report.vendor,
        report.device
    );
    if !report.driver.is_empty() {
        println!(
            "{}: {} {}",
            label_style.apply_to("Driver"),
            report.driver,
            report.driver_info
        );
    }
    println!();

    println!("{}", label_style.apply_to("Features:"));
    if report.features.is_empty() {
        println!("  (none)");
    }
    for feature in &report.features {
        println!("  {}", feature);
    }
    println!();

    println!("{}", label_style.apply_to("Limits:"));
    for (name, value) in &report.limits {
        println!("  {:<48} {:>20}", name, value);
    }
    println!("{}", Style::new().bold().cyan().apply_to(RULE));
    println!();
}

/// Print a single frame-loop line (for live updates)
pub fn print_run_line(run: &FrameStats) {
    println!(
        "{:<25} {:>8} {:>11} {:>12.3} {:>12.3} {:>12.3}",
        run.sample,
        run.frames,
        format!("{}x{}", run.width, run.height),
        run.frame_time.min_ms(),
        run.frame_time.mean_ms(),
        run.frame_time.max_ms(),
    );
}

fn print_benchmark_line(result: &BenchmarkResult) {
    let workgroup = result
        .workgroup_size
        .map(|w| w.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{:<10} {:>12} {:>10} {:>12.3} {:>12.3} {:>16.0}",
        result.processor,
        result.matrix_count,
        workgroup,
        result.timing.min_ms(),
        result.mean_ms(),
        result.matrices_per_second,
    );
}

/// Print gallery results to console
pub fn print_results(report: &GalleryReport) {
    let label_style = Style::new().bold();
    let value_style = Style::new().green();

    print_banner("WEBGPU SAMPLES RESULTS");

    println!(
        "{}: {} ({})",
        label_style.apply_to("Device"),
        value_style.apply_to(&report.device_name),
        &report.backend
    );
    println!();

    if !report.runs.is_empty() {
        println!(
            "{:<25} {:>8} {:>11} {:>12} {:>12} {:>12}",
            label_style.apply_to("Sample"),
            label_style.apply_to("Frames"),
            label_style.apply_to("Size"),
            label_style.apply_to("Min (ms)"),
            label_style.apply_to("Mean (ms)"),
            label_style.apply_to("Max (ms)"),
        );
        println!("{}", "-".repeat(80));
        for run in &report.runs {
            print_run_line(run);
        }
        println!();
    }

    if !report.benchmarks.is_empty() {
        println!(
            "{:<10} {:>12} {:>10} {:>12} {:>12} {:>16}",
            label_style.apply_to("Matrix x"),
            label_style.apply_to("Count"),
            label_style.apply_to("WG Size"),
            label_style.apply_to("Min (ms)"),
            label_style.apply_to("Mean (ms)"),
            label_style.apply_to("Matrices/s"),
        );
        println!("{}", "-".repeat(80));
        for result in &report.benchmarks {
            print_benchmark_line(result);
        }
        println!();

        if let Some(speedup) = report.gpu_speedup() {
            println!("{}", label_style.apply_to("Comparison:"));
            println!("- GPU vs CPU: {:.1}x faster", speedup);
        }
        if let Some(error) = report.max_abs_error {
            println!("- max |cpu - gpu|: {:.2e}", error);
        }
    }

    println!("{}", Style::new().bold().cyan().apply_to(RULE));
    println!();
}

/// Export the report to a JSON file
pub fn export_json(report: &GalleryReport, path: impl AsRef<Path>) -> Result<(), SampleError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    kind: &'a str,
    name: &'a str,
    count: u64,
    width: Option<u32>,
    height: Option<u32>,
    workgroup_size: Option<u32>,
    min_ms: f64,
    mean_ms: f64,
    max_ms: f64,
    std_dev_ms: f64,
    throughput: Option<f64>,
}

/// Export frame runs and benchmark results to one CSV file
pub fn export_csv(report: &GalleryReport, path: impl AsRef<Path>) -> Result<(), SampleError> {
    let mut writer = csv::Writer::from_path(path)?;

    for run in &report.runs {
        writer.serialize(CsvRow {
            kind: "frame",
            name: &run.sample,
            count: run.frames as u64,
            width: Some(run.width),
            height: Some(run.height),
            workgroup_size: None,
            min_ms: run.frame_time.min_ms(),
            mean_ms: run.frame_time.mean_ms(),
            max_ms: run.frame_time.max_ms(),
            std_dev_ms: run.frame_time.std_dev_ns / 1e6,
            throughput: None,
        })?;
    }

    for result in &report.benchmarks {
        writer.serialize(CsvRow {
            kind: "matrix_multiply",
            name: result.processor.name(),
            count: result.matrix_count as u64,
            width: None,
            height: None,
            workgroup_size: result.workgroup_size,
            min_ms: result.timing.min_ms(),
            mean_ms: result.mean_ms(),
            max_ms: result.timing.max_ms(),
            std_dev_ms: result.timing.std_dev_ns / 1e6,
            throughput: Some(result.matrices_per_second),
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Pick the exporter from the file extension
pub fn export(report: &GalleryReport, path: &str) -> Result<(), SampleError> {
    if path.ends_with(".csv") {
        export_csv(report, path)
    } else {
        export_json(report, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{BenchmarkResult, Processor};
    use crate::SampleKind;
    use std::time::Duration;

    fn sample_report() -> GalleryReport {
        let mut report = GalleryReport::new("Test GPU".into(), "Vulkan".into());
        report.add_run(FrameStats::new(
            SampleKind::RotatingCube,
            (320, 240),
            &[Duration::from_millis(1), Duration::from_millis(3)],
            None,
        ));
        report.add_benchmark(BenchmarkResult::from_timings(
            Processor::Gpu,
            10_000,
            Some(128),
            &[Duration::from_millis(2)],
        ));
        report
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("webgpu-samples-{}-{}", std::process::id(), name))
    }

    #[test]
    fn csv_has_one_row_per_result() {
        let path = temp_path("report.csv");
        export(&sample_report(), path.to_str().unwrap()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("kind,name,count,width,height"));
        assert!(lines[1].starts_with("frame,rotating_cube,2,320,240,,"));
        assert!(lines[2].starts_with("matrix_multiply,gpu,10000,,,128,"));
    }

    #[test]
    fn json_round_trips_report() {
        let path = temp_path("report.json");
        export(&sample_report(), path.to_str().unwrap()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let parsed: GalleryReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.device_name, "Test GPU");
        assert_eq!(parsed.runs[0].sample, "rotating_cube");
        assert_eq!(parsed.benchmarks[0].processor, Processor::Gpu);
    }
}
