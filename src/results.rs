use crate::config::SceneParams;
use crate::SampleKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Min / max / mean / standard deviation of a set of timings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingStats {
    pub samples: usize,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub std_dev_ns: f64,
}

impl TimingStats {
    pub fn from_timings(timings: &[Duration]) -> Self {
        let timings_ns: Vec<u64> = timings.iter().map(|d| d.as_nanos() as u64).collect();

        let min_ns = *timings_ns.iter().min().unwrap_or(&0);
        let max_ns = *timings_ns.iter().max().unwrap_or(&0);
        let sum: u64 = timings_ns.iter().sum();
        let mean_ns = sum as f64 / timings_ns.len().max(1) as f64;

        let variance: f64 = timings_ns
            .iter()
            .map(|&t| (t as f64 - mean_ns).powi(2))
            .sum::<f64>()
            / timings_ns.len().max(1) as f64;

        Self {
            samples: timings_ns.len(),
            min_ns,
            max_ns,
            mean_ns,
            std_dev_ns: variance.sqrt(),
        }
    }

    pub fn min_ms(&self) -> f64 {
        self.min_ns as f64 / 1e6
    }

    pub fn mean_ms(&self) -> f64 {
        self.mean_ns / 1e6
    }

    pub fn max_ms(&self) -> f64 {
        self.max_ns as f64 / 1e6
    }
}

/// Where a matrix multiplication pass ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    Cpu,
    Gpu,
}

impl Processor {
    pub fn name(&self) -> &'static str {
        match self {
            Processor::Cpu => "cpu",
            Processor::Gpu => "gpu",
        }
    }
}

impl std::fmt::Display for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of one side of the matrix multiplication benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub processor: Processor,

    /// Matrices multiplied per pass
    pub matrix_count: u32,

    /// Workgroup size (GPU only)
    pub workgroup_size: Option<u32>,

    /// Per-pass timing statistics
    pub timing: TimingStats,

    /// Derived metric, from the mean pass time
    pub matrices_per_second: f64,
}

impl BenchmarkResult {
    pub fn from_timings(
        processor: Processor,
        matrix_count: u32,
        workgroup_size: Option<u32>,
        timings: &[Duration],
    ) -> Self {
        let timing = TimingStats::from_timings(timings);
        let matrices_per_second = if timing.mean_ns > 0.0 {
            matrix_count as f64 / (timing.mean_ns / 1e9)
        } else {
            0.0
        };

        Self {
            processor,
            matrix_count,
            workgroup_size,
            timing,
            matrices_per_second,
        }
    }

    pub fn mean_ms(&self) -> f64 {
        self.timing.mean_ms()
    }
}

/// Frame loop statistics of one rendered sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameStats {
    pub sample: String,
    pub frames: u32,
    pub width: u32,
    pub height: u32,

    /// Time to record and submit one frame (CPU side)
    pub frame_time: TimingStats,

    pub params: Option<SceneParams>,
}

impl FrameStats {
    pub fn new(
        sample: SampleKind,
        (width, height): (u32, u32),
        timings: &[Duration],
        params: Option<SceneParams>,
    ) -> Self {
        Self {
            sample: sample.name().to_string(),
            frames: timings.len() as u32,
            width,
            height,
            frame_time: TimingStats::from_timings(timings),
            params,
        }
    }
}

/// Everything a gallery run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryReport {
    /// Device information
    pub device_name: String,
    pub backend: String,

    pub adapter: Option<AdapterReport>,
    pub runs: Vec<FrameStats>,
    pub benchmarks: Vec<BenchmarkResult>,

    /// Largest absolute difference between CPU and GPU results, if checked
    pub max_abs_error: Option<f32>,

    /// Timestamp of the report
    pub timestamp: String,
}

impl GalleryReport {
    pub fn new(device_name: String, backend: String) -> Self {
        Self {
            device_name,
            backend,
            adapter: None,
            runs: Vec::new(),
            benchmarks: Vec::new(),
            max_abs_error: None,
            timestamp: unix_timestamp(),
        }
    }

    pub fn add_run(&mut self, run: FrameStats) {
        self.runs.push(run);
    }

    pub fn add_benchmark(&mut self, result: BenchmarkResult) {
        self.benchmarks.push(result);
    }

    /// GPU speedup over the CPU for the same matrix count
    pub fn gpu_speedup(&self) -> Option<f64> {
        let cpu = self
            .benchmarks
            .iter()
            .find(|r| r.processor == Processor::Cpu)?;
        let gpu = self
            .benchmarks
            .iter()
            .find(|r| r.processor == Processor::Gpu && r.matrix_count == cpu.matrix_count)?;

        if gpu.timing.mean_ns > 0.0 {
            Some(cpu.timing.mean_ns / gpu.timing.mean_ns)
        } else {
            None
        }
    }
}

/// Capabilities reported by the `hello_webgpu` probe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdapterReport {
    pub name: String,
    pub vendor: u32,
    pub device: u32,
    pub device_type: String,
    pub backend: String,
    pub driver: String,
    pub driver_info: String,
    pub features: Vec<String>,
    pub limits: Vec<(String, u64)>,
}

impl AdapterReport {
    pub fn limit(&self, name: &str) -> Option<u64> {
        self.limits
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// Seconds since the Unix epoch
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|&v| Duration::from_millis(v)).collect()
    }

    #[test]
    fn stats_from_timings() {
        let stats = TimingStats::from_timings(&ms(&[2, 4, 4, 4, 5, 5, 7, 9]));
        assert_eq!(stats.samples, 8);
        assert_eq!(stats.min_ms(), 2.0);
        assert_eq!(stats.max_ms(), 9.0);
        assert!((stats.mean_ms() - 5.0).abs() < 1e-9);
        assert!((stats.std_dev_ns / 1e6 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_timings_are_zero() {
        let stats = TimingStats::from_timings(&[]);
        assert_eq!(stats, TimingStats::default());
        let result = BenchmarkResult::from_timings(Processor::Gpu, 10, Some(64), &[]);
        assert_eq!(result.matrices_per_second, 0.0);
    }

    #[test]
    fn throughput_uses_mean_time() {
        let result = BenchmarkResult::from_timings(Processor::Cpu, 1000, None, &ms(&[1, 3]));
        assert!((result.matrices_per_second - 500_000.0).abs() < 1e-6);
    }

    #[test]
    fn speedup_compares_matching_counts() {
        let mut report = GalleryReport::new("Test".into(), "Vulkan".into());
        assert!(report.gpu_speedup().is_none());
        report.add_benchmark(BenchmarkResult::from_timings(Processor::Cpu, 100, None, &ms(&[40])));
        report.add_benchmark(BenchmarkResult::from_timings(Processor::Gpu, 100, Some(128), &ms(&[4])));
        assert!((report.gpu_speedup().unwrap() - 10.0).abs() < 1e-9);
    }
}
