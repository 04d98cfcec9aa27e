//! The matrix-multiply benchmark pipeline.
//!
//! One run fills two random operand matrices, uploads them once, times a
//! fixed number of device multiplies between two stream events, downloads
//! the final product, and verifies it against the sequential reference.
//! The operands stay on the device across iterations; only the timed loop
//! is measured.

use parlab_device::device::Device;
use parlab_device::error::{DeviceError, EventError};
use parlab_device::event::Event;
use parlab_device::gemm::launch_matmul;
use parlab_matrix::dims::{Dims, DimsError};
use parlab_matrix::matrix::Matrix;
use parlab_matrix::multiply::matmul_reference;
use parlab_matrix::verify::{compare, Tolerance, VerifyReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

/// Errors that end a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Operand dims are unusable; raised before any computation.
    #[error(transparent)]
    Dims(#[from] DimsError),
    /// The device rejected a copy or launch.
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// A timing event was read before it was recorded.
    #[error(transparent)]
    Event(#[from] EventError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Benchmark parameters.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Dims of operand A (hA x wA).
    pub dims_a: Dims,
    /// Dims of operand B (hB x wB); `wA == hB` is required.
    pub dims_b: Dims,
    /// Number of timed multiplies.
    pub iterations: u32,
    /// Device worker threads; `0` means one per CPU.
    pub workers: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            dims_a: Dims::new(160, 160),
            dims_b: Dims::new(160, 160),
            iterations: 30,
            workers: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything one benchmark run produces.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub dims_a: Dims,
    pub dims_b: Dims,
    pub dims_c: Dims,
    pub iterations: u32,
    /// Average wall-clock time of one multiply, in milliseconds.
    pub msec_per_mul: f64,
    /// Throughput derived from `ops_per_mul` and `msec_per_mul`.
    pub gflops: f64,
    /// Floating-point operations in one multiply: 2 * hC * wC * wA.
    pub ops_per_mul: f64,
    pub verify: VerifyReport,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the benchmark: fill, upload, warm up, time, download, verify.
pub fn run(config: &BenchConfig) -> Result<BenchReport, BenchError> {
    // Dimension precondition, checked before anything is allocated.
    let dims_c = config.dims_a.matmul(config.dims_b)?;

    let mut rng = StdRng::from_entropy();
    let a = Matrix::random(config.dims_a, &mut rng);
    let b = Matrix::random(config.dims_b, &mut rng);

    let device = Device::new(config.workers);
    let stream = device.default_stream();

    let d_a = device.alloc::<f32>(a.numel());
    let d_b = device.alloc::<f32>(b.numel());
    let d_c = device.alloc::<f32>(dims_c.numel());
    d_a.copy_from_host(a.data())?;
    d_b.copy_from_host(b.data())?;

    // One untimed multiply so pool and stream are warm when timing starts.
    launch_matmul(stream, config.dims_a, config.dims_b, &d_a, &d_b, &d_c)?;
    stream.synchronize()?;

    let start = Event::new();
    let stop = Event::new();
    stream.record(&start)?;
    for _ in 0..config.iterations {
        launch_matmul(stream, config.dims_a, config.dims_b, &d_a, &d_b, &d_c)?;
    }
    stream.record(&stop)?;
    stop.synchronize();
    let elapsed = stop.elapsed_since(&start)?;

    let mut host_c = vec![0.0f32; dims_c.numel()];
    d_c.copy_to_host(&mut host_c)?;
    let parallel = Matrix::from_vec(host_c, dims_c)?;

    let reference = matmul_reference(&a, &b)?;
    let verify = compare(&reference, &parallel, &Tolerance::default())?;

    let msec_total = elapsed.as_secs_f64() * 1.0e3;
    let msec_per_mul = msec_total / f64::from(config.iterations);
    let ops_per_mul =
        2.0 * dims_c.rows as f64 * dims_c.cols as f64 * config.dims_a.cols as f64;
    let gflops = (ops_per_mul * 1.0e-9) / (msec_per_mul / 1.0e3);

    Ok(BenchReport {
        dims_a: config.dims_a,
        dims_b: config.dims_b,
        dims_c,
        iterations: config.iterations,
        msec_per_mul,
        gflops,
        ops_per_mul,
        verify,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BenchConfig {
        BenchConfig {
            dims_a: Dims::new(12, 16),
            dims_b: Dims::new(16, 8),
            iterations: 3,
            workers: 2,
        }
    }

    #[test]
    fn bench_default_config_matches_program_surface() {
        let config = BenchConfig::default();
        assert_eq!(config.dims_a, Dims::new(160, 160));
        assert_eq!(config.dims_b, Dims::new(160, 160));
        assert_eq!(config.iterations, 30);
    }

    #[test]
    fn bench_run_passes_verification() {
        let report = run(&small_config()).unwrap();
        assert!(report.verify.passed);
        assert!(report.verify.mismatches.is_empty());
        assert_eq!(report.dims_c, Dims::new(12, 8));
    }

    #[test]
    fn bench_run_derives_operation_count() {
        let report = run(&small_config()).unwrap();
        // 2 * hC * wC * wA = 2 * 12 * 8 * 16
        assert_eq!(report.ops_per_mul, 3072.0);
        assert_eq!(report.iterations, 3);
        assert!(report.msec_per_mul >= 0.0);
    }

    #[test]
    fn bench_run_rejects_incompatible_dims() {
        let config = BenchConfig {
            dims_a: Dims::new(4, 5),
            dims_b: Dims::new(6, 4),
            iterations: 1,
            workers: 1,
        };
        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Dims(DimsError::Incompatible { .. })
        ));
    }

    #[test]
    fn bench_report_serializes() {
        let report = run(&small_config()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["iterations"], 3);
        assert_eq!(json["verify"]["passed"], true);
        assert_eq!(json["dims_c"]["rows"], 12);
    }
}
