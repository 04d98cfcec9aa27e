use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parlab_device::device::Device;
use parlab_device::gemm::multiply;
use parlab_matrix::dims::Dims;
use parlab_matrix::matrix::Matrix;
use parlab_matrix::multiply::matmul_reference;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn matmul_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul");

    // Square sizes around the program's fixed 160x160 surface.
    for n in [32usize, 96, 160] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let a = Matrix::random(Dims::new(n, n), &mut rng);
        let b = Matrix::random(Dims::new(n, n), &mut rng);

        // Sequential reference path
        group.bench_with_input(BenchmarkId::new("reference", n), &n, |bench, _| {
            bench.iter(|| {
                let product = matmul_reference(black_box(&a), black_box(&b)).unwrap();
                black_box(product)
            });
        });

        // Device path (copies included; one worker per CPU)
        let device = Device::new(0);
        group.bench_with_input(BenchmarkId::new("device", n), &n, |bench, _| {
            bench.iter(|| {
                let product = multiply(&device, black_box(&a), black_box(&b)).unwrap();
                black_box(product)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, matmul_benchmark);
criterion_main!(benches);
