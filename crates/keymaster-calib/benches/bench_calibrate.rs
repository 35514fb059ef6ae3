use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DMat3, DVec3};
use keymaster_calib::{calibrate, CalibrationConfig, FitMode, Point3, RansacParams};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generate exact correspondences under a fixed rigid motion.
fn generate_data(n: usize) -> (Vec<Point3>, Vec<Point3>) {
    let mut rng = StdRng::seed_from_u64(0);
    let rotation = DMat3::from_rotation_y(0.7) * DMat3::from_rotation_x(-0.2);
    let translation = DVec3::new(1.0, -2.0, 0.5);
    let src = (0..n)
        .map(|_| Point3::new(rng.random(), rng.random(), rng.random()))
        .collect::<Vec<_>>();
    let dst = src
        .iter()
        .map(|p| Point3::from(rotation * p.to_dvec3() + translation))
        .collect::<Vec<_>>();
    (src, dst)
}

fn bench_calibrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate");
    for &n in &[16, 256, 4096] {
        let (src, dst) = generate_data(n);
        for mode in FitMode::ALL {
            let config = CalibrationConfig {
                mode,
                ..Default::default()
            };
            group.bench_with_input(BenchmarkId::new(mode.as_str(), n), &n, |b, _| {
                b.iter(|| black_box(calibrate(&src, &dst, &config)));
            });
        }
    }
    group.finish();
}

fn bench_ransac(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate_ransac");
    for &n in &[16, 256] {
        let (src, mut dst) = generate_data(n);
        for p in dst.iter_mut().step_by(5) {
            p.z += 1.0;
        }
        let config = CalibrationConfig {
            mode: FitMode::Rigid,
            outlier_rejection: Some(RansacParams {
                max_iterations: 100,
                ..Default::default()
            }),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(calibrate(&src, &dst, &config)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calibrate, bench_ransac);
criterion_main!(benches);
