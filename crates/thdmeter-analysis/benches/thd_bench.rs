//! Criterion benchmarks for thdmeter-analysis components
//!
//! Run with: cargo bench -p thdmeter-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use thdmeter_analysis::{
    ThdEstimator,
    fft::{Fft, Window},
    signal::{tone_with_harmonics, white_noise},
    spectrum::magnitude_spectrum,
};

const SAMPLE_RATE: u32 = 48000;

fn bench_fft_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_Forward");

    // Power-of-two sizes next to the one-second capture lengths the
    // estimator actually sees
    let sizes = [4096, 8192, 44100, 48000, 65536];

    for &size in &sizes {
        let fft = Fft::new(size);
        let input = white_noise(size, 0.5, 1);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(fft.forward(black_box(&input))))
        });
    }

    group.finish();
}

fn bench_magnitude_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Magnitude_Spectrum");
    let input = white_noise(48000, 0.5, 2);

    for window in [Window::Rectangular, Window::Hann, Window::BlackmanHarris] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &w| {
            b.iter(|| black_box(magnitude_spectrum(black_box(&input), w)))
        });
    }

    group.finish();
}

fn bench_thd_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("THD_Estimate");

    for duration in [0.25f32, 1.0, 4.0] {
        let capture =
            tone_with_harmonics(SAMPLE_RATE, 1000.0, duration, 0.5, &[(2, 0.01), (3, 0.02)]);
        let estimator = ThdEstimator::new(SAMPLE_RATE, 0.02);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{duration}s")),
            &capture,
            |b, capture| b.iter(|| black_box(estimator.analyze(black_box(capture), 1000.0))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fft_forward,
    bench_magnitude_spectrum,
    bench_thd_estimate
);
criterion_main!(benches);
