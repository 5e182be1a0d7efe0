use criterion::{criterion_group, criterion_main, Criterion};
use stemfx_dsp::biquad::{BiquadCoeffs, BiquadState};

fn bench_peak(c: &mut Criterion) {
    let input: Vec<f32> = (0..2 * 512).map(|n| (n as f32 * 0.01).sin()).collect();
    let mut output = vec![0.0f32; input.len()];
    let coeffs = BiquadCoeffs::peak(44_100.0, 400.0, -3.0, 1.5);
    c.bench_function("peak 2x512", |b| {
        b.iter(|| {
            let mut state = BiquadState::new();
            for (out, &x) in output.iter_mut().zip(&input) {
                *out = state.process(x, &coeffs);
            }
        })
    });
}

criterion_group!(benches, bench_peak);
criterion_main!(benches);
