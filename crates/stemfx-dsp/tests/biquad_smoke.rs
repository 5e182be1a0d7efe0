use stemfx_dsp::biquad::{BiquadCoeffs, BiquadState, BUTTERWORTH_Q};

#[test]
fn lowpass_step_stability() {
    let coeffs = BiquadCoeffs::lowpass(48_000.0, 1_000.0, BUTTERWORTH_Q);
    let mut state = BiquadState::new();
    let mut y = 0.0;
    for _ in 0..10_000 {
        y = state.process(1.0, &coeffs);
    }
    assert!(y.is_finite());
    assert!((y - 1.0).abs() < 1e-3);
}

#[test]
fn extreme_shelf_stays_finite() {
    let coeffs = BiquadCoeffs::high_shelf(22_050.0, 30_000.0, 24.0, 0.01);
    let mut state = BiquadState::new();
    for n in 0..4_096 {
        let x = if n % 2 == 0 { 1.0 } else { -1.0 };
        assert!(state.process(x, &coeffs).is_finite());
    }
}
