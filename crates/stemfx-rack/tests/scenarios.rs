use std::f32::consts::TAU;
use std::sync::Arc;

use stemfx_rack::stages::BuiltinStageFactory;
use stemfx_rack::{
    apply_effects, AudioArray, AudioBuffer, InstrumentFamily, Layout, Rack, RackError, Shape,
    StageKind, StageRegistry, DEFAULT_PRESET,
};

const SAMPLE_RATE: u32 = 44_100;

fn sine(freq: f32, amplitude: f32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE as f32).sin() * amplitude)
        .collect()
}

/// Half a second of 440 Hz / 220 Hz sines at 0.2.
fn two_tone() -> Vec<Vec<f32>> {
    let frames = SAMPLE_RATE as usize / 2;
    vec![sine(440.0, 0.2, frames), sine(220.0, 0.2, frames)]
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(0.0f32, |max, (x, y)| max.max((x - y).abs()))
}

#[test]
fn bass_default_keeps_shape_and_respects_limiter() {
    let input = AudioArray::from_rows(two_tone()).unwrap();
    let mut rack = Rack::new(InstrumentFamily::Bass, DEFAULT_PRESET).unwrap();
    let output = rack.process(&input, SAMPLE_RATE).unwrap();

    assert_eq!(output.shape(), input.shape());
    let peak = output.data().iter().fold(0.0f32, |p, s| p.max(s.abs()));
    assert!(peak <= 0.945, "peak {peak}");
    assert!(output.data().iter().all(|s| s.is_finite()));
}

#[test]
fn bass_fuzz_differs_from_default() {
    let input = AudioArray::from_rows(two_tone()).unwrap();
    let default = apply_effects(InstrumentFamily::Bass, &input, SAMPLE_RATE, "default", None).unwrap();
    let fuzz = apply_effects(InstrumentFamily::Bass, &input, SAMPLE_RATE, "fuzz", None).unwrap();
    assert!(max_abs_diff(default.data(), fuzz.data()) > 1e-3);
}

#[test]
fn time_major_and_channel_major_agree() {
    let rows = two_tone();
    let channel_major = AudioArray::from_rows(rows.clone()).unwrap();
    let frames = rows[0].len();
    let interleaved: Vec<f32> = (0..frames).flat_map(|n| [rows[0][n], rows[1][n]]).collect();
    let time_major = AudioArray::matrix(frames, 2, interleaved).unwrap();

    for family in InstrumentFamily::ALL {
        let mut rack = Rack::new(family, family.default_preset()).unwrap();
        let a = rack.process(&channel_major, SAMPLE_RATE).unwrap();
        let b = rack.process(&time_major, SAMPLE_RATE).unwrap();
        assert_eq!(a.shape(), Shape::Matrix { rows: 2, cols: frames });
        assert_eq!(b.shape(), Shape::Matrix { rows: frames, cols: 2 });

        let a = a.to_time_major().unwrap();
        assert!(max_abs_diff(a.data(), b.data()) < 1e-6, "{family}");
    }
}

#[test]
fn explicit_layout_overrides_the_heuristic() {
    // Three channels of two frames would be guessed as time-major.
    let data = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
    let input = AudioArray::matrix(3, 2, data)
        .unwrap()
        .with_layout(Layout::ChannelMajor);
    let mut rack = Rack::new(InstrumentFamily::Synth, DEFAULT_PRESET).unwrap();
    let output = rack.process(&input, SAMPLE_RATE).unwrap();
    assert_eq!(output.shape(), Shape::Matrix { rows: 3, cols: 2 });
    assert_eq!(output.layout(), Some(Layout::ChannelMajor));
}

#[test]
fn same_seed_same_output() {
    let input = AudioArray::from_rows(two_tone()).unwrap();
    for family in InstrumentFamily::ALL {
        let a = apply_effects(family, &input, SAMPLE_RATE, DEFAULT_PRESET, Some(42)).unwrap();
        let b = apply_effects(family, &input, SAMPLE_RATE, DEFAULT_PRESET, Some(42)).unwrap();
        assert!(max_abs_diff(a.data(), b.data()) <= 1e-6, "{family}");
    }
}

#[test]
fn neighbouring_seeds_differ() {
    let input = AudioArray::from_rows(two_tone()).unwrap();
    for family in InstrumentFamily::ALL {
        let a = apply_effects(family, &input, SAMPLE_RATE, DEFAULT_PRESET, Some(7)).unwrap();
        let b = apply_effects(family, &input, SAMPLE_RATE, DEFAULT_PRESET, Some(8)).unwrap();
        assert!(max_abs_diff(a.data(), b.data()) > 1e-6, "{family}");
    }
}

#[test]
fn seeded_randomization_is_reproducible_on_settings() {
    let mut a = Rack::new(InstrumentFamily::Guitar, "clean").unwrap();
    let mut b = Rack::new(InstrumentFamily::Guitar, "clean").unwrap();
    a.randomize_parameters(Some(1234)).unwrap();
    b.randomize_parameters(Some(1234)).unwrap();
    assert_eq!(a.current_settings(), b.current_settings());
    assert_eq!(a.chain(), b.chain());
}

#[test]
fn randomization_only_touches_listed_keys() {
    let family = InstrumentFamily::Vocal;
    let mut rack = Rack::new(family, DEFAULT_PRESET).unwrap();
    rack.randomize_parameters(Some(3)).unwrap();
    let defaults = family.layout().defaults();
    let listed: Vec<&str> = family.random_ranges().iter().map(|r| r.id).collect();
    for (key, value) in rack.current_settings() {
        if !listed.contains(&key.as_str()) {
            assert_eq!(value, defaults[&key], "{key}");
        }
    }
}

#[test]
fn unknown_preset_falls_back_to_defaults() {
    for family in InstrumentFamily::ALL {
        let mut rack = Rack::new(family, family.default_preset()).unwrap();
        rack.randomize_parameters(Some(5)).unwrap();
        rack.load_preset("__not_a_real_preset__").unwrap();
        assert_eq!(rack.current_settings(), family.layout().defaults(), "{family}");
        assert!(rack.is_built());
    }
}

#[test]
fn loaded_preset_echoes_its_overrides() {
    for family in InstrumentFamily::ALL {
        let defaults = family.layout().defaults();
        for preset in family.presets() {
            let mut rack = Rack::new(family, DEFAULT_PRESET).unwrap();
            rack.load_preset(preset.name).unwrap();
            let settings = rack.current_settings();
            for (key, value) in &settings {
                let expected = preset
                    .overrides
                    .iter()
                    .find(|(id, _)| *id == key.as_str())
                    .map(|(_, v)| *v)
                    .unwrap_or(defaults[key]);
                assert_eq!(*value, expected, "{family}/{}: {key}", preset.name);
            }
            assert_eq!(rack.preset_name(), preset.name);
        }
    }
}

#[test]
fn load_preset_is_chainable() {
    let mut rack = Rack::new(InstrumentFamily::Bass, DEFAULT_PRESET).unwrap();
    let settings = rack
        .load_preset("vintage")
        .unwrap()
        .randomize_parameters(Some(9))
        .unwrap()
        .current_settings();
    assert_eq!(settings["comp_attack_ms"], 35.0);
}

#[test]
fn missing_stage_implementation_is_fatal() {
    let mut registry = StageRegistry::new();
    for kind in StageKind::ALL {
        if kind != StageKind::Limiter {
            registry.register_factory(Box::new(BuiltinStageFactory::new(kind)));
        }
    }
    let err = Rack::with_registry(
        InstrumentFamily::Bass,
        DEFAULT_PRESET,
        std::iter::empty(),
        Arc::new(registry),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RackError::DependencyMissing {
            stage: StageKind::Limiter
        }
    ));
}

#[test]
fn mono_in_mono_out() {
    let input = AudioArray::mono(sine(330.0, 0.5, 4_096));
    for family in InstrumentFamily::ALL {
        let output = apply_effects(family, &input, SAMPLE_RATE, family.default_preset(), None)
            .unwrap();
        assert_eq!(output.shape(), Shape::Mono(4_096));
    }
}

#[test]
fn empty_input_is_a_processing_error() {
    let mut rack = Rack::new(InstrumentFamily::Vocal, DEFAULT_PRESET).unwrap();
    let err = rack.process(&AudioArray::mono(Vec::new()), SAMPLE_RATE).unwrap_err();
    assert!(matches!(err, RackError::Processing(_)));
    let err = rack
        .process_buffer(&AudioBuffer::new(2, 0), SAMPLE_RATE)
        .unwrap_err();
    assert!(matches!(err, RackError::Processing(_)));
}
