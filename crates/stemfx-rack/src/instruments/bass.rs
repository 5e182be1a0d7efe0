use once_cell::sync::Lazy;

use crate::params::{ParameterDefinition, ParameterLayout, ParameterSet};
use crate::preset::Preset;
use crate::randomize::RandomRange;
use crate::stages::StageDescriptor;

const GATE_THRESHOLD: &str = "gate_threshold_db";
const GATE_RATIO: &str = "gate_ratio";
const COMP_THRESHOLD: &str = "comp_threshold_db";
const COMP_RATIO: &str = "comp_ratio";
const COMP_ATTACK: &str = "comp_attack_ms";
const COMP_RELEASE: &str = "comp_release_ms";
const DRIVE: &str = "drive_db";
const LOW_SHELF_FREQ: &str = "low_shelf_freq";
const LOW_SHELF_GAIN: &str = "low_shelf_gain";
const MID_SCOOP_FREQ: &str = "mid_scoop_freq";
const MID_SCOOP_GAIN: &str = "mid_scoop_gain";
const MID_SCOOP_Q: &str = "mid_scoop_q";
const CHORUS_RATE: &str = "chorus_rate_hz";
const CHORUS_DEPTH: &str = "chorus_depth";
const CHORUS_MIX: &str = "chorus_mix";
const LIMITER_THRESHOLD: &str = "limiter_threshold_db";
const OUTPUT_GAIN: &str = "output_gain_db";

const GATE_ATTACK_MS: f32 = 1.0;
const GATE_RELEASE_MS: f32 = 100.0;
const LIMITER_RELEASE_MS: f32 = 100.0;
const CHORUS_CENTRE_DELAY_MS: f32 = 7.0;

pub static LAYOUT: Lazy<ParameterLayout> = Lazy::new(|| {
    ParameterLayout::new(vec![
        ParameterDefinition::new(GATE_THRESHOLD, "Gate Threshold", -100.0..=0.0, -55.0)
            .with_unit("dB"),
        ParameterDefinition::new(GATE_RATIO, "Gate Ratio", 1.0..=100.0, 10.0),
        ParameterDefinition::new(COMP_THRESHOLD, "Comp Threshold", -60.0..=0.0, -20.0)
            .with_unit("dB"),
        ParameterDefinition::new(COMP_RATIO, "Comp Ratio", 1.0..=30.0, 4.0),
        ParameterDefinition::new(COMP_ATTACK, "Comp Attack", 0.1..=500.0, 20.0).with_unit("ms"),
        ParameterDefinition::new(COMP_RELEASE, "Comp Release", 1.0..=2_000.0, 100.0)
            .with_unit("ms"),
        ParameterDefinition::new(DRIVE, "Drive", 0.0..=48.0, 8.0)
            .with_unit("dB")
            .with_description("Saturation amount; 0 removes the stage"),
        ParameterDefinition::new(LOW_SHELF_FREQ, "Low Shelf Freq", 20.0..=1_000.0, 80.0)
            .with_unit("Hz"),
        ParameterDefinition::new(LOW_SHELF_GAIN, "Low Shelf Gain", -24.0..=24.0, 2.0)
            .with_unit("dB"),
        ParameterDefinition::new(MID_SCOOP_FREQ, "Mid Scoop Freq", 100.0..=5_000.0, 400.0)
            .with_unit("Hz"),
        ParameterDefinition::new(MID_SCOOP_GAIN, "Mid Scoop Gain", -24.0..=24.0, -3.0)
            .with_unit("dB"),
        ParameterDefinition::new(MID_SCOOP_Q, "Mid Scoop Q", 0.1..=10.0, 1.5),
        ParameterDefinition::new(CHORUS_RATE, "Chorus Rate", 0.01..=10.0, 0.5).with_unit("Hz"),
        ParameterDefinition::new(CHORUS_DEPTH, "Chorus Depth", 0.0..=1.0, 0.15),
        ParameterDefinition::new(CHORUS_MIX, "Chorus Mix", 0.0..=1.0, 0.3)
            .with_description("Wet/dry balance; 0 removes the stage"),
        ParameterDefinition::new(LIMITER_THRESHOLD, "Limiter Threshold", -24.0..=0.0, -0.5)
            .with_unit("dB"),
        ParameterDefinition::new(OUTPUT_GAIN, "Output Gain", -24.0..=24.0, 0.0)
            .with_unit("dB")
            .with_description("Applied ahead of the limiter"),
    ])
});

pub const PRESETS: &[Preset] = &[
    Preset::new(
        "vintage",
        &[
            (DRIVE, 12.0),
            (LOW_SHELF_GAIN, 3.5),
            (MID_SCOOP_GAIN, -1.0),
            (CHORUS_MIX, 0.0),
            (COMP_ATTACK, 35.0),
        ],
    ),
    Preset::new(
        "modern",
        &[
            (DRIVE, 6.0),
            (LOW_SHELF_GAIN, 2.0),
            (MID_SCOOP_GAIN, -5.0),
            (CHORUS_MIX, 0.25),
            (COMP_RATIO, 6.0),
        ],
    ),
    Preset::new(
        "fuzz",
        &[
            (DRIVE, 22.0),
            (GATE_THRESHOLD, -40.0),
            (MID_SCOOP_GAIN, 0.0),
            (COMP_THRESHOLD, -25.0),
        ],
    ),
];

pub const RANDOM_RANGES: &[RandomRange] = &[
    RandomRange::new(DRIVE, 0.0, 15.0),
    RandomRange::new(COMP_RATIO, 3.0, 6.0),
    RandomRange::new(LOW_SHELF_GAIN, 0.0, 4.0),
    RandomRange::new(MID_SCOOP_GAIN, -6.0, -1.0),
    RandomRange::new(CHORUS_MIX, 0.0, 0.4),
    RandomRange::new(CHORUS_DEPTH, 0.1, 0.3),
    RandomRange::new(COMP_THRESHOLD, -25.0, -15.0),
];

/// Gate, compressor, drive, low shelf, mid scoop, chorus, output gain, limiter.
pub fn build_chain(p: &ParameterSet) -> Vec<StageDescriptor> {
    let mut stages = vec![
        StageDescriptor::NoiseGate {
            threshold_db: p.value(GATE_THRESHOLD),
            ratio: p.value(GATE_RATIO),
            attack_ms: GATE_ATTACK_MS,
            release_ms: GATE_RELEASE_MS,
        },
        StageDescriptor::Compressor {
            threshold_db: p.value(COMP_THRESHOLD),
            ratio: p.value(COMP_RATIO),
            attack_ms: p.value(COMP_ATTACK),
            release_ms: p.value(COMP_RELEASE),
        },
    ];
    if p.value(DRIVE) > 0.0 {
        stages.push(StageDescriptor::Distortion {
            drive_db: p.value(DRIVE),
            mix: 1.0,
        });
    }
    stages.push(StageDescriptor::LowShelf {
        cutoff_hz: p.value(LOW_SHELF_FREQ),
        gain_db: p.value(LOW_SHELF_GAIN),
        q: stemfx_dsp::BUTTERWORTH_Q,
    });
    stages.push(StageDescriptor::PeakEq {
        cutoff_hz: p.value(MID_SCOOP_FREQ),
        gain_db: p.value(MID_SCOOP_GAIN),
        q: p.value(MID_SCOOP_Q),
    });
    if p.value(CHORUS_MIX) > 0.0 {
        stages.push(StageDescriptor::Chorus {
            rate_hz: p.value(CHORUS_RATE),
            depth: p.value(CHORUS_DEPTH),
            centre_delay_ms: CHORUS_CENTRE_DELAY_MS,
            feedback: 0.0,
            mix: p.value(CHORUS_MIX),
        });
    }
    if p.value(OUTPUT_GAIN) != 0.0 {
        stages.push(StageDescriptor::Gain {
            gain_db: p.value(OUTPUT_GAIN),
        });
    }
    stages.push(StageDescriptor::Limiter {
        threshold_db: p.value(LIMITER_THRESHOLD),
        release_ms: LIMITER_RELEASE_MS,
    });
    stages
}
