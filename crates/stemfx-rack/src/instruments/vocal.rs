use once_cell::sync::Lazy;

use crate::params::{ParameterDefinition, ParameterLayout, ParameterSet};
use crate::preset::Preset;
use crate::randomize::RandomRange;
use crate::stages::StageDescriptor;

const GATE_THRESHOLD: &str = "noise_gate_threshold_db";
const GATE_RATIO: &str = "noise_gate_ratio";
const GATE_ATTACK: &str = "noise_gate_attack_ms";
const GATE_RELEASE: &str = "noise_gate_release_ms";
const HIGHPASS_CUTOFF: &str = "highpass_cutoff_hz";
const DEESSER_FREQ: &str = "deesser_freq_hz";
const DEESSER_CUT: &str = "deesser_cut_db";
const DEESSER_Q: &str = "deesser_q";
const COMP_THRESHOLD: &str = "comp_threshold_db";
const COMP_RATIO: &str = "comp_ratio";
const COMP_ATTACK: &str = "comp_attack_ms";
const COMP_RELEASE: &str = "comp_release_ms";
const PRESENCE_FREQ: &str = "eq_presence_freq_hz";
const PRESENCE_GAIN: &str = "eq_presence_gain_db";
const PRESENCE_Q: &str = "eq_presence_q";
const AIR_FREQ: &str = "eq_air_freq_hz";
const AIR_GAIN: &str = "eq_air_gain_db";
const AIR_Q: &str = "eq_air_q";
const SATURATION_DRIVE: &str = "saturation_drive_db";
const SATURATION_MIX: &str = "saturation_mix";
const REVERB_ROOM: &str = "reverb_room_size";
const REVERB_DAMPING: &str = "reverb_damping";
const REVERB_WET: &str = "reverb_wet_level";
const REVERB_DRY: &str = "reverb_dry_level";
const REVERB_WIDTH: &str = "reverb_width";
const REVERB_PRE_DELAY: &str = "reverb_pre_delay_ms";
const REVERB_FREEZE: &str = "reverb_freeze_mode";
const LIMITER_THRESHOLD: &str = "limiter_threshold_db";

const LIMITER_RELEASE_MS: f32 = 100.0;

pub static LAYOUT: Lazy<ParameterLayout> = Lazy::new(|| {
    ParameterLayout::new(vec![
        ParameterDefinition::new(GATE_THRESHOLD, "Gate Threshold", -100.0..=0.0, -60.0)
            .with_unit("dB"),
        ParameterDefinition::new(GATE_RATIO, "Gate Ratio", 1.0..=100.0, 10.0),
        ParameterDefinition::new(GATE_ATTACK, "Gate Attack", 0.1..=500.0, 5.0).with_unit("ms"),
        ParameterDefinition::new(GATE_RELEASE, "Gate Release", 1.0..=2_000.0, 50.0)
            .with_unit("ms"),
        ParameterDefinition::new(HIGHPASS_CUTOFF, "Highpass", 20.0..=1_000.0, 90.0)
            .with_unit("Hz")
            .with_description("Rumble filter"),
        ParameterDefinition::new(DEESSER_FREQ, "De-ess Freq", 1_000.0..=16_000.0, 6_000.0)
            .with_unit("Hz"),
        ParameterDefinition::new(DEESSER_CUT, "De-ess Cut", -24.0..=0.0, -4.0).with_unit("dB"),
        ParameterDefinition::new(DEESSER_Q, "De-ess Q", 0.1..=10.0, 3.0),
        ParameterDefinition::new(COMP_THRESHOLD, "Comp Threshold", -60.0..=0.0, -18.0)
            .with_unit("dB"),
        ParameterDefinition::new(COMP_RATIO, "Comp Ratio", 1.0..=30.0, 3.5),
        ParameterDefinition::new(COMP_ATTACK, "Comp Attack", 0.1..=500.0, 8.0).with_unit("ms"),
        ParameterDefinition::new(COMP_RELEASE, "Comp Release", 1.0..=2_000.0, 60.0)
            .with_unit("ms"),
        ParameterDefinition::new(PRESENCE_FREQ, "Presence Freq", 500.0..=8_000.0, 3_000.0)
            .with_unit("Hz"),
        ParameterDefinition::new(PRESENCE_GAIN, "Presence Gain", -24.0..=24.0, 12.0)
            .with_unit("dB"),
        ParameterDefinition::new(PRESENCE_Q, "Presence Q", 0.1..=10.0, 1.0),
        ParameterDefinition::new(AIR_FREQ, "Air Freq", 4_000.0..=20_000.0, 10_000.0)
            .with_unit("Hz"),
        ParameterDefinition::new(AIR_GAIN, "Air Gain", -24.0..=24.0, 12.0).with_unit("dB"),
        ParameterDefinition::new(AIR_Q, "Air Q", 0.1..=10.0, 0.7),
        ParameterDefinition::new(SATURATION_DRIVE, "Saturation Drive", 0.0..=48.0, 4.5)
            .with_unit("dB"),
        ParameterDefinition::new(SATURATION_MIX, "Saturation Mix", 0.0..=1.0, 0.3),
        ParameterDefinition::new(REVERB_ROOM, "Room Size", 0.0..=1.0, 0.28),
        ParameterDefinition::new(REVERB_DAMPING, "Damping", 0.0..=1.0, 0.5),
        ParameterDefinition::new(REVERB_WET, "Wet Level", 0.0..=1.0, 0.2),
        ParameterDefinition::new(REVERB_DRY, "Dry Level", 0.0..=1.0, 0.8),
        ParameterDefinition::new(REVERB_WIDTH, "Width", 0.0..=1.0, 1.0),
        ParameterDefinition::new(REVERB_PRE_DELAY, "Pre-delay", 0.0..=500.0, 20.0)
            .with_unit("ms"),
        ParameterDefinition::new(REVERB_FREEZE, "Freeze", 0.0..=1.0, 0.0)
            .with_description("Values of 0.5 and above hold the current tail"),
        ParameterDefinition::new(LIMITER_THRESHOLD, "Limiter Threshold", -24.0..=0.0, -1.0)
            .with_unit("dB"),
    ])
});

pub const PRESETS: &[Preset] = &[
    Preset::new(
        "bright",
        &[
            (PRESENCE_GAIN, 10.0),
            (AIR_GAIN, 14.0),
            (HIGHPASS_CUTOFF, 100.0),
        ],
    ),
    Preset::new(
        "warm",
        &[
            (PRESENCE_GAIN, 6.0),
            (AIR_GAIN, 6.0),
            (HIGHPASS_CUTOFF, 70.0),
            (SATURATION_DRIVE, 3.0),
        ],
    ),
    Preset::new("roomy", &[(REVERB_ROOM, 0.4), (REVERB_WET, 0.28)]),
];

pub const RANDOM_RANGES: &[RandomRange] = &[
    RandomRange::new(COMP_THRESHOLD, -24.0, -12.0),
    RandomRange::new(REVERB_ROOM, 0.2, 0.5),
    RandomRange::new(SATURATION_DRIVE, 3.0, 6.0),
    RandomRange::new(REVERB_WET, 0.15, 0.3),
    RandomRange::new(PRESENCE_GAIN, 8.0, 14.0),
    RandomRange::new(AIR_GAIN, 8.0, 14.0),
];

/// Gate, highpass, de-esser, compressor, presence, air, saturation,
/// reverb, limiter. Only the saturation stage is conditional, on both its
/// drive and its mix.
pub fn build_chain(p: &ParameterSet) -> Vec<StageDescriptor> {
    let mut stages = vec![
        StageDescriptor::NoiseGate {
            threshold_db: p.value(GATE_THRESHOLD),
            ratio: p.value(GATE_RATIO),
            attack_ms: p.value(GATE_ATTACK),
            release_ms: p.value(GATE_RELEASE),
        },
        StageDescriptor::Highpass {
            cutoff_hz: p.value(HIGHPASS_CUTOFF),
        },
        StageDescriptor::PeakEq {
            cutoff_hz: p.value(DEESSER_FREQ),
            gain_db: p.value(DEESSER_CUT),
            q: p.value(DEESSER_Q),
        },
        StageDescriptor::Compressor {
            threshold_db: p.value(COMP_THRESHOLD),
            ratio: p.value(COMP_RATIO),
            attack_ms: p.value(COMP_ATTACK),
            release_ms: p.value(COMP_RELEASE),
        },
        StageDescriptor::PeakEq {
            cutoff_hz: p.value(PRESENCE_FREQ),
            gain_db: p.value(PRESENCE_GAIN),
            q: p.value(PRESENCE_Q),
        },
        StageDescriptor::PeakEq {
            cutoff_hz: p.value(AIR_FREQ),
            gain_db: p.value(AIR_GAIN),
            q: p.value(AIR_Q),
        },
    ];
    if p.value(SATURATION_DRIVE) > 0.0 && p.value(SATURATION_MIX) > 0.0 {
        stages.push(StageDescriptor::Distortion {
            drive_db: p.value(SATURATION_DRIVE),
            mix: p.value(SATURATION_MIX),
        });
    }
    stages.push(StageDescriptor::Reverb {
        room_size: p.value(REVERB_ROOM),
        damping: p.value(REVERB_DAMPING),
        wet_level: p.value(REVERB_WET),
        dry_level: p.value(REVERB_DRY),
        width: p.value(REVERB_WIDTH),
        freeze_mode: p.value(REVERB_FREEZE),
        pre_delay_ms: p.value(REVERB_PRE_DELAY),
    });
    stages.push(StageDescriptor::Limiter {
        threshold_db: p.value(LIMITER_THRESHOLD),
        release_ms: LIMITER_RELEASE_MS,
    });
    stages
}
