//! Synth and piano stems share one rack.

use once_cell::sync::Lazy;
use stemfx_dsp::BUTTERWORTH_Q;

use crate::params::{ParameterDefinition, ParameterLayout, ParameterSet};
use crate::preset::Preset;
use crate::randomize::RandomRange;
use crate::stages::StageDescriptor;

const GATE_THRESHOLD: &str = "gate_threshold_db";
const GATE_RATIO: &str = "gate_ratio";
const GATE_ATTACK: &str = "gate_attack_ms";
const GATE_RELEASE: &str = "gate_release_ms";
const HIGHPASS_CUTOFF: &str = "highpass_cutoff_hz";
const COMP_THRESHOLD: &str = "comp_threshold_db";
const COMP_RATIO: &str = "comp_ratio";
const COMP_ATTACK: &str = "comp_attack_ms";
const COMP_RELEASE: &str = "comp_release_ms";
const EQ_LOW_GAIN: &str = "eq_low_gain_db";
const EQ_MID_GAIN: &str = "eq_mid_gain_db";
const EQ_HIGH_GAIN: &str = "eq_high_gain_db";
const CHORUS_RATE: &str = "chorus_rate_hz";
const CHORUS_DEPTH: &str = "chorus_depth";
const CHORUS_CENTRE_DELAY: &str = "chorus_centre_delay_ms";
const CHORUS_FEEDBACK: &str = "chorus_feedback";
const CHORUS_MIX: &str = "chorus_mix";
const REVERB_ROOM: &str = "reverb_room_size";
const REVERB_DAMPING: &str = "reverb_damping";
const REVERB_WET: &str = "reverb_wet_level";
const REVERB_DRY: &str = "reverb_dry_level";
const REVERB_WIDTH: &str = "reverb_width";
const LIMITER_THRESHOLD: &str = "limiter_threshold_db";
const LIMITER_RELEASE: &str = "limiter_release_ms";

const EQ_LOW_FREQ_HZ: f32 = 200.0;
const EQ_MID_FREQ_HZ: f32 = 1_500.0;
const EQ_MID_Q: f32 = 1.0;
const EQ_HIGH_FREQ_HZ: f32 = 8_000.0;

pub static LAYOUT: Lazy<ParameterLayout> = Lazy::new(|| {
    ParameterLayout::new(vec![
        ParameterDefinition::new(GATE_THRESHOLD, "Gate Threshold", -100.0..=0.0, -60.0)
            .with_unit("dB")
            .with_description("Threshold of the high-ratio compressor acting as a gate"),
        ParameterDefinition::new(GATE_RATIO, "Gate Ratio", 1.0..=100.0, 10.0),
        ParameterDefinition::new(GATE_ATTACK, "Gate Attack", 0.1..=500.0, 1.0).with_unit("ms"),
        ParameterDefinition::new(GATE_RELEASE, "Gate Release", 1.0..=2_000.0, 100.0)
            .with_unit("ms"),
        ParameterDefinition::new(HIGHPASS_CUTOFF, "Highpass", 20.0..=1_000.0, 80.0)
            .with_unit("Hz"),
        ParameterDefinition::new(COMP_THRESHOLD, "Comp Threshold", -60.0..=0.0, -20.0)
            .with_unit("dB"),
        ParameterDefinition::new(COMP_RATIO, "Comp Ratio", 1.0..=30.0, 3.0),
        ParameterDefinition::new(COMP_ATTACK, "Comp Attack", 0.1..=500.0, 5.0).with_unit("ms"),
        ParameterDefinition::new(COMP_RELEASE, "Comp Release", 1.0..=2_000.0, 50.0)
            .with_unit("ms"),
        ParameterDefinition::new(EQ_LOW_GAIN, "Low Shelf", -24.0..=24.0, 0.0)
            .with_unit("dB")
            .with_description("Shelf around 200 Hz"),
        ParameterDefinition::new(EQ_MID_GAIN, "Presence", -24.0..=24.0, 2.0)
            .with_unit("dB")
            .with_description("Peak around 1.5 kHz"),
        ParameterDefinition::new(EQ_HIGH_GAIN, "Brightness", -24.0..=24.0, 1.0)
            .with_unit("dB")
            .with_description("Shelf around 8 kHz"),
        ParameterDefinition::new(CHORUS_RATE, "Chorus Rate", 0.01..=10.0, 0.8).with_unit("Hz"),
        ParameterDefinition::new(CHORUS_DEPTH, "Chorus Depth", 0.0..=1.0, 0.25),
        ParameterDefinition::new(CHORUS_CENTRE_DELAY, "Chorus Delay", 0.0..=50.0, 7.0)
            .with_unit("ms"),
        ParameterDefinition::new(CHORUS_FEEDBACK, "Chorus Feedback", 0.0..=0.9, 0.0),
        ParameterDefinition::new(CHORUS_MIX, "Chorus Mix", 0.0..=1.0, 0.3),
        ParameterDefinition::new(REVERB_ROOM, "Room Size", 0.0..=1.0, 0.35),
        ParameterDefinition::new(REVERB_DAMPING, "Damping", 0.0..=1.0, 0.5),
        ParameterDefinition::new(REVERB_WET, "Wet Level", 0.0..=1.0, 0.25),
        ParameterDefinition::new(REVERB_DRY, "Dry Level", 0.0..=1.0, 0.8),
        ParameterDefinition::new(REVERB_WIDTH, "Width", 0.0..=1.0, 1.0),
        ParameterDefinition::new(LIMITER_THRESHOLD, "Limiter Threshold", -24.0..=0.0, -1.0)
            .with_unit("dB"),
        ParameterDefinition::new(LIMITER_RELEASE, "Limiter Release", 1.0..=2_000.0, 100.0)
            .with_unit("ms"),
    ])
});

pub const PRESETS: &[Preset] = &[
    Preset::new(
        "bright",
        &[(EQ_MID_GAIN, 3.0), (EQ_HIGH_GAIN, 2.5), (CHORUS_MIX, 0.4)],
    ),
    Preset::new(
        "warm",
        &[
            (EQ_LOW_GAIN, 1.5),
            (EQ_MID_GAIN, 1.0),
            (EQ_HIGH_GAIN, -1.0),
            (REVERB_DAMPING, 0.7),
        ],
    ),
    Preset::new(
        "spacious",
        &[
            (CHORUS_MIX, 0.5),
            (CHORUS_DEPTH, 0.4),
            (REVERB_ROOM, 0.6),
            (REVERB_WET, 0.4),
            (REVERB_WIDTH, 1.0),
        ],
    ),
    Preset::new(
        "tight",
        &[
            (COMP_THRESHOLD, -25.0),
            (COMP_RATIO, 5.0),
            (REVERB_ROOM, 0.2),
            (REVERB_WET, 0.15),
            (CHORUS_MIX, 0.2),
        ],
    ),
];

pub const RANDOM_RANGES: &[RandomRange] = &[
    RandomRange::new(GATE_THRESHOLD, -70.0, -50.0),
    RandomRange::new(COMP_THRESHOLD, -30.0, -10.0),
    RandomRange::new(COMP_RATIO, 2.0, 5.0),
    RandomRange::new(EQ_MID_GAIN, 0.0, 4.0),
    RandomRange::new(CHORUS_MIX, 0.2, 0.5),
    RandomRange::new(REVERB_ROOM, 0.2, 0.5),
    RandomRange::new(REVERB_WET, 0.15, 0.35),
];

/// Gate (a high-ratio compressor), highpass, compressor, three-band EQ,
/// chorus, reverb, limiter.
pub fn build_chain(p: &ParameterSet) -> Vec<StageDescriptor> {
    let mut stages = vec![
        StageDescriptor::Compressor {
            threshold_db: p.value(GATE_THRESHOLD),
            ratio: p.value(GATE_RATIO),
            attack_ms: p.value(GATE_ATTACK),
            release_ms: p.value(GATE_RELEASE),
        },
        StageDescriptor::Highpass {
            cutoff_hz: p.value(HIGHPASS_CUTOFF),
        },
        StageDescriptor::Compressor {
            threshold_db: p.value(COMP_THRESHOLD),
            ratio: p.value(COMP_RATIO),
            attack_ms: p.value(COMP_ATTACK),
            release_ms: p.value(COMP_RELEASE),
        },
        StageDescriptor::LowShelf {
            cutoff_hz: EQ_LOW_FREQ_HZ,
            gain_db: p.value(EQ_LOW_GAIN),
            q: BUTTERWORTH_Q,
        },
        StageDescriptor::PeakEq {
            cutoff_hz: EQ_MID_FREQ_HZ,
            gain_db: p.value(EQ_MID_GAIN),
            q: EQ_MID_Q,
        },
        StageDescriptor::HighShelf {
            cutoff_hz: EQ_HIGH_FREQ_HZ,
            gain_db: p.value(EQ_HIGH_GAIN),
            q: BUTTERWORTH_Q,
        },
    ];
    if p.value(CHORUS_MIX) > 0.0 {
        stages.push(StageDescriptor::Chorus {
            rate_hz: p.value(CHORUS_RATE),
            depth: p.value(CHORUS_DEPTH),
            centre_delay_ms: p.value(CHORUS_CENTRE_DELAY),
            feedback: p.value(CHORUS_FEEDBACK),
            mix: p.value(CHORUS_MIX),
        });
    }
    stages.push(StageDescriptor::Reverb {
        room_size: p.value(REVERB_ROOM),
        damping: p.value(REVERB_DAMPING),
        wet_level: p.value(REVERB_WET),
        dry_level: p.value(REVERB_DRY),
        width: p.value(REVERB_WIDTH),
        freeze_mode: 0.0,
        pre_delay_ms: 0.0,
    });
    stages.push(StageDescriptor::Limiter {
        threshold_db: p.value(LIMITER_THRESHOLD),
        release_ms: p.value(LIMITER_RELEASE),
    });
    stages
}
