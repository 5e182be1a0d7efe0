//! Guitar presets choose a subset of pedals. The default table is the
//! `clean` configuration; other presets switch stages on and off through
//! their defining magnitude (ratio 1, drive 0, mix 0, open tone control).

use once_cell::sync::Lazy;

use crate::params::{ParameterDefinition, ParameterLayout, ParameterSet};
use crate::preset::Preset;
use crate::randomize::RandomRange;
use crate::stages::StageDescriptor;

pub const CLEAN: &str = "clean";

const GATE_THRESHOLD: &str = "gate_threshold_db";
const GATE_RATIO: &str = "gate_ratio";
const GATE_RELEASE: &str = "gate_release_ms";
const COMP_THRESHOLD: &str = "comp_threshold_db";
const COMP_RATIO: &str = "comp_ratio";
const COMP_ATTACK: &str = "comp_attack_ms";
const COMP_RELEASE: &str = "comp_release_ms";
const DRIVE: &str = "drive_db";
const TONE_CUTOFF: &str = "tone_cutoff_hz";
const PHASER_RATE: &str = "phaser_rate_hz";
const PHASER_DEPTH: &str = "phaser_depth";
const PHASER_CENTRE: &str = "phaser_centre_hz";
const PHASER_FEEDBACK: &str = "phaser_feedback";
const PHASER_MIX: &str = "phaser_mix";
const CHORUS_RATE: &str = "chorus_rate_hz";
const CHORUS_DEPTH: &str = "chorus_depth";
const CHORUS_MIX: &str = "chorus_mix";
const DELAY_SECONDS: &str = "delay_seconds";
const DELAY_FEEDBACK: &str = "delay_feedback";
const DELAY_MIX: &str = "delay_mix";
const REVERB_ROOM: &str = "reverb_room_size";
const REVERB_DAMPING: &str = "reverb_damping";
const REVERB_WET: &str = "reverb_wet_level";
const REVERB_DRY: &str = "reverb_dry_level";
const OUTPUT_GAIN: &str = "output_gain_db";

const GATE_ATTACK_MS: f32 = 1.0;
const CHORUS_CENTRE_DELAY_MS: f32 = 7.0;
/// Tone control fully open: no lowpass stage.
const TONE_OPEN_HZ: f32 = 20_000.0;

pub static LAYOUT: Lazy<ParameterLayout> = Lazy::new(|| {
    ParameterLayout::new(vec![
        ParameterDefinition::new(GATE_THRESHOLD, "Gate Threshold", -100.0..=0.0, -50.0)
            .with_unit("dB"),
        ParameterDefinition::new(GATE_RATIO, "Gate Ratio", 1.0..=100.0, 1.0)
            .with_description("1 removes the gate"),
        ParameterDefinition::new(GATE_RELEASE, "Gate Release", 1.0..=2_000.0, 100.0)
            .with_unit("ms"),
        ParameterDefinition::new(COMP_THRESHOLD, "Comp Threshold", -60.0..=0.0, -15.0)
            .with_unit("dB"),
        ParameterDefinition::new(COMP_RATIO, "Comp Ratio", 1.0..=30.0, 4.0)
            .with_description("1 removes the compressor"),
        ParameterDefinition::new(COMP_ATTACK, "Comp Attack", 0.1..=500.0, 5.0).with_unit("ms"),
        ParameterDefinition::new(COMP_RELEASE, "Comp Release", 1.0..=2_000.0, 50.0)
            .with_unit("ms"),
        ParameterDefinition::new(DRIVE, "Drive", 0.0..=48.0, 0.0).with_unit("dB"),
        ParameterDefinition::new(TONE_CUTOFF, "Tone", 1_000.0..=TONE_OPEN_HZ, TONE_OPEN_HZ)
            .with_unit("Hz")
            .with_description("Post-drive lowpass; fully open removes it"),
        ParameterDefinition::new(PHASER_RATE, "Phaser Rate", 0.01..=10.0, 0.5).with_unit("Hz"),
        ParameterDefinition::new(PHASER_DEPTH, "Phaser Depth", 0.0..=1.0, 0.5),
        ParameterDefinition::new(PHASER_CENTRE, "Phaser Centre", 100.0..=5_000.0, 1_000.0)
            .with_unit("Hz"),
        ParameterDefinition::new(PHASER_FEEDBACK, "Phaser Feedback", 0.0..=0.9, 0.3),
        ParameterDefinition::new(PHASER_MIX, "Phaser Mix", 0.0..=1.0, 0.0),
        ParameterDefinition::new(CHORUS_RATE, "Chorus Rate", 0.01..=10.0, 1.0).with_unit("Hz"),
        ParameterDefinition::new(CHORUS_DEPTH, "Chorus Depth", 0.0..=1.0, 0.25),
        ParameterDefinition::new(CHORUS_MIX, "Chorus Mix", 0.0..=1.0, 0.3),
        ParameterDefinition::new(DELAY_SECONDS, "Delay Time", 0.01..=2.0, 0.5).with_unit("s"),
        ParameterDefinition::new(DELAY_FEEDBACK, "Delay Feedback", 0.0..=0.95, 0.2),
        ParameterDefinition::new(DELAY_MIX, "Delay Mix", 0.0..=1.0, 0.0),
        ParameterDefinition::new(REVERB_ROOM, "Room Size", 0.0..=1.0, 0.5),
        ParameterDefinition::new(REVERB_DAMPING, "Damping", 0.0..=1.0, 0.5),
        ParameterDefinition::new(REVERB_WET, "Wet Level", 0.0..=1.0, 0.33),
        ParameterDefinition::new(REVERB_DRY, "Dry Level", 0.0..=1.0, 0.4),
        ParameterDefinition::new(OUTPUT_GAIN, "Output Gain", -24.0..=24.0, 0.0).with_unit("dB"),
    ])
});

pub const PRESETS: &[Preset] = &[
    Preset::new(CLEAN, &[]),
    Preset::new(
        "distortion",
        &[
            (GATE_RATIO, 10.0),
            (COMP_RATIO, 1.0),
            (DRIVE, 25.0),
            (CHORUS_MIX, 0.0),
        ],
    ),
    Preset::new(
        "crunch",
        &[(DRIVE, 12.0), (CHORUS_MIX, 0.0), (REVERB_WET, 0.25)],
    ),
    Preset::new(
        "ambient",
        &[
            (TONE_CUTOFF, 6_000.0),
            (CHORUS_MIX, 0.2),
            (DELAY_MIX, 0.3),
            (DELAY_FEEDBACK, 0.4),
            (REVERB_ROOM, 0.8),
            (REVERB_WET, 0.45),
        ],
    ),
    Preset::new(
        "psychedelic",
        &[
            (DRIVE, 6.0),
            (PHASER_MIX, 0.5),
            (CHORUS_MIX, 0.0),
            (DELAY_MIX, 0.2),
            (DELAY_SECONDS, 0.35),
        ],
    ),
];

pub const RANDOM_RANGES: &[RandomRange] = &[
    RandomRange::new(DRIVE, 0.0, 20.0),
    RandomRange::new(COMP_THRESHOLD, -25.0, -10.0),
    RandomRange::new(CHORUS_MIX, 0.0, 0.4),
    RandomRange::new(REVERB_ROOM, 0.3, 0.7),
    RandomRange::new(REVERB_WET, 0.2, 0.4),
];

/// Gate, compressor, drive, tone, phaser, chorus, delay, reverb, output
/// gain. Every stage but the reverb is conditional.
pub fn build_chain(p: &ParameterSet) -> Vec<StageDescriptor> {
    let mut stages = Vec::new();
    if p.value(GATE_RATIO) > 1.0 {
        stages.push(StageDescriptor::NoiseGate {
            threshold_db: p.value(GATE_THRESHOLD),
            ratio: p.value(GATE_RATIO),
            attack_ms: GATE_ATTACK_MS,
            release_ms: p.value(GATE_RELEASE),
        });
    }
    if p.value(COMP_RATIO) > 1.0 {
        stages.push(StageDescriptor::Compressor {
            threshold_db: p.value(COMP_THRESHOLD),
            ratio: p.value(COMP_RATIO),
            attack_ms: p.value(COMP_ATTACK),
            release_ms: p.value(COMP_RELEASE),
        });
    }
    if p.value(DRIVE) > 0.0 {
        stages.push(StageDescriptor::Distortion {
            drive_db: p.value(DRIVE),
            mix: 1.0,
        });
    }
    if p.value(TONE_CUTOFF) < TONE_OPEN_HZ {
        stages.push(StageDescriptor::Lowpass {
            cutoff_hz: p.value(TONE_CUTOFF),
        });
    }
    if p.value(PHASER_MIX) > 0.0 {
        stages.push(StageDescriptor::Phaser {
            rate_hz: p.value(PHASER_RATE),
            depth: p.value(PHASER_DEPTH),
            centre_frequency_hz: p.value(PHASER_CENTRE),
            feedback: p.value(PHASER_FEEDBACK),
            mix: p.value(PHASER_MIX),
        });
    }
    if p.value(CHORUS_MIX) > 0.0 {
        stages.push(StageDescriptor::Chorus {
            rate_hz: p.value(CHORUS_RATE),
            depth: p.value(CHORUS_DEPTH),
            centre_delay_ms: CHORUS_CENTRE_DELAY_MS,
            feedback: 0.0,
            mix: p.value(CHORUS_MIX),
        });
    }
    if p.value(DELAY_MIX) > 0.0 {
        stages.push(StageDescriptor::Delay {
            delay_seconds: p.value(DELAY_SECONDS),
            feedback: p.value(DELAY_FEEDBACK),
            mix: p.value(DELAY_MIX),
        });
    }
    stages.push(StageDescriptor::Reverb {
        room_size: p.value(REVERB_ROOM),
        damping: p.value(REVERB_DAMPING),
        wet_level: p.value(REVERB_WET),
        dry_level: p.value(REVERB_DRY),
        width: 1.0,
        freeze_mode: 0.0,
        pre_delay_ms: 0.0,
    });
    if p.value(OUTPUT_GAIN) != 0.0 {
        stages.push(StageDescriptor::Gain {
            gain_db: p.value(OUTPUT_GAIN),
        });
    }
    stages
}
