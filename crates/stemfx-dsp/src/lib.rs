//! Sample-level building blocks shared by the stemfx effect stages.

pub mod biquad;
pub mod delay;
pub mod gain;
pub mod saturator;
pub mod smoothing;

pub use biquad::{BiquadCoeffs, BiquadState, BUTTERWORTH_Q};
pub use delay::{DelayLine, ModulatedDelayLine};
pub use gain::{db_to_linear, linear_to_db, Gain};
