//! Offline rendering of a representative envelope curve for display.
//!
//! The preview concatenates a synthetic attack ramp, a decay ramp, a
//! fixed-length sustain plateau and a release ramp, shaped with the same
//! curve functions as the live engine. Only the first element of each
//! per-channel parameter contributes; the result is advisory and feeds no
//! other computation.

use crate::dsp::curve;
use crate::params::EnvelopeParams;

/// Nominal preview length; each ramp maps its duration (a phase fraction)
/// onto this many samples.
pub const PREVIEW_SIZE: usize = 100;

#[inline]
fn first(values: &[f32]) -> f32 {
    values.first().copied().unwrap_or(0.0)
}

#[inline]
fn segment_len(duration: f32) -> usize {
    ((duration * PREVIEW_SIZE as f32).round() as usize).min(PREVIEW_SIZE)
}

fn push_ramp(
    out: &mut Vec<f32>,
    len: usize,
    start: f32,
    end: f32,
    pow_amount: f32,
    bipow_amount: f32,
) {
    for i in 0..len {
        let progress = curve::shape(i as f32 / len as f32, pow_amount, bipow_amount);
        out.push(curve::smooth_interpolate(start, end, progress));
    }
}

/// Renders the preview curve at full gate amplitude.
pub fn render(params: &EnvelopeParams) -> Vec<f32> {
    let peak = 1.0;
    let sustain = peak * first(&params.sustain);

    let mut out = Vec::with_capacity(PREVIEW_SIZE * 2);

    push_ramp(
        &mut out,
        segment_len(first(&params.attack)),
        0.0,
        peak,
        first(&params.attack_pow),
        first(&params.attack_bipow),
    );
    push_ramp(
        &mut out,
        segment_len(first(&params.decay)),
        peak,
        sustain,
        first(&params.decay_pow),
        first(&params.decay_bipow),
    );

    // Fixed half-length plateau so the sustain level is always visible.
    out.extend(std::iter::repeat(sustain).take(PREVIEW_SIZE / 2));

    push_ramp(
        &mut out,
        segment_len(first(&params.release)),
        sustain,
        0.0,
        first(&params.release_pow),
        first(&params.release_bipow),
    );

    out
}
