//! Per-channel parameter vectors and the broadcasting rule.
//!
//! Every engine parameter is an ordered sequence of per-channel values. A
//! sequence shorter than the channel count follows "last value repeats":
//! the final element is reused for all higher channel indices, so a length-1
//! sequence behaves as a scalar. The rule lives in one helper,
//! [`value_for_channel`], rather than being duplicated per parameter.

use thiserror::Error;

/// Raised when a host hands the engine an empty parameter sequence. Every
/// sequence must contain at least one element; the engine never reads out of
/// bounds silently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("parameter sequence `{0}` must contain at least one element")]
    EmptySequence(&'static str),
}

/// Broadcasts a parameter sequence over channel indices: in-range indices
/// read directly, everything past the end reuses the final element.
#[inline]
pub fn value_for_channel(values: &[f32], channel: usize) -> f32 {
    match values.get(channel) {
        Some(v) => *v,
        None => values.last().copied().unwrap_or(0.0),
    }
}

/// The full per-channel configuration of the envelope engine.
///
/// Durations (`hold`, `attack`, `decay`, `release`) are phase fractions of
/// one phasor cycle; `sustain` is a level in [0, 1]; the `*_pow` / `*_bipow`
/// amounts in [-1, 1] feed the curve shaper.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeParams {
    pub hold: Vec<f32>,
    pub attack: Vec<f32>,
    pub decay: Vec<f32>,
    pub sustain: Vec<f32>,
    pub release: Vec<f32>,
    pub attack_pow: Vec<f32>,
    pub attack_bipow: Vec<f32>,
    pub decay_pow: Vec<f32>,
    pub decay_bipow: Vec<f32>,
    pub release_pow: Vec<f32>,
    pub release_bipow: Vec<f32>,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            hold: vec![0.0],
            attack: vec![0.0],
            decay: vec![0.0],
            sustain: vec![1.0],
            release: vec![0.0],
            attack_pow: vec![0.0],
            attack_bipow: vec![0.0],
            decay_pow: vec![0.0],
            decay_bipow: vec![0.0],
            release_pow: vec![0.0],
            release_bipow: vec![0.0],
        }
    }
}

impl EnvelopeParams {
    /// Resolves the broadcast view of every parameter for one channel.
    pub fn channel(&self, index: usize) -> ChannelParams {
        ChannelParams {
            hold: value_for_channel(&self.hold, index),
            attack: value_for_channel(&self.attack, index),
            decay: value_for_channel(&self.decay, index),
            sustain: value_for_channel(&self.sustain, index),
            release: value_for_channel(&self.release, index),
            attack_pow: value_for_channel(&self.attack_pow, index),
            attack_bipow: value_for_channel(&self.attack_bipow, index),
            decay_pow: value_for_channel(&self.decay_pow, index),
            decay_bipow: value_for_channel(&self.decay_bipow, index),
            release_pow: value_for_channel(&self.release_pow, index),
            release_bipow: value_for_channel(&self.release_bipow, index),
        }
    }
}

/// One channel's resolved parameter snapshot, consumed by
/// [`EnvelopeVoice::advance`](crate::dsp::EnvelopeVoice::advance).
#[derive(Debug, Clone, Copy)]
pub struct ChannelParams {
    pub hold: f32,
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub attack_pow: f32,
    pub attack_bipow: f32,
    pub decay_pow: f32,
    pub decay_bipow: f32,
    pub release_pow: f32,
    pub release_bipow: f32,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            hold: 0.0,
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
            attack_pow: 0.0,
            attack_bipow: 0.0,
            decay_pow: 0.0,
            decay_bipow: 0.0,
            release_pow: 0.0,
            release_bipow: 0.0,
        }
    }
}

/// Validates a host-supplied sequence and clamps each element into range.
pub(crate) fn sanitize(
    name: &'static str,
    mut values: Vec<f32>,
    min: f32,
    max: f32,
) -> Result<Vec<f32>, ParamError> {
    if values.is_empty() {
        return Err(ParamError::EmptySequence(name));
    }
    for v in &mut values {
        *v = v.clamp(min, max);
    }
    Ok(values)
}
