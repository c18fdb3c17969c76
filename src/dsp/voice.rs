use crate::dsp::curve;
use crate::params::ChannelParams;

/*
Phasor-Clocked Envelope Voice
=============================

One voice is one sounding note instance. Unlike a wall-clock ADSR, progress
through a stage is measured against an externally supplied phase ramp in
[0, 1), so the envelope tracks a tempo-synced phasor whose rate can change
or jump between updates.

Vocabulary
----------

  stage             Attack, Decay, Sustain, Release, or Ended. Exactly one
                    holds at any time. Ended voices output 0 and report
                    not-alive so the owner can drop them.

  reference phase   The phasor value recorded at the last stage transition.
                    Elapsed progress within a stage is the circular distance
                    from this point.

  wrapped           Set once the stage-relative phase has been observed to
                    decrease, i.e. the phasor completed a full cycle since
                    the reference point. Acts as the alternate "stage is
                    over" signal: when the phasor advances by more than a
                    stage duration in a single update, the plain
                    `phase > duration` comparison may never fire on an
                    exact tick, and the stage would stall without it.

  hold              A maximum duration measured from voice onset. Once the
                    circular distance from the onset phase exceeds it, the
                    voice is forced into Release regardless of gate state.

Stage transitions rewrite the reference phase exactly once; the boundary
sample emits the stage's terminal level (peak, sustain floor, or zero) so
the next stage's spline starts from the same value it ends at.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Attack,
    Decay,
    Sustain,
    Release,
    Ended,
}

/// One independent instance of the envelope state machine.
#[derive(Debug, Clone)]
pub struct EnvelopeVoice {
    stage: Stage,
    target_amplitude: f32,
    reference_phase: f32,
    last_observed_phase: f32,
    wrapped: bool,
    last_sustain_level: f32,
    onset_phase: f32,
    gated: bool,
}

/// Circular distance from `reference` to `f` on the [0, 1) phase ring.
#[inline]
fn circular_delta(f: f32, reference: f32) -> f32 {
    let delta = f - reference;
    if delta < 0.0 {
        delta + 1.0
    } else {
        delta
    }
}

impl EnvelopeVoice {
    /// An inert voice slot: outputs 0 and reports not-alive until restarted.
    pub fn idle() -> Self {
        Self {
            stage: Stage::Ended,
            target_amplitude: 0.0,
            reference_phase: 0.0,
            last_observed_phase: 0.0,
            wrapped: false,
            last_sustain_level: 0.0,
            onset_phase: 0.0,
            gated: false,
        }
    }

    /// Starts a voice at gate amplitude `amplitude` and phasor value `phase`.
    ///
    /// Zero-duration stages are skipped at onset: attack == 0 goes straight
    /// to Decay, and to Sustain if decay == 0 as well.
    pub fn start(amplitude: f32, phase: f32, ch: &ChannelParams) -> Self {
        let stage = if ch.attack == 0.0 {
            if ch.decay == 0.0 {
                Stage::Sustain
            } else {
                Stage::Decay
            }
        } else {
            Stage::Attack
        };

        Self {
            stage,
            target_amplitude: amplitude,
            reference_phase: phase,
            last_observed_phase: 0.0,
            wrapped: false,
            last_sustain_level: amplitude,
            onset_phase: phase,
            gated: true,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// False once the voice has reached Ended.
    pub fn is_alive(&self) -> bool {
        self.stage != Stage::Ended
    }

    /// True while the originating gate is still high.
    pub fn is_gated(&self) -> bool {
        self.gated
    }

    pub fn target_amplitude(&self) -> f32 {
        self.target_amplitude
    }

    /// Gate amplitude changed while the voice is active (mono mode).
    ///
    /// The new amplitude always becomes the ramp target, so an in-progress
    /// Attack bends toward the new peak without restarting. The sustain
    /// snapshot is only rewritten in Decay/Sustain; a mid-Attack change
    /// leaves it to the normal per-sample refresh.
    pub fn retarget(&mut self, amplitude: f32, sustain: f32) {
        self.target_amplitude = amplitude;
        if matches!(self.stage, Stage::Decay | Stage::Sustain) {
            self.last_sustain_level = amplitude * sustain;
        }
    }

    /// Forces the voice into Release (or straight to Ended when the release
    /// duration is 0) at phasor value `phase`. No-op once already there.
    pub fn release(&mut self, phase: f32, release_duration: f32) {
        if matches!(self.stage, Stage::Release | Stage::Ended) {
            return;
        }
        self.stage = if release_duration > 0.0 {
            Stage::Release
        } else {
            Stage::Ended
        };
        self.begin_stage(phase);
        self.gated = false;
    }

    fn begin_stage(&mut self, phase: f32) {
        self.reference_phase = phase;
        self.last_observed_phase = 0.0;
        self.wrapped = false;
    }

    /// Advances the voice by one phase sample and returns its output level.
    ///
    /// `f` is the channel's current phasor value in [0, 1). The caller checks
    /// [`is_alive`](Self::is_alive) afterwards to drop finished voices.
    pub fn advance(&mut self, f: f32, ch: &ChannelParams) -> f32 {
        let mut phase = circular_delta(f, self.reference_phase);
        if phase < self.last_observed_phase {
            self.wrapped = true;
        } else {
            self.last_observed_phase = phase;
        }

        // Hold timeout: measured from onset, independent of the gate.
        if ch.hold > 0.0 && !matches!(self.stage, Stage::Release | Stage::Ended) {
            let held = circular_delta(f, self.onset_phase);
            if held > ch.hold {
                self.stage = if ch.release > 0.0 {
                    Stage::Release
                } else {
                    Stage::Ended
                };
                self.begin_stage(f);
                self.gated = false;
                phase = 0.0;
            }
        }

        let out = match self.stage {
            Stage::Attack => {
                if phase > ch.attack || self.wrapped {
                    self.begin_stage(f);
                    if ch.decay == 0.0 {
                        self.stage = Stage::Sustain;
                        self.last_sustain_level = self.target_amplitude * ch.sustain;
                    } else {
                        self.stage = Stage::Decay;
                        self.last_sustain_level = self.target_amplitude;
                    }
                    self.last_sustain_level
                } else {
                    let progress = curve::shape(
                        curve::normalize(phase, ch.attack),
                        ch.attack_pow,
                        ch.attack_bipow,
                    );
                    let level = curve::smooth_interpolate(0.0, self.target_amplitude, progress);
                    if progress != 0.0 {
                        self.last_sustain_level = level;
                    }
                    level
                }
            }

            Stage::Decay => {
                let floor = self.target_amplitude * ch.sustain;
                if phase > ch.decay || self.wrapped {
                    self.begin_stage(f);
                    self.stage = Stage::Sustain;
                    self.last_sustain_level = floor;
                    floor
                } else {
                    let progress = curve::shape(
                        curve::normalize(phase, ch.decay),
                        ch.decay_pow,
                        ch.decay_bipow,
                    );
                    let level =
                        curve::smooth_interpolate(self.target_amplitude, floor, progress);
                    self.last_sustain_level = level;
                    level
                }
            }

            Stage::Sustain => {
                // Refreshed every sample so a live sustain-level change is
                // reflected immediately.
                let level = self.target_amplitude * ch.sustain;
                self.last_sustain_level = level;
                level
            }

            Stage::Release => {
                if phase > ch.release || self.wrapped {
                    self.begin_stage(f);
                    self.stage = Stage::Ended;
                    0.0
                } else {
                    let progress = curve::shape(
                        curve::normalize(phase, ch.release),
                        ch.release_pow,
                        ch.release_bipow,
                    );
                    curve::smooth_interpolate(self.last_sustain_level, 0.0, progress)
                }
            }

            Stage::Ended => 0.0,
        };

        debug_assert!(out.is_finite());
        out
    }
}
