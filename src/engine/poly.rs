use log::trace;

use crate::dsp::EnvelopeVoice;
use crate::params::{value_for_channel, EnvelopeParams};
use crate::GATE_THRESHOLD;

/*
Poly Channel Driver
===================

Each channel owns a size-varying collection of concurrently live voices plus
two pending-event queues. Two listeners cooperate:

  gate listener    Fires on every gate-vector change, independent of the
                   phase clock. Rising edges append the gate amplitude to
                   `pending_onsets`; falling edges set `pending_release`.
                   Recording edges instead of acting on them means a pulse
                   that rises and falls entirely between two phase updates
                   still produces one complete voice lifecycle instead of
                   being coalesced away.

  phase listener   Fires on every phase-vector change and is the only place
                   voices are created, released, advanced or removed. Per
                   channel, in fixed order: drain pending onsets into new
                   voices, then release every still-gated voice if a release
                   is pending, then advance all live voices and sum their
                   outputs, pruning the dead. The order guarantees a voice
                   spawned and released by the same catch-up dispatch still
                   receives one advance reflecting its starting state.

The channel's output sample is the voice sum clamped to [0, 1].
*/
pub struct PolyDriver {
    channels: Vec<PolyChannel>,
}

struct PolyChannel {
    voices: Vec<EnvelopeVoice>,
    pending_onsets: Vec<f32>,
    pending_release: bool,
    // Edge-detector state, owned by the gate listener alone so the two
    // listeners never interfere.
    last_gate: f32,
}

impl PolyChannel {
    fn empty() -> Self {
        Self {
            voices: Vec::new(),
            pending_onsets: Vec::new(),
            pending_release: false,
            last_gate: 0.0,
        }
    }
}

impl PolyDriver {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Drops all per-channel state and resizes to `count` empty channels.
    pub fn reinit(&mut self, count: usize) {
        self.channels.clear();
        self.channels.resize_with(count, PolyChannel::empty);
    }

    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            *channel = PolyChannel::empty();
        }
    }

    /// Total live voices across all channels.
    pub fn voice_count(&self) -> usize {
        self.channels.iter().map(|c| c.voices.len()).sum()
    }

    /// Gate listener: captures rising/falling edges into the pending queues.
    pub fn capture_edges(&mut self, gate: &[f32]) {
        debug_assert_eq!(gate.len(), self.channels.len());

        for (i, channel) in self.channels.iter_mut().enumerate() {
            let current = gate[i];
            let was_off = channel.last_gate <= GATE_THRESHOLD;
            let is_on = current > GATE_THRESHOLD;

            if was_off && is_on {
                channel.pending_onsets.push(current);
                trace!("channel {i}: queued onset at amplitude {current}");
            } else if !was_off && !is_on {
                channel.pending_release = true;
                trace!("channel {i}: queued release");
            }
            channel.last_gate = current;
        }
    }

    /// Phase listener: realizes queued events, advances and mixes voices.
    pub fn process(&mut self, phase: &[f32], params: &EnvelopeParams, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.channels.len());

        for (i, channel) in self.channels.iter_mut().enumerate() {
            let f = value_for_channel(phase, i);
            let ch = params.channel(i);

            for amplitude in channel.pending_onsets.drain(..) {
                channel.voices.push(EnvelopeVoice::start(amplitude, f, &ch));
            }

            if channel.pending_release {
                for voice in channel.voices.iter_mut().filter(|v| v.is_gated()) {
                    voice.release(f, ch.release);
                }
                channel.pending_release = false;
            }

            let mut sum = 0.0;
            channel.voices.retain_mut(|voice| {
                sum += voice.advance(f, &ch);
                voice.is_alive()
            });

            out[i] = sum.clamp(0.0, 1.0);
        }
    }
}

impl Default for PolyDriver {
    fn default() -> Self {
        Self::new()
    }
}
