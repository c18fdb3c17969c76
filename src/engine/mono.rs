use crate::dsp::EnvelopeVoice;
use crate::params::{value_for_channel, EnvelopeParams};
use crate::GATE_THRESHOLD;

/// Mono channel driver: exactly one voice slot per channel, restarted in
/// place on every rising gate edge.
///
/// Edge detection happens synchronously inside the phase dispatch by
/// comparing the current gate sample against the previous one, so a gate
/// pulse shorter than one phase update is coalesced away. That is the
/// documented mono trade-off; the poly driver exists for pulse-accurate
/// triggering.
pub struct MonoDriver {
    channels: Vec<MonoChannel>,
}

struct MonoChannel {
    voice: EnvelopeVoice,
    last_gate: f32,
}

impl MonoChannel {
    fn idle() -> Self {
        Self {
            voice: EnvelopeVoice::idle(),
            last_gate: 0.0,
        }
    }
}

impl MonoDriver {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Drops all per-channel state and resizes to `count` idle channels.
    pub fn reinit(&mut self, count: usize) {
        self.channels.clear();
        self.channels.resize_with(count, MonoChannel::idle);
    }

    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            *channel = MonoChannel::idle();
        }
    }

    /// Channels whose voice slot is currently sounding.
    pub fn voice_count(&self) -> usize {
        self.channels.iter().filter(|c| c.voice.is_alive()).count()
    }

    /// One phase dispatch: detect gate edges, then advance every channel's
    /// voice. `gate.len()` equals the channel count; `phase` broadcasts.
    pub fn process(
        &mut self,
        phase: &[f32],
        gate: &[f32],
        params: &EnvelopeParams,
        out: &mut [f32],
    ) {
        debug_assert_eq!(gate.len(), self.channels.len());
        debug_assert_eq!(out.len(), self.channels.len());

        for (i, channel) in self.channels.iter_mut().enumerate() {
            let current = gate[i];
            let f = value_for_channel(phase, i);
            let ch = params.channel(i);

            let was_off = channel.last_gate <= GATE_THRESHOLD;
            let is_on = current > GATE_THRESHOLD;

            if was_off && is_on {
                // Rising edge: restart the slot in place.
                channel.voice = EnvelopeVoice::start(current, f, &ch);
            } else if !was_off && !is_on {
                // Falling edge: release now unless a hold timer is armed,
                // in which case the timeout inside `advance` takes over.
                if ch.hold == 0.0 {
                    channel.voice.release(f, ch.release);
                }
            } else if is_on
                && (current - channel.voice.target_amplitude()).abs() > GATE_THRESHOLD
            {
                // Amplitude change while active: retarget, never retrigger.
                channel.voice.retarget(current, ch.sustain);
            }

            out[i] = channel.voice.advance(f, &ch);
            channel.last_gate = current;
        }
    }
}

impl Default for MonoDriver {
    fn default() -> Self {
        Self::new()
    }
}
