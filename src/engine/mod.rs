//! Channel drivers and the top-level engine dispatch.

pub mod mono;
pub mod poly;

#[cfg(feature = "rtrb")]
pub mod handle;

use log::debug;

use crate::params::{sanitize, EnvelopeParams, ParamError};
use crate::preview;

pub use mono::MonoDriver;
pub use poly::PolyDriver;

#[cfg(feature = "rtrb")]
pub use handle::{EngineHandle, EngineMessage, ParamUpdate, SharedEnvelopeEngine};

/// The envelope engine: turns gate edges and an external phasor into one
/// amplitude sample per channel.
///
/// The engine is single-threaded and cooperative: [`gate_changed`] and
/// [`phase_changed`] run to completion before the next dispatch, channels
/// are processed in index order, and within a channel queued onsets are
/// realized before queued releases, which are realized before voices are
/// advanced. Hosts driving the engine from another thread wrap it in
/// [`SharedEnvelopeEngine`], which preserves these semantics through a
/// single-consumer queue.
///
/// The channel count follows the gate vector's length; a length change of
/// either the gate or the phase vector reinitializes all per-channel state.
///
/// [`gate_changed`]: Self::gate_changed
/// [`phase_changed`]: Self::phase_changed
pub struct EnvelopeEngine {
    params: EnvelopeParams,
    poly_mode: bool,
    gate: Vec<f32>,
    output: Vec<f32>,
    preview: Vec<f32>,
    mono: MonoDriver,
    poly: PolyDriver,
    phase_len: usize,
}

impl EnvelopeEngine {
    pub fn new() -> Self {
        Self::with_params(EnvelopeParams::default())
    }

    pub fn with_params(params: EnvelopeParams) -> Self {
        let preview = preview::render(&params);
        Self {
            params,
            poly_mode: false,
            gate: Vec::new(),
            output: Vec::new(),
            preview,
            mono: MonoDriver::new(),
            poly: PolyDriver::new(),
            phase_len: 0,
        }
    }

    /// Per-channel output samples in [0, 1], written by the latest phase
    /// dispatch.
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Advisory attack/decay/sustain/release curve for display.
    pub fn preview(&self) -> &[f32] {
        &self.preview
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    pub fn poly_mode(&self) -> bool {
        self.poly_mode
    }

    /// Live voices across all channels.
    pub fn voice_count(&self) -> usize {
        if self.poly_mode {
            self.poly.voice_count()
        } else {
            self.mono.voice_count()
        }
    }

    /// Selects between the mono and poly channel drivers. Switching modes
    /// silences everything: the two drivers share no voice state.
    pub fn set_poly_mode(&mut self, poly: bool) {
        if self.poly_mode != poly {
            self.poly_mode = poly;
            self.reset();
        }
    }

    /// Kills every voice and clears all queues and edge state, keeping the
    /// current channel count and parameters.
    pub fn reset(&mut self) {
        self.mono.reset();
        self.poly.reset();
        self.output.fill(0.0);
    }

    /// Gate listener: a new gate vector arrived.
    ///
    /// In poly mode this captures rising/falling edges into the pending
    /// queues immediately, independent of the phase clock; in mono mode
    /// edge detection happens inside the next phase dispatch. The output
    /// vector is rewritten by phase dispatches only.
    pub fn gate_changed(&mut self, gate: &[f32]) {
        if gate.len() != self.gate.len() {
            self.reinit(gate.len());
        }
        if self.poly_mode {
            self.poly.capture_edges(gate);
        }
        self.gate.clear();
        self.gate.extend_from_slice(gate);
    }

    /// Phase listener: advances every channel and rewrites the output
    /// vector. `phase` broadcasts over channels with last-value-repeats.
    pub fn phase_changed(&mut self, phase: &[f32]) {
        debug_assert!(!phase.is_empty(), "phase vector must not be empty");
        if phase.is_empty() {
            return;
        }
        if phase.len() != self.phase_len {
            // The very first dispatch just records the length; reinit would
            // throw away events the gate listener has already queued.
            let first_dispatch = self.phase_len == 0;
            self.phase_len = phase.len();
            if !first_dispatch {
                self.reinit(self.gate.len());
            }
        }

        if self.poly_mode {
            self.poly.process(phase, &self.params, &mut self.output);
        } else {
            self.mono
                .process(phase, &self.gate, &self.params, &mut self.output);
        }

        for sample in &mut self.output {
            *sample = sample.clamp(0.0, 1.0);
        }
    }

    fn reinit(&mut self, channels: usize) {
        debug!("reinitializing envelope engine with {channels} channel(s)");
        self.mono.reinit(channels);
        self.poly.reinit(channels);
        self.output = vec![0.0; channels];
        self.gate.resize(channels, 0.0);
    }

    fn refresh_preview(&mut self) {
        self.preview = preview::render(&self.params);
    }

    pub fn set_hold(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.hold = sanitize("hold", values, 0.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_attack(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.attack = sanitize("attack", values, 0.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_decay(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.decay = sanitize("decay", values, 0.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_sustain(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.sustain = sanitize("sustain", values, 0.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_release(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.release = sanitize("release", values, 0.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_attack_pow(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.attack_pow = sanitize("attack_pow", values, -1.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_attack_bipow(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.attack_bipow = sanitize("attack_bipow", values, -1.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_decay_pow(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.decay_pow = sanitize("decay_pow", values, -1.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_decay_bipow(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.decay_bipow = sanitize("decay_bipow", values, -1.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_release_pow(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.release_pow = sanitize("release_pow", values, -1.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn set_release_bipow(&mut self, values: Vec<f32>) -> Result<(), ParamError> {
        self.params.release_bipow = sanitize("release_bipow", values, -1.0, 1.0)?;
        self.refresh_preview();
        Ok(())
    }
}

impl Default for EnvelopeEngine {
    fn default() -> Self {
        Self::new()
    }
}
