use log::warn;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::engine::EnvelopeEngine;

/// Control messages a host thread can send to a [`SharedEnvelopeEngine`].
#[derive(Debug, Clone)]
pub enum EngineMessage {
    Gate(Vec<f32>),
    Phase(Vec<f32>),
    Param(ParamUpdate),
    PolyMode(bool),
    Reset,
}

/// A replacement vector for one of the per-channel parameters.
#[derive(Debug, Clone)]
pub enum ParamUpdate {
    Hold(Vec<f32>),
    Attack(Vec<f32>),
    Decay(Vec<f32>),
    Sustain(Vec<f32>),
    Release(Vec<f32>),
    AttackPow(Vec<f32>),
    AttackBiPow(Vec<f32>),
    DecayPow(Vec<f32>),
    DecayBiPow(Vec<f32>),
    ReleasePow(Vec<f32>),
    ReleaseBiPow(Vec<f32>),
}

/// Producer side of the control queue, held by the host.
pub struct EngineHandle {
    tx: Producer<EngineMessage>,
}

impl EngineHandle {
    pub fn send(&mut self, message: EngineMessage) {
        // A full queue drops the message; the next update wins anyway.
        let _ = self.tx.push(message);
    }

    pub fn gate(&mut self, gate: Vec<f32>) {
        self.send(EngineMessage::Gate(gate));
    }

    pub fn phase(&mut self, phase: Vec<f32>) {
        self.send(EngineMessage::Phase(phase));
    }

    pub fn set_poly_mode(&mut self, poly: bool) {
        self.send(EngineMessage::PolyMode(poly));
    }

    pub fn reset(&mut self) {
        self.send(EngineMessage::Reset);
    }
}

const ENGINE_QUEUE_SIZE: usize = 64;

/// An [`EnvelopeEngine`] fed through a single-consumer queue.
///
/// Draining the queue and dispatching happen on one thread inside
/// [`update`](Self::update), so the engine keeps its single-writer,
/// run-to-completion semantics even when the host produces updates
/// elsewhere. Messages are applied strictly in arrival order, which is what
/// makes a queued gate pulse (on then off) land as two distinct edges.
pub struct SharedEnvelopeEngine {
    engine: EnvelopeEngine,
    rx: Consumer<EngineMessage>,
}

impl SharedEnvelopeEngine {
    pub fn new(engine: EnvelopeEngine) -> (Self, EngineHandle) {
        let (tx, rx) = RingBuffer::<EngineMessage>::new(ENGINE_QUEUE_SIZE);
        (Self { engine, rx }, EngineHandle { tx })
    }

    pub fn engine(&self) -> &EnvelopeEngine {
        &self.engine
    }

    /// Drains all queued control messages in order.
    pub fn update(&mut self) {
        while let Ok(message) = self.rx.pop() {
            match message {
                EngineMessage::Gate(gate) => self.engine.gate_changed(&gate),
                EngineMessage::Phase(phase) => self.engine.phase_changed(&phase),
                EngineMessage::Param(update) => self.apply_param(update),
                EngineMessage::PolyMode(poly) => self.engine.set_poly_mode(poly),
                EngineMessage::Reset => self.engine.reset(),
            }
        }
    }

    fn apply_param(&mut self, update: ParamUpdate) {
        let result = match update {
            ParamUpdate::Hold(v) => self.engine.set_hold(v),
            ParamUpdate::Attack(v) => self.engine.set_attack(v),
            ParamUpdate::Decay(v) => self.engine.set_decay(v),
            ParamUpdate::Sustain(v) => self.engine.set_sustain(v),
            ParamUpdate::Release(v) => self.engine.set_release(v),
            ParamUpdate::AttackPow(v) => self.engine.set_attack_pow(v),
            ParamUpdate::AttackBiPow(v) => self.engine.set_attack_bipow(v),
            ParamUpdate::DecayPow(v) => self.engine.set_decay_pow(v),
            ParamUpdate::DecayBiPow(v) => self.engine.set_decay_bipow(v),
            ParamUpdate::ReleasePow(v) => self.engine.set_release_pow(v),
            ParamUpdate::ReleaseBiPow(v) => self.engine.set_release_bipow(v),
        };
        if let Err(err) = result {
            warn!("rejected parameter update: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_pulse_arrives_as_two_edges() {
        let mut engine = EnvelopeEngine::new();
        engine.set_poly_mode(true);
        engine.set_release(vec![0.2]).unwrap();
        let (mut shared, mut handle) = SharedEnvelopeEngine::new(engine);

        handle.gate(vec![1.0]);
        handle.gate(vec![0.0]);
        handle.phase(vec![0.1]);
        shared.update();

        assert_eq!(shared.engine().voice_count(), 1);
        assert!(shared.engine().output()[0] > 0.0);
    }

    #[test]
    fn rejected_param_update_keeps_previous_value() {
        let engine = EnvelopeEngine::new();
        let (mut shared, mut handle) = SharedEnvelopeEngine::new(engine);

        handle.send(EngineMessage::Param(ParamUpdate::Attack(vec![0.5])));
        handle.send(EngineMessage::Param(ParamUpdate::Attack(vec![])));
        shared.update();

        assert_eq!(shared.engine().params().attack, vec![0.5]);
    }
}
