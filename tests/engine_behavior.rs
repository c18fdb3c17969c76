//! End-to-end behavior of the envelope engine at its public boundary.

use phasor_env::engine::EnvelopeEngine;

/// Steps the phasor from `start` by `step` (wrapping at 1.0) for `ticks`
/// dispatches and returns the channel-0 output trace.
fn sweep(engine: &mut EnvelopeEngine, start: f32, step: f32, ticks: usize) -> Vec<f32> {
    let mut trace = Vec::with_capacity(ticks);
    let mut f = start;
    for _ in 0..ticks {
        engine.phase_changed(&[f]);
        trace.push(engine.output()[0]);
        f = (f + step) % 1.0;
    }
    trace
}

#[test]
fn full_mono_lifecycle_rises_holds_and_decays() {
    let mut engine = EnvelopeEngine::new();
    engine.set_attack(vec![0.1]).unwrap();
    engine.set_decay(vec![0.1]).unwrap();
    engine.set_sustain(vec![0.5]).unwrap();
    engine.set_release(vec![0.1]).unwrap();

    engine.gate_changed(&[1.0]);
    let trace = sweep(&mut engine, 0.0, 0.01, 40);

    // Attack rises toward the peak...
    assert!(trace[5] > trace[1]);
    let peak = trace.iter().cloned().fold(0.0f32, f32::max);
    assert!(peak > 0.9, "peak was {peak}");
    // ...then settles at the sustain level.
    assert!((trace[39] - 0.5).abs() < 1e-3, "got {}", trace[39]);

    // Gate off: release ramps down to silence and stays there.
    engine.gate_changed(&[0.0]);
    let tail = sweep(&mut engine, 0.41, 0.01, 20);
    assert!(tail[1] <= 0.5);
    assert_eq!(*tail.last().unwrap(), 0.0);
}

#[test]
fn sustain_output_is_stable_across_dispatches() {
    let mut engine = EnvelopeEngine::new();
    engine.set_sustain(vec![0.6]).unwrap();

    engine.gate_changed(&[0.8]);
    let trace = sweep(&mut engine, 0.0, 0.017, 60);
    for sample in &trace {
        assert!((sample - 0.8 * 0.6).abs() < 1e-6);
    }
}

#[test]
fn poly_pulse_between_dispatches_produces_one_lifecycle() {
    let mut engine = EnvelopeEngine::new();
    engine.set_poly_mode(true);
    engine.set_attack(vec![0.05]).unwrap();
    engine.set_release(vec![0.05]).unwrap();

    // The pulse rises and falls with no phase update in between.
    engine.gate_changed(&[1.0]);
    engine.gate_changed(&[0.0]);

    engine.phase_changed(&[0.2]);
    assert_eq!(engine.voice_count(), 1, "pulse must not be coalesced away");
    assert!(engine.output()[0] > 0.0);

    engine.phase_changed(&[0.3]);
    assert_eq!(engine.voice_count(), 0, "pulse voice must complete and die");
    assert_eq!(engine.output()[0], 0.0);
}

#[test]
fn poly_overlapping_notes_mix_additively() {
    let mut engine = EnvelopeEngine::new();
    engine.set_poly_mode(true);
    engine.set_release(vec![0.5]).unwrap();

    // First note sustains at 0.6.
    engine.gate_changed(&[0.6]);
    engine.phase_changed(&[0.0]);
    assert!((engine.output()[0] - 0.6).abs() < 1e-6);

    // Release it, then start a second note; the first is still ramping
    // down when the second reaches sustain.
    engine.gate_changed(&[0.0]);
    engine.phase_changed(&[0.05]);
    engine.gate_changed(&[0.6]);
    engine.phase_changed(&[0.1]);

    assert_eq!(engine.voice_count(), 2);
    let mixed = engine.output()[0];
    assert!(mixed >= 0.6, "sum must be at least the sustaining note");
    assert!(mixed <= 1.0, "sum must stay clamped");
}

#[test]
fn mono_amplitude_change_rescales_without_retrigger() {
    let mut engine = EnvelopeEngine::new();
    engine.set_attack(vec![0.1]).unwrap();
    engine.set_sustain(vec![0.5]).unwrap();

    engine.gate_changed(&[0.5]);
    sweep(&mut engine, 0.0, 0.01, 20);
    assert!((engine.output()[0] - 0.25).abs() < 1e-6);

    // 0.5 -> 0.8 while sustaining: output follows proportionally on the
    // next dispatch and never dips back through an attack ramp.
    engine.gate_changed(&[0.8]);
    let trace = sweep(&mut engine, 0.21, 0.01, 5);
    for sample in &trace {
        assert!((sample - 0.4).abs() < 1e-6, "got {sample}");
    }
}

#[test]
fn hold_releases_a_never_ending_gate() {
    let mut engine = EnvelopeEngine::new();
    engine.set_hold(vec![0.3]).unwrap();
    engine.set_release(vec![0.1]).unwrap();

    engine.gate_changed(&[1.0]);
    let trace = sweep(&mut engine, 0.0, 0.01, 50);

    // The gate never falls, yet by onset + 0.4 (one update of slack) the
    // voice has released to silence.
    assert_eq!(trace[44], 0.0, "hold must have forced the release");
    assert!(trace[5] > 0.0, "voice sounds before the hold expires");
}

#[test]
fn short_parameter_vectors_broadcast_over_channels() {
    let mut engine = EnvelopeEngine::new();
    engine.set_sustain(vec![0.25, 0.75]).unwrap();

    engine.gate_changed(&[1.0, 1.0, 1.0, 1.0]);
    engine.phase_changed(&[0.1]);

    // Channel 0 uses its own value, channels past the end reuse the last.
    assert_eq!(engine.output(), &[0.25, 0.75, 0.75, 0.75]);
}

#[test]
fn preview_tracks_shape_parameter_changes() {
    let mut engine = EnvelopeEngine::new();
    let flat = engine.preview().to_vec();

    engine.set_attack(vec![0.2]).unwrap();
    engine.set_release(vec![0.2]).unwrap();
    let shaped = engine.preview().to_vec();

    assert_ne!(flat.len(), shaped.len());
    assert!(shaped.first().unwrap() < &0.1, "preview starts near zero");
    assert!(shaped.iter().cloned().fold(0.0f32, f32::max) > 0.9);
}

#[test]
fn reset_silences_everything_but_keeps_configuration() {
    let mut engine = EnvelopeEngine::new();
    engine.set_poly_mode(true);
    engine.set_sustain(vec![0.7]).unwrap();

    engine.gate_changed(&[1.0, 1.0]);
    engine.phase_changed(&[0.1, 0.1]);
    assert!(engine.voice_count() > 0);

    engine.reset();
    assert_eq!(engine.voice_count(), 0);
    assert_eq!(engine.output(), &[0.0, 0.0]);
    assert_eq!(engine.params().sustain, vec![0.7]);

    // A fresh edge starts voices again after the reset.
    engine.gate_changed(&[0.0, 0.0]);
    engine.gate_changed(&[1.0, 1.0]);
    engine.phase_changed(&[0.2, 0.2]);
    assert_eq!(engine.voice_count(), 2);
}
