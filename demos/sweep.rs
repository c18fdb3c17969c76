/// Demonstrates the phasor-clocked envelope lifecycle
/// Sweeps a phasor through one gate on/off cycle and plots the output
use phasor_env::engine::EnvelopeEngine;

const TICKS: usize = 80;
const PLOT_WIDTH: usize = 50;

fn main() {
    println!("=== Phasor Envelope Sweep ===\n");

    let attack = 0.15;
    let decay = 0.1;
    let sustain = 0.5;
    let release = 0.2;

    println!("Envelope parameters (phase fractions):");
    println!("  Attack:  {attack}");
    println!("  Decay:   {decay}");
    println!("  Sustain: {sustain} (level)");
    println!("  Release: {release}\n");

    let mut engine = EnvelopeEngine::new();
    engine.set_attack(vec![attack]).unwrap();
    engine.set_decay(vec![decay]).unwrap();
    engine.set_sustain(vec![sustain]).unwrap();
    engine.set_release(vec![release]).unwrap();
    engine.set_attack_pow(vec![0.4]).unwrap();

    // Gate on for the first half of the sweep, off for the rest.
    engine.gate_changed(&[1.0]);

    for tick in 0..TICKS {
        let f = (tick as f32 / TICKS as f32) % 1.0;
        if tick == TICKS / 2 {
            engine.gate_changed(&[0.0]);
        }

        engine.phase_changed(&[f]);
        let level = engine.output()[0];

        let bar = "#".repeat((level * PLOT_WIDTH as f32).round() as usize);
        println!("{f:>5.3} | {bar}");
    }

    println!("\nPreview curve ({} samples):", engine.preview().len());
    let preview: Vec<String> = engine
        .preview()
        .iter()
        .step_by(10)
        .map(|v| format!("{v:.2}"))
        .collect();
    println!("  {}", preview.join(" "));
}
