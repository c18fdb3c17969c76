pub mod dsp;
pub mod engine; // Mono and poly channel drivers
pub mod params; // Per-channel parameter vectors with broadcasting
pub mod preview; // Offline curve rendering for display

/// Gate amplitudes at or below this are treated as "off" (hysteresis floor).
pub const GATE_THRESHOLD: f32 = 0.001;
