//! Low-level envelope primitives used by the channel drivers.
//!
//! These components are allocation-free and deterministic, making them safe
//! to embed directly inside per-channel voice collections. They intentionally
//! stay focused on the stage math so the engine layer can own event ordering
//! and channel lifecycle.

/// Curve warping and stage interpolation functions.
pub mod curve;
/// Per-voice stage state machine driven by an external phasor.
pub mod voice;

pub use voice::{EnvelopeVoice, Stage};
