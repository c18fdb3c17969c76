/*
Curve Shaping
=============

Every envelope stage is a ramp between two levels, driven by a normalized
progress value in [0, 1]. Before interpolating, the progress can be warped by
two curve controls per stage:

  power       A one-sided rational warp. Positive amounts bow the ramp above
              the identity line (fast start, slow finish), negative amounts
              below it (slow start, fast finish). Zero is the exact identity.

  bipolar     The same warp applied symmetrically around the midpoint:
              progress is remapped to [-1, 1], warped, and remapped back.
              Produces an S-curve instead of a one-sided bow.

The actual level interpolation is a cubic spline rather than a straight
lerp. Because stage boundaries reuse the same level (attack ends at the peak,
decay starts at the peak), the spline is C1-continuous across transitions,
which removes the corner a linear ramp would leave.

The warp formula is rational, not pow()-based:

    k = 2a * 0.99999 / (1 - a * 0.999999)
    warped = v * (k + 1) / (k * |v| + 1)

The two fudge factors keep the denominator nonzero at a = 1. Using |v| in
the denominator makes the same formula valid for the bipolar case, where v
is in [-1, 1].
*/

/// One-sided rational warp of `value`, controlled by `amount` in [-1, 1].
/// `amount == 0` returns `value` unchanged.
#[inline]
pub fn power(value: f32, amount: f32) -> f32 {
    let k = (2.0 * amount * 0.99999) / (1.0 - amount * 0.999999);
    value * (k + 1.0) / (k * value.abs() + 1.0)
}

/// Symmetric S-curve warp: remaps `value` from [0, 1] to [-1, 1], applies
/// [`power`], and remaps back.
#[inline]
pub fn bipolar_power(value: f32, amount: f32) -> f32 {
    (power(value * 2.0 - 1.0, amount) + 1.0) / 2.0
}

/// Applies a stage's one-sided and bipolar warps in sequence.
#[inline]
pub fn shape(progress: f32, pow_amount: f32, bipow_amount: f32) -> f32 {
    let mut p = progress;
    if pow_amount != 0.0 {
        p = power(p, pow_amount);
    }
    if bipow_amount != 0.0 {
        p = bipolar_power(p, bipow_amount);
    }
    p
}

/// Maps an elapsed phase against a stage duration to clamped [0, 1] progress.
///
/// A non-positive duration reports the stage as complete; callers skip such
/// stages before ever ramping through them, so this is a guard, not a path.
#[inline]
pub fn normalize(phase: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (phase / duration).clamp(0.0, 1.0)
}

/// Cubic interpolation from `start` to `end` at `progress` in [0, 1].
///
/// This is a Catmull-Rom segment with both outer control points clamped to
/// the segment endpoints, so repeated boundary levels across stages join
/// smoothly. `progress` outside [0, 1] is undefined; callers clamp upstream.
#[inline]
pub fn smooth_interpolate(start: f32, end: f32, progress: f32) -> f32 {
    let delta = end - start;
    start + delta * progress * (0.5 + progress * (1.5 - progress))
}
