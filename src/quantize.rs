//! Quantization error arithmetic.
//!
//! Slice-level primitives used on every pixel of an error-diffusion pass.
//! [`PixelBuffer`](crate::PixelBuffer) wraps these with channel-count checks;
//! call them directly when the lengths are already known to match.

use alloc::vec;
use alloc::vec::Vec;

/// Saturating, truncating conversion of a channel value to `u8`.
///
/// Values below 0 become 0, values above 255 become 255, and in-range values
/// drop their fractional part (`100.9 -> 100`, never rounded). NaN maps to 0.
#[inline]
pub fn clamp_channel(value: f64) -> u8 {
    // `as` saturates at the u8 bounds and truncates toward zero.
    value as u8
}

/// Per-channel `original[i] - quantized[i]` as signed reals in `[-255, 255]`.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn quantization_error(original: &[u8], quantized: &[u8]) -> Vec<f64> {
    let mut errors = vec![0.0; original.len()];
    quantization_error_into(original, quantized, &mut errors);
    errors
}

/// Allocation-free form of [`quantization_error`], writing into `out`.
///
/// # Panics
///
/// Panics if the three slices differ in length.
#[inline]
pub fn quantization_error_into(original: &[u8], quantized: &[u8], out: &mut [f64]) {
    assert!(
        original.len() == quantized.len() && original.len() == out.len(),
        "channel length mismatch (original: {}, quantized: {}, out: {})",
        original.len(),
        quantized.len(),
        out.len()
    );
    for ((e, &o), &q) in out.iter_mut().zip(original).zip(quantized) {
        *e = f64::from(o) - f64::from(q);
    }
}

/// Add `errors[i] * multiplier` to each channel of `values` in place,
/// saturating at `[0, 255]` with [`clamp_channel`].
///
/// Channels whose error is exactly zero are left untouched.
///
/// # Panics
///
/// Panics if `values` and `errors` differ in length.
#[inline]
pub fn apply_quantization_error(values: &mut [u8], errors: &[f64], multiplier: f64) {
    assert!(
        values.len() == errors.len(),
        "channel length mismatch (values: {}, errors: {})",
        values.len(),
        errors.len()
    );
    for (v, &e) in values.iter_mut().zip(errors) {
        // A zero error leaves the channel alone even for a non-finite multiplier.
        if e != 0.0 {
            *v = clamp_channel(f64::from(*v) + e * multiplier);
        }
    }
}
