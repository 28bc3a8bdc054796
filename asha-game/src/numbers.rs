//! Numeric conversion helpers centralizing the crate's lossy casts.

use num_traits::cast::cast;

/// Widen a u32 to f64.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Convert a usize to f64, allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Round a f64 to the nearest integer and clamp it into the u8 range,
/// returning 0 for NaN.
#[must_use]
pub fn round_f64_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, f64::from(u8::MAX)).round();
    cast::<f64, u8>(clamped).unwrap_or(0)
}

/// `part / whole` as a whole-number percentage, rounded to nearest.
/// An empty whole scores 0.
#[must_use]
pub fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    round_f64_to_u8(usize_to_f64(part) / usize_to_f64(whole) * 100.0)
}
