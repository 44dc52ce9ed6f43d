//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Saturate `value` into `[min, max]`.
///
/// Total for any inputs: the upper bound is applied first and the lower bound
/// wins when the bounds are inverted.
#[must_use]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    let capped = if value > max { max } else { value };
    if capped < min { min } else { capped }
}

/// Round a f64 (half away from zero) and clamp it to the u32 range, returning
/// 0 for NaN values.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).round();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Floor a f64 and clamp it to the u32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).floor();
    cast::<f64, u32>(clamped).unwrap_or(0)
}
