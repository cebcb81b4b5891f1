//! Numeric helpers shared by the analysis stages and every visualization mode.
//!
//! The plain functions never fail: degenerate input yields `0.0` so a single
//! bad frame cannot halt the animation. The `checked_*` variants report the
//! degenerate case for callers that want to know about it.

use crate::error::MathError;

/// Arithmetic mean, or `0.0` for an empty slice.
pub fn average<T: Copy + Into<f32>>(values: &[T]) -> f32 {
    checked_average(values).unwrap_or(0.0)
}

pub fn checked_average<T: Copy + Into<f32>>(values: &[T]) -> Result<f32, MathError> {
    if values.is_empty() {
        return Err(MathError::EmptyInput);
    }
    let sum: f32 = values.iter().map(|&v| v.into()).sum();
    Ok(sum / values.len() as f32)
}

/// Largest element, or `0.0` for an empty slice.
pub fn maximum<T: Copy + Into<f32>>(values: &[T]) -> f32 {
    checked_maximum(values).unwrap_or(0.0)
}

pub fn checked_maximum<T: Copy + Into<f32>>(values: &[T]) -> Result<f32, MathError> {
    values
        .iter()
        .map(|&v| v.into())
        .reduce(f32::max)
        .ok_or(MathError::EmptyInput)
}

/// Position of `value` within `[min, max]` as a fraction. Not clamped.
///
/// Returns `0.0` when `min == max`; see [`checked_fractional`].
pub fn fractional(value: f32, min: f32, max: f32) -> f32 {
    checked_fractional(value, min, max).unwrap_or(0.0)
}

pub fn checked_fractional(value: f32, min: f32, max: f32) -> Result<f32, MathError> {
    let span = max - min;
    if span == 0.0 {
        return Err(MathError::DegenerateRange(min));
    }
    Ok((value - min) / span)
}

/// Linear remap of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Values outside the input range extrapolate; audio energy regularly
/// overshoots the nominal range and modes rely on seeing that.
pub fn modulation(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + fractional(value, in_min, in_max) * (out_max - out_min)
}

pub fn checked_modulation(
    value: f32,
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
) -> Result<f32, MathError> {
    Ok(out_min + checked_fractional(value, in_min, in_max)? * (out_max - out_min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fractional_midpoint() {
        assert_eq!(fractional(5.0, 0.0, 10.0), 0.5);
    }

    #[test]
    fn test_modulation_midpoint() {
        assert_eq!(modulation(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
    }

    #[test]
    fn test_modulation_endpoints() {
        assert_eq!(modulation(0.0, 0.0, 255.0, 1.0, 50.0), 1.0);
        assert_eq!(modulation(255.0, 0.0, 255.0, 1.0, 50.0), 50.0);
        assert_eq!(modulation(0.0, 0.0, 255.0, -20.0, 20.0), -20.0);
    }

    #[test]
    fn test_modulation_extrapolates() {
        // 20 is past the input range; the output overshoots instead of clamping
        assert_eq!(modulation(20.0, 0.0, 10.0, 0.0, 100.0), 200.0);
        assert_eq!(modulation(-10.0, 0.0, 10.0, 0.0, 100.0), -100.0);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(fractional(3.0, 2.0, 2.0), 0.0);
        assert_eq!(
            checked_fractional(3.0, 2.0, 2.0),
            Err(MathError::DegenerateRange(2.0))
        );
        assert!(checked_modulation(1.0, 4.0, 4.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_empty_reductions() {
        let empty: [u8; 0] = [];
        assert_eq!(average(&empty), 0.0);
        assert_eq!(maximum(&empty), 0.0);
        assert_eq!(checked_average(&empty), Err(MathError::EmptyInput));
        assert_eq!(checked_maximum(&empty), Err(MathError::EmptyInput));
    }

    #[test]
    fn test_reductions_over_bytes() {
        let values: [u8; 4] = [10, 20, 30, 250];
        assert_eq!(average(&values), 77.5);
        assert_eq!(maximum(&values), 250.0);
    }

    proptest! {
        #[test]
        fn average_and_maximum_ignore_order(mut values in prop::collection::vec(0u8..=255, 1..64)) {
            let avg = average(&values);
            let max = maximum(&values);
            values.reverse();
            let mid = values.len() / 2;
            values.rotate_left(mid);
            prop_assert!((average(&values) - avg).abs() < 1e-3);
            prop_assert_eq!(maximum(&values), max);
        }

        #[test]
        fn modulation_is_linear(
            a in -500.0f32..500.0,
            width in 1.0f32..500.0,
            c in -500.0f32..500.0,
            d in -500.0f32..500.0,
        ) {
            let b = a + width;
            let tolerance = 1e-2 * (1.0 + c.abs() + d.abs());
            prop_assert!((modulation(a, a, b, c, d) - c).abs() < tolerance);
            prop_assert!((modulation(b, a, b, c, d) - d).abs() < tolerance);
            let mid = modulation((a + b) / 2.0, a, b, c, d);
            prop_assert!((mid - (c + d) / 2.0).abs() < tolerance);
        }
    }
}
