//! Number formatting for node fields.
//!
//! Geometry and style values are held as `f64`, but archives mostly store
//! them as JSON integers. Integral values are written back as integers so
//! that an unedited value keeps its original representation.

use serde::Serializer;

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// Return the integer form of `value` when it has no fractional part.
#[inline]
pub fn as_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT {
        Some(value as i64)
    } else {
        None
    }
}

/// Serialize an `f64`, emitting integral values as JSON integers.
///
/// Used as `#[serde(serialize_with = "crate::common::number::serialize")]`.
pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match as_integer(*value) {
        // -0.0 keeps its float form
        Some(0) if value.is_sign_negative() => serializer.serialize_f64(*value),
        Some(int) => serializer.serialize_i64(int),
        None => serializer.serialize_f64(*value),
    }
}
