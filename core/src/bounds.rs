//! Inclusive min/max bounds shared by every coercer.
//!
//! The same comparison is used for integer values, float ceilings, string
//! lengths and collection cardinalities, so it lives in one place.

use serde_json::Value;

use crate::error::SchemaError;

/// Optional inclusive lower and upper limits on an integer magnitude.
///
/// A missing side places no constraint on that side.
///
/// # Examples
///
/// ```
/// use form_extract_core::Bounds;
///
/// let bounds = Bounds::new(Some(1), Some(10));
/// assert!(bounds.admits(1));
/// assert!(bounds.admits(10));
/// assert!(!bounds.admits(0));
/// assert!(!bounds.admits(11));
/// assert!(Bounds::default().admits(i64::MIN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    /// Smallest accepted magnitude.
    pub min: Option<i64>,
    /// Largest accepted magnitude.
    pub max: Option<i64>,
}

impl Bounds {
    /// Creates bounds from optional limits.
    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// Returns `true` when neither side is constrained.
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns `true` if `magnitude` lies within both declared limits.
    pub fn admits(&self, magnitude: i64) -> bool {
        if let Some(min) = self.min {
            if magnitude < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if magnitude > max {
                return false;
            }
        }
        true
    }

    /// Checks a collection length against these bounds.
    pub fn admits_len(&self, len: usize) -> bool {
        self.admits(i64::try_from(len).unwrap_or(i64::MAX))
    }

    /// Checks a float against these bounds using its ceiling.
    ///
    /// `5.9` is compared as `6`, `5.0` as `5`. NaN has no magnitude and only
    /// passes when the bounds are empty.
    pub fn admits_ceil(&self, value: f64) -> bool {
        if value.is_nan() {
            return self.is_unbounded();
        }
        // `as` saturates at the i64 range, so infinities land on the extremes.
        self.admits(value.ceil() as i64)
    }
}

/// Reads an optional bound from a loosely typed rule object.
///
/// Integers are taken as-is; floating point values are truncated toward
/// zero. Anything else is a schema defect.
pub(crate) fn read_bound(
    field: &str,
    key: &str,
    raw: Option<&Value>,
) -> Result<Option<i64>, SchemaError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let invalid = || SchemaError::InvalidBound {
        field: field.to_string(),
        key: key.to_string(),
    };
    let Value::Number(number) = raw else {
        return Err(invalid());
    };
    if let Some(int) = number.as_i64() {
        return Ok(Some(int));
    }
    match number.as_f64() {
        Some(float) if !float.is_nan() => Ok(Some(float.trunc() as i64)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_min_and_max_both_checked() {
        let bounds = Bounds::new(Some(2), Some(4));
        assert!(!bounds.admits(1));
        assert!(bounds.admits(2));
        assert!(bounds.admits(4));
        assert!(!bounds.admits(5));
    }

    #[test]
    fn test_one_sided_bounds() {
        assert!(Bounds::new(Some(3), None).admits(i64::MAX));
        assert!(!Bounds::new(Some(3), None).admits(2));
        assert!(Bounds::new(None, Some(3)).admits(i64::MIN));
        assert!(!Bounds::new(None, Some(3)).admits(4));
    }

    #[test]
    fn test_ceiling_comparison() {
        let bounds = Bounds::new(None, Some(5));
        assert!(bounds.admits_ceil(5.0));
        assert!(bounds.admits_ceil(4.1));
        assert!(!bounds.admits_ceil(5.9));
        assert!(!bounds.admits_ceil(5.000_001));
        assert!(!bounds.admits_ceil(f64::INFINITY));
        assert!(bounds.admits_ceil(f64::NEG_INFINITY));
    }

    #[test]
    fn test_nan_only_passes_without_bounds() {
        assert!(Bounds::default().admits_ceil(f64::NAN));
        assert!(!Bounds::new(Some(0), None).admits_ceil(f64::NAN));
    }

    #[test]
    fn test_admits_len() {
        let bounds = Bounds::new(Some(1), Some(2));
        assert!(!bounds.admits_len(0));
        assert!(bounds.admits_len(2));
        assert!(!bounds.admits_len(3));
    }

    #[test]
    fn test_read_bound_accepts_int_and_float() {
        assert_eq!(read_bound("f", "min", None).unwrap(), None);
        assert_eq!(read_bound("f", "min", Some(&json!(3))).unwrap(), Some(3));
        assert_eq!(read_bound("f", "min", Some(&json!(3.0))).unwrap(), Some(3));
        assert_eq!(read_bound("f", "max", Some(&json!(2.7))).unwrap(), Some(2));
        assert_eq!(read_bound("f", "max", Some(&json!(-2.7))).unwrap(), Some(-2));
    }

    #[test]
    fn test_read_bound_rejects_other_shapes() {
        for raw in [json!("5"), json!(true), json!(null), json!([1])] {
            let err = read_bound("age", "max", Some(&raw)).unwrap_err();
            assert!(matches!(
                err,
                SchemaError::InvalidBound { ref field, ref key } if field == "age" && key == "max"
            ));
        }
    }
}
