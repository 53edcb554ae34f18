//! Conversion of raw form strings into typed values.
//!
//! Every coercer returns `None` on a parse or bound failure. Rejection is
//! an ordinary outcome here; the engine decides whether it is fatal.

use crate::bounds::Bounds;

/// Accepts any string whose byte length is within `bounds`.
pub fn coerce_string(raw: &str, bounds: &Bounds) -> Option<String> {
    bounds.admits_len(raw.len()).then(|| raw.to_string())
}

/// Parses a base-10 signed 64-bit integer and checks its value.
///
/// # Examples
///
/// ```
/// use form_extract_core::{Bounds, coerce::coerce_int};
///
/// let bounds = Bounds::new(Some(1), Some(10));
/// assert_eq!(coerce_int("5", &bounds), Some(5));
/// assert_eq!(coerce_int("0", &bounds), None);
/// assert_eq!(coerce_int("abc", &bounds), None);
/// ```
pub fn coerce_int(raw: &str, bounds: &Bounds) -> Option<i64> {
    let value = raw.parse::<i64>().ok()?;
    bounds.admits(value).then_some(value)
}

/// Parses a 64-bit float; its ceiling is checked against `bounds`.
///
/// # Examples
///
/// ```
/// use form_extract_core::{Bounds, coerce::coerce_float};
///
/// let bounds = Bounds::new(None, Some(5));
/// assert_eq!(coerce_float("5.0", &bounds), Some(5.0));
/// assert_eq!(coerce_float("5.9", &bounds), None);
/// ```
pub fn coerce_float(raw: &str, bounds: &Bounds) -> Option<f64> {
    let value = raw.parse::<f64>().ok()?;
    bounds.admits_ceil(value).then_some(value)
}

/// Parses a canonical boolean spelling. Bounds do not apply.
///
/// Accepted forms are `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn coerce_bool(raw: &str, _bounds: &Bounds) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Applies a scalar coercer to every raw value of a collection field.
///
/// The element count is checked against `count` first. Elements are then
/// coerced in order and the first rejection stops processing. Either every
/// element converts or the result is `None`.
///
/// # Examples
///
/// ```
/// use form_extract_core::{Bounds, coerce::{coerce_all, coerce_int}};
///
/// let values = vec!["1".to_string(), "2".to_string()];
/// let count = Bounds::new(Some(1), Some(2));
/// assert_eq!(coerce_all(&values, &count, &Bounds::default(), coerce_int), Some(vec![1, 2]));
///
/// let too_many = vec!["1".to_string(), "2".to_string(), "3".to_string()];
/// assert_eq!(coerce_all(&too_many, &count, &Bounds::default(), coerce_int), None);
/// ```
pub fn coerce_all<T, F>(values: &[String], count: &Bounds, element: &Bounds, scalar: F) -> Option<Vec<T>>
where
    F: Fn(&str, &Bounds) -> Option<T>,
{
    if !count.admits_len(values.len()) {
        return None;
    }
    values.iter().map(|raw| scalar(raw, element)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_string_length_bounds() {
        let bounds = Bounds::new(Some(2), Some(4));
        assert_eq!(coerce_string("ab", &bounds).as_deref(), Some("ab"));
        assert_eq!(coerce_string("a", &bounds), None);
        assert_eq!(coerce_string("abcde", &bounds), None);
        assert_eq!(coerce_string("", &Bounds::default()).as_deref(), Some(""));
    }

    #[test]
    fn test_string_length_counts_bytes() {
        // "é" is two bytes in UTF-8.
        assert_eq!(coerce_string("é", &Bounds::new(None, Some(1))), None);
    }

    #[test]
    fn test_int_parsing() {
        let open = Bounds::default();
        assert_eq!(coerce_int("-42", &open), Some(-42));
        assert_eq!(coerce_int("+7", &open), Some(7));
        assert_eq!(coerce_int("1.5", &open), None);
        assert_eq!(coerce_int(" 3", &open), None);
        assert_eq!(coerce_int("", &open), None);
        assert_eq!(coerce_int("9223372036854775808", &open), None);
    }

    #[test]
    fn test_float_parsing_and_ceiling() {
        let bounds = Bounds::new(Some(1), Some(5));
        assert_eq!(coerce_float("0.5", &bounds), Some(0.5));
        assert_eq!(coerce_float("0.0", &bounds), None);
        assert_eq!(coerce_float("4.2", &bounds), Some(4.2));
        assert_eq!(coerce_float("nope", &bounds), None);
        assert_eq!(coerce_float("1e3", &Bounds::default()), Some(1000.0));
    }

    #[test]
    fn test_bool_forms() {
        let open = Bounds::default();
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(coerce_bool(raw, &open), Some(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(coerce_bool(raw, &open), Some(false), "{raw}");
        }
        for raw in ["yes", "tRUE", "", "2"] {
            assert_eq!(coerce_bool(raw, &open), None, "{raw}");
        }
    }

    #[test]
    fn test_bool_ignores_bounds() {
        assert_eq!(coerce_bool("true", &Bounds::new(Some(10), Some(0))), Some(true));
    }

    #[test]
    fn test_collection_applies_element_bounds() {
        let count = Bounds::default();
        let element = Bounds::new(Some(1), Some(3));
        assert_eq!(
            coerce_all(&strings(&["1", "3"]), &count, &element, coerce_int),
            Some(vec![1, 3])
        );
        assert_eq!(
            coerce_all(&strings(&["1", "4"]), &count, &element, coerce_int),
            None
        );
    }

    #[test]
    fn test_collection_stops_at_first_failure() {
        use std::cell::Cell;

        let calls = Cell::new(0);
        let counting = |raw: &str, bounds: &Bounds| {
            calls.set(calls.get() + 1);
            coerce_int(raw, bounds)
        };
        let result = coerce_all(
            &strings(&["1", "x", "3", "4"]),
            &Bounds::default(),
            &Bounds::default(),
            counting,
        );
        assert_eq!(result, None);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_collection_cardinality_checked_before_elements() {
        let count = Bounds::new(Some(2), None);
        assert_eq!(
            coerce_all(&strings(&["true"]), &count, &Bounds::default(), coerce_bool),
            None
        );
        assert_eq!(
            coerce_all::<String, _>(&[], &Bounds::default(), &Bounds::default(), coerce_string),
            Some(Vec::new())
        );
    }
}
