//! Typed field values produced by extraction.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Output of a successful extraction, keyed by field name.
pub type Extracted = BTreeMap<String, FieldValue>;

/// A coerced field value.
///
/// Serializes untagged, so an [`Extracted`] map renders as plain JSON:
///
/// ```
/// use form_extract_core::{Extracted, FieldValue};
///
/// let mut out = Extracted::new();
/// out.insert("age".into(), FieldValue::Int(30));
/// out.insert("tags".into(), FieldValue::Strings(vec!["a".into(), "b".into()]));
/// assert_eq!(
///     serde_json::to_string(&out).unwrap(),
///     r#"{"age":30,"tags":["a","b"]}"#
/// );
/// ```
///
/// Non-finite floats have no JSON number form and are written as the
/// strings `"NaN"`, `"inf"` and `"-inf"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Float scalar.
    #[serde(serialize_with = "serialize_float")]
    Float(f64),
    /// String scalar; also used for pass-through and untyped fields.
    String(String),
    /// Boolean sequence.
    Bools(Vec<bool>),
    /// Integer sequence.
    Ints(Vec<i64>),
    /// Float sequence.
    #[serde(serialize_with = "serialize_floats")]
    Floats(Vec<f64>),
    /// String sequence.
    Strings(Vec<String>),
    /// Value produced by an external type resolver.
    External(serde_json::Value),
}

struct JsonFloat(f64);

impl Serialize for JsonFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.collect_str(&self.0)
        }
    }
}

fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    JsonFloat(*value).serialize(serializer)
}

fn serialize_floats<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().copied().map(JsonFloat))
}

impl FieldValue {
    /// Returns the string if this is a [`FieldValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`FieldValue::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float if this is a [`FieldValue::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`FieldValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the strings if this is a [`FieldValue::Strings`].
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Self::Strings(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the integers if this is a [`FieldValue::Ints`].
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Self::Ints(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the floats if this is a [`FieldValue::Floats`].
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Self::Floats(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the booleans if this is a [`FieldValue::Bools`].
    pub fn as_bools(&self) -> Option<&[bool]> {
        match self {
            Self::Bools(values) => Some(values),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::External(value)
    }
}
