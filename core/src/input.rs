//! Raw multi-valued input.
//!
//! The engine reads input through [`FieldSource`], so any map of field name
//! to raw string values can be extracted from directly. [`FormValues`] is
//! the owned form of that map, with adapters for URL-encoded query strings
//! and [`url::Url`] queries.

use std::collections::{BTreeMap, HashMap};

use url::Url;

/// Anything that can hand out the raw values submitted for a field.
///
/// `None` means the field was not submitted; `Some(&[])` means it was
/// submitted with no values. Both count as missing for mandatory fields.
pub trait FieldSource {
    /// Returns the raw values of `field`, in submission order.
    fn field_values(&self, field: &str) -> Option<&[String]>;
}

impl FieldSource for HashMap<String, Vec<String>> {
    fn field_values(&self, field: &str) -> Option<&[String]> {
        self.get(field).map(Vec::as_slice)
    }
}

impl FieldSource for BTreeMap<String, Vec<String>> {
    fn field_values(&self, field: &str) -> Option<&[String]> {
        self.get(field).map(Vec::as_slice)
    }
}

/// Field name to raw values, as submitted by a form or query string.
///
/// # Examples
///
/// ```
/// use form_extract_core::{FieldSource, FormValues};
///
/// let form = FormValues::from_query("tag=a&tag=b&name=J%C3%BCrgen+K");
/// assert_eq!(form.field_values("tag").unwrap(), ["a", "b"]);
/// assert_eq!(form.field_values("name").unwrap(), ["Jürgen K"]);
/// assert!(form.field_values("missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    fields: HashMap<String, Vec<String>>,
}

impl FormValues {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` string.
    ///
    /// A leading `?` is ignored. Repeated keys accumulate in order.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Collects the query pairs of a URL.
    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().into_owned().collect()
    }

    /// Appends one value to `field`.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(value.into());
    }

    /// Declares `field` as submitted without any values.
    pub fn insert_empty(&mut self, field: impl Into<String>) {
        self.fields.entry(field.into()).or_default();
    }

    /// Number of submitted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the values into the plain map form.
    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.fields
    }
}

impl FieldSource for FormValues {
    fn field_values(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }
}

impl From<HashMap<String, Vec<String>>> for FormValues {
    fn from(fields: HashMap<String, Vec<String>>) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (field, value) in iter {
            form.push(field, value);
        }
        form
    }
}
