//! The extraction engine.
//!
//! [`Extractor`] walks every field declared in its [`RuleSet`], looks the
//! field up in the input and dispatches on the rule:
//!
//! - [`Rule::PassThrough`] copies the first value, unchecked, if present.
//! - [`Rule::Ignore`] never looks at the field.
//! - [`Rule::MandatoryString`] requires a value and emits the first one.
//! - [`Rule::Typed`] coerces and bound-checks according to its type.
//!
//! The first failing field aborts the whole call; no partial output is
//! returned. Fields are visited in name order, so when several fields are
//! invalid the reported one is always the same.
//!
//! # Asymmetry of optional fields
//!
//! An optional *untyped* field that fails its length bound is silently
//! dropped, while an optional *typed* field (scalar or collection) that
//! fails is a hard error.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::bounds::Bounds;
use crate::coerce::{coerce_all, coerce_bool, coerce_float, coerce_int, coerce_string};
use crate::error::{BoxError, ExtractError, Result};
use crate::input::{FieldSource, FormValues};
use crate::rules::{FieldType, Rule, RuleSet, TypedRule};
use crate::value::{Extracted, FieldValue};

/// Handles field types the engine does not recognize.
///
/// Installed once on an [`Extractor`]; called with the unknown type tag,
/// every raw value of the field and its rule (including any
/// [`extra`](TypedRule::extra) keys).
///
/// Closures with the matching signature implement this trait:
///
/// ```
/// use form_extract_core::{BoxError, Extractor, FieldValue, FormValues, RuleSet, TypedRule};
///
/// let rules = RuleSet::from_json_str(r#"{"color": {"type": "hex"}}"#).unwrap();
/// let extractor = Extractor::with_resolver(rules, |_: &str, values: &[String], _: &TypedRule| -> Result<FieldValue, BoxError> {
///     let raw = values.first().ok_or("no value")?;
///     let rgb = u32::from_str_radix(raw.trim_start_matches('#'), 16)?;
///     Ok(FieldValue::Int(i64::from(rgb)))
/// });
///
/// let out = extractor.extract(&FormValues::from_query("color=%23ff0000")).unwrap();
/// assert_eq!(out["color"], FieldValue::Int(0xff0000));
/// ```
pub trait TypeResolver: Send + Sync {
    /// Converts the raw values of a field with an unrecognized type.
    ///
    /// # Errors
    ///
    /// Any error is wrapped in [`ExtractError::Resolver`] and aborts the
    /// extraction.
    fn resolve(
        &self,
        type_name: &str,
        values: &[String],
        rule: &TypedRule,
    ) -> std::result::Result<FieldValue, BoxError>;
}

impl<F> TypeResolver for F
where
    F: Fn(&str, &[String], &TypedRule) -> std::result::Result<FieldValue, BoxError> + Send + Sync,
{
    fn resolve(
        &self,
        type_name: &str,
        values: &[String],
        rule: &TypedRule,
    ) -> std::result::Result<FieldValue, BoxError> {
        self(type_name, values, rule)
    }
}

/// Schema-bound extractor.
///
/// Cheap to clone and safe to share across threads; `extract` takes
/// `&self` and keeps no state between calls. Replacing the rules with
/// [`reset_rules`](Self::reset_rules) needs `&mut self`, so it can never
/// overlap an extraction in flight.
///
/// # Examples
///
/// ```
/// use form_extract_core::{ErrorKind, Extractor, FieldValue, FormValues, RuleSet};
///
/// let rules = RuleSet::from_json_str(r#"{
///     "name": "must",
///     "age": {"type": "int", "min": 18, "max": 130},
///     "tags": {"type": "strings", "max_amt": 3},
///     "csrf": false
/// }"#).unwrap();
/// let extractor = Extractor::new(rules);
///
/// let out = extractor
///     .extract(&FormValues::from_query("name=Ada&age=36&tags=math&csrf=x"))
///     .unwrap();
/// assert_eq!(out["name"], FieldValue::String("Ada".into()));
/// assert_eq!(out["age"], FieldValue::Int(36));
/// assert_eq!(out["tags"], FieldValue::Strings(vec!["math".into()]));
/// assert!(!out.contains_key("csrf"));
///
/// let err = extractor.extract(&FormValues::from_query("name=Ada&age=12")).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::ScalarFailed);
/// ```
#[derive(Clone)]
pub struct Extractor {
    rules: RuleSet,
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl Extractor {
    /// Creates an extractor with no type resolver.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            resolver: None,
        }
    }

    /// Creates an extractor that hands unknown types to `resolver`.
    pub fn with_resolver(rules: RuleSet, resolver: impl TypeResolver + 'static) -> Self {
        Self {
            rules,
            resolver: Some(Arc::new(resolver)),
        }
    }

    /// Installs or replaces the type resolver.
    pub fn set_resolver(&mut self, resolver: impl TypeResolver + 'static) {
        self.resolver = Some(Arc::new(resolver));
    }

    /// Returns the bound rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Replaces the rule set for subsequent calls, returning the old one.
    pub fn reset_rules(&mut self, rules: RuleSet) -> RuleSet {
        tracing::info!(fields = rules.len(), "replacing rule set");
        std::mem::replace(&mut self.rules, rules)
    }

    /// Decodes and checks `input` against the rule set.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExtractError`] encountered; see the module docs
    /// for the per-rule semantics.
    pub fn extract<S: FieldSource + ?Sized>(&self, input: &S) -> Result<Extracted> {
        run(&self.rules, self.resolver.as_deref(), input)
    }

    /// Decodes a URL-encoded query string, then extracts from it.
    ///
    /// # Errors
    ///
    /// As [`extract`](Self::extract).
    pub fn extract_query(&self, query: &str) -> Result<Extracted> {
        self.extract(&FormValues::from_query(query))
    }

    /// Extracts from the query component of `url`.
    ///
    /// # Errors
    ///
    /// As [`extract`](Self::extract).
    pub fn extract_url(&self, url: &Url) -> Result<Extracted> {
        self.extract(&FormValues::from_url(url))
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("rules", &self.rules)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// One-shot extraction without a type resolver.
///
/// # Errors
///
/// As [`Extractor::extract`].
pub fn extract<S: FieldSource + ?Sized>(rules: &RuleSet, input: &S) -> Result<Extracted> {
    run(rules, None, input)
}

fn run<S: FieldSource + ?Sized>(
    rules: &RuleSet,
    resolver: Option<&dyn TypeResolver>,
    input: &S,
) -> Result<Extracted> {
    let mut out = Extracted::new();
    for (field, rule) in rules.iter() {
        let values = input.field_values(field);
        if let Some(value) = extract_field(field, rule, values, resolver)? {
            out.insert(field.to_string(), value);
        }
    }
    debug!(fields = out.len(), "extraction passed");
    Ok(out)
}

fn extract_field(
    field: &str,
    rule: &Rule,
    values: Option<&[String]>,
    resolver: Option<&dyn TypeResolver>,
) -> Result<Option<FieldValue>> {
    let first = values.and_then(<[String]>::first);
    match rule {
        Rule::PassThrough => {
            debug!(field, present = first.is_some(), "pass-through");
            Ok(first.map(|raw| FieldValue::String(raw.clone())))
        }
        Rule::Ignore => Ok(None),
        Rule::MandatoryString => match first {
            Some(raw) => Ok(Some(FieldValue::String(raw.clone()))),
            None => Err(missing(field)),
        },
        Rule::Typed(typed) => {
            let values = match values {
                Some(values) if !values.is_empty() => values,
                _ if typed.must => return Err(missing(field)),
                _ => {
                    debug!(field, "optional field absent, skipped");
                    return Ok(None);
                }
            };
            extract_typed(field, typed, values, resolver)
        }
    }
}

fn extract_typed(
    field: &str,
    rule: &TypedRule,
    values: &[String],
    resolver: Option<&dyn TypeResolver>,
) -> Result<Option<FieldValue>> {
    let Some(field_type) = &rule.field_type else {
        let raw = single(field, values)?;
        return match coerce_string(raw, &rule.value_bounds) {
            Some(value) => Ok(Some(FieldValue::String(value))),
            None if rule.must => Err(ExtractError::ScalarFailed {
                field: field.to_string(),
            }),
            None => {
                debug!(field, "optional untyped field out of bounds, dropped");
                Ok(None)
            }
        };
    };

    if let FieldType::Other(type_name) = field_type {
        return resolve(field, type_name, values, rule, resolver).map(Some);
    }

    let value = if field_type.is_collection() {
        coerce_collection(field_type, values, rule).ok_or_else(|| {
            debug!(field, count = values.len(), "collection rejected");
            ExtractError::CollectionFailed {
                field: field.to_string(),
            }
        })?
    } else {
        let raw = single(field, values)?;
        coerce_scalar(field_type, raw, &rule.value_bounds).ok_or_else(|| {
            debug!(field, raw, "scalar rejected");
            ExtractError::ScalarFailed {
                field: field.to_string(),
            }
        })?
    };
    Ok(Some(value))
}

fn resolve(
    field: &str,
    type_name: &str,
    values: &[String],
    rule: &TypedRule,
    resolver: Option<&dyn TypeResolver>,
) -> Result<FieldValue> {
    let Some(resolver) = resolver else {
        return Err(ExtractError::UnknownType {
            field: field.to_string(),
            type_name: type_name.to_string(),
        });
    };
    resolver
        .resolve(type_name, values, rule)
        .map_err(|source| ExtractError::Resolver {
            field: field.to_string(),
            source,
        })
}

fn missing(field: &str) -> ExtractError {
    debug!(field, "mandatory field missing");
    ExtractError::MandatoryFieldMissing {
        field: field.to_string(),
    }
}

fn single<'a>(field: &str, values: &'a [String]) -> Result<&'a str> {
    match values {
        [raw] => Ok(raw),
        _ => Err(ExtractError::MultipleValues {
            field: field.to_string(),
        }),
    }
}

fn coerce_scalar(field_type: &FieldType, raw: &str, bounds: &Bounds) -> Option<FieldValue> {
    match field_type {
        FieldType::String => coerce_string(raw, bounds).map(FieldValue::String),
        FieldType::Int => coerce_int(raw, bounds).map(FieldValue::Int),
        FieldType::Float => coerce_float(raw, bounds).map(FieldValue::Float),
        FieldType::Bool => coerce_bool(raw, bounds).map(FieldValue::Bool),
        _ => None,
    }
}

fn coerce_collection(
    field_type: &FieldType,
    values: &[String],
    rule: &TypedRule,
) -> Option<FieldValue> {
    let (count, element) = (&rule.count_bounds, &rule.value_bounds);
    match field_type {
        FieldType::Strings => coerce_all(values, count, element, coerce_string).map(FieldValue::Strings),
        FieldType::Ints => coerce_all(values, count, element, coerce_int).map(FieldValue::Ints),
        FieldType::Floats => coerce_all(values, count, element, coerce_float).map(FieldValue::Floats),
        FieldType::Bools => coerce_all(values, count, element, coerce_bool).map(FieldValue::Bools),
        _ => None,
    }
}
