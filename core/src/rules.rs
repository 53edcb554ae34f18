//! Rule set types and loading.
//!
//! Rules are authored as loosely typed data (JSON or YAML) and resolved
//! once, at load time, into the closed [`Rule`] enum:
//!
//! | Authored value               | Rule                      |
//! |------------------------------|---------------------------|
//! | any number, e.g. `1`         | [`Rule::PassThrough`]     |
//! | `false`                      | [`Rule::Ignore`]          |
//! | `"must"`                     | [`Rule::MandatoryString`] |
//! | `{"type": "int", "min": 1}`  | [`Rule::Typed`]           |
//!
//! Anything else is rejected with [`SchemaError::MalformedRule`], so a
//! loaded [`RuleSet`] is always interpretable.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bounds::{Bounds, read_bound};
use crate::error::SchemaError;

const MUST: &str = "must";
const TYPE: &str = "type";
const MIN: &str = "min";
const MAX: &str = "max";
const MIN_AMT: &str = "min_amt";
const MAX_AMT: &str = "max_amt";

/// Declared type of a typed field.
///
/// # Examples
///
/// ```
/// use form_extract_core::FieldType;
///
/// assert_eq!(FieldType::parse("ints"), FieldType::Ints);
/// assert!(FieldType::Ints.is_collection());
/// assert_eq!(FieldType::Ints.element_type(), FieldType::Int);
/// assert_eq!(FieldType::parse("color"), FieldType::Other("color".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Single string.
    String,
    /// Single signed 64-bit integer.
    Int,
    /// Single 64-bit float.
    Float,
    /// Single boolean.
    Bool,
    /// Sequence of strings.
    Strings,
    /// Sequence of integers.
    Ints,
    /// Sequence of floats.
    Floats,
    /// Sequence of booleans.
    Bools,
    /// A tag the engine does not know; handed to a
    /// [`TypeResolver`](crate::TypeResolver).
    Other(String),
}

impl FieldType {
    /// Parses a type tag. Unknown tags become [`FieldType::Other`].
    pub fn parse(tag: &str) -> Self {
        match tag {
            "string" => Self::String,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "strings" => Self::Strings,
            "ints" => Self::Ints,
            "floats" => Self::Floats,
            "bools" => Self::Bools,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the tag as written in a rule file.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Strings => "strings",
            Self::Ints => "ints",
            Self::Floats => "floats",
            Self::Bools => "bools",
            Self::Other(tag) => tag,
        }
    }

    /// Returns `true` for the multi-valued variants.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Strings | Self::Ints | Self::Floats | Self::Bools)
    }

    /// Returns the scalar type of a collection's elements.
    ///
    /// Scalar and unknown types return themselves.
    pub fn element_type(&self) -> Self {
        match self {
            Self::Strings => Self::String,
            Self::Ints => Self::Int,
            Self::Floats => Self::Float,
            Self::Bools => Self::Bool,
            other => other.clone(),
        }
    }
}

/// Structured rule with an optional type, mandatory flag and bounds.
///
/// Build one in code with the chained helpers:
///
/// ```
/// use form_extract_core::{FieldType, TypedRule};
///
/// let rule = TypedRule::new(FieldType::Int).with_min(18).with_max(130).required();
/// assert!(rule.must);
/// assert_eq!(rule.value_bounds.min, Some(18));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedRule {
    /// Declared type; `None` means an untyped (string) field.
    pub field_type: Option<FieldType>,
    /// Field must be present with at least one value.
    pub must: bool,
    /// `min`/`max`: value, ceiling or length limits depending on the type.
    pub value_bounds: Bounds,
    /// `min_amt`/`max_amt`: element count limits for collection types.
    pub count_bounds: Bounds,
    /// Keys the engine does not interpret, kept for type resolvers.
    pub extra: Map<String, Value>,
}

impl TypedRule {
    /// Creates an optional rule of the given type with no bounds.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    /// Creates an optional untyped rule.
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Marks the field as mandatory.
    pub fn required(mut self) -> Self {
        self.must = true;
        self
    }

    /// Sets the `min` bound.
    pub fn with_min(mut self, min: i64) -> Self {
        self.value_bounds.min = Some(min);
        self
    }

    /// Sets the `max` bound.
    pub fn with_max(mut self, max: i64) -> Self {
        self.value_bounds.max = Some(max);
        self
    }

    /// Sets the `min_amt` bound.
    pub fn with_min_amt(mut self, min_amt: i64) -> Self {
        self.count_bounds.min = Some(min_amt);
        self
    }

    /// Sets the `max_amt` bound.
    pub fn with_max_amt(mut self, max_amt: i64) -> Self {
        self.count_bounds.max = Some(max_amt);
        self
    }

    /// Attaches an extra key for a type resolver.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    fn from_object(field: &str, object: &Map<String, Value>) -> Result<Self, SchemaError> {
        let malformed = |reason: &str| SchemaError::MalformedRule {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let field_type = match object.get(TYPE) {
            None => None,
            Some(Value::String(tag)) => Some(FieldType::parse(tag)),
            Some(_) => return Err(malformed("\"type\" must be a string")),
        };
        let must = match object.get(MUST) {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(malformed("\"must\" must be a boolean")),
        };
        let value_bounds = Bounds::new(
            read_bound(field, MIN, object.get(MIN))?,
            read_bound(field, MAX, object.get(MAX))?,
        );
        let count_bounds = Bounds::new(
            read_bound(field, MIN_AMT, object.get(MIN_AMT))?,
            read_bound(field, MAX_AMT, object.get(MAX_AMT))?,
        );
        let extra = object
            .iter()
            .filter(|(key, _)| ![TYPE, MUST, MIN, MAX, MIN_AMT, MAX_AMT].contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            field_type,
            must,
            value_bounds,
            count_bounds,
            extra,
        })
    }

    fn to_object(&self) -> Map<String, Value> {
        let mut object = self.extra.clone();
        if let Some(field_type) = &self.field_type {
            object.insert(TYPE.into(), field_type.as_str().into());
        }
        if self.must {
            object.insert(MUST.into(), true.into());
        }
        let bounds = [
            (MIN, self.value_bounds.min),
            (MAX, self.value_bounds.max),
            (MIN_AMT, self.count_bounds.min),
            (MAX_AMT, self.count_bounds.max),
        ];
        for (key, bound) in bounds {
            if let Some(bound) = bound {
                object.insert(key.into(), bound.into());
            }
        }
        object
    }
}

/// How one field of the input is handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Copy the first raw value through unchecked if present.
    PassThrough,
    /// Never inspect or emit the field.
    Ignore,
    /// Require at least one value; emit the first as a string.
    MandatoryString,
    /// Typed, optionally bounded field.
    Typed(TypedRule),
}

impl Rule {
    /// Interprets an authored rule value for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MalformedRule`] for unrecognized shapes and
    /// [`SchemaError::InvalidBound`] for non-numeric bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_extract_core::Rule;
    /// use serde_json::json;
    ///
    /// assert_eq!(Rule::from_value("id", &json!(1)).unwrap(), Rule::PassThrough);
    /// assert_eq!(Rule::from_value("csrf", &json!(false)).unwrap(), Rule::Ignore);
    /// assert_eq!(Rule::from_value("name", &json!("must")).unwrap(), Rule::MandatoryString);
    /// assert!(Rule::from_value("name", &json!("maybe")).is_err());
    /// ```
    pub fn from_value(field: &str, value: &Value) -> Result<Self, SchemaError> {
        let malformed = |reason: String| SchemaError::MalformedRule {
            field: field.to_string(),
            reason,
        };
        match value {
            Value::Number(_) => Ok(Self::PassThrough),
            Value::Bool(false) => Ok(Self::Ignore),
            Value::String(word) if word == MUST => Ok(Self::MandatoryString),
            Value::Object(object) => TypedRule::from_object(field, object).map(Self::Typed),
            Value::Bool(true) => Err(malformed("`true` is not a rule; use `false` to ignore".into())),
            Value::String(word) => Err(malformed(format!("unknown rule keyword \"{word}\""))),
            Value::Array(_) => Err(malformed("arrays are not rules".into())),
            Value::Null => Err(malformed("null is not a rule".into())),
        }
    }

    /// Renders the rule back into its authored form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::PassThrough => Value::from(1),
            Self::Ignore => Value::Bool(false),
            Self::MandatoryString => Value::from(MUST),
            Self::Typed(rule) => Value::Object(rule.to_object()),
        }
    }
}

impl From<TypedRule> for Rule {
    fn from(rule: TypedRule) -> Self {
        Self::Typed(rule)
    }
}

/// A complete set of field rules.
///
/// Field order carries no meaning. A rule set is read-only while an
/// extraction runs and can be shared between any number of calls.
///
/// # Examples
///
/// ```
/// use form_extract_core::{FieldType, Rule, RuleSet, TypedRule};
///
/// let from_json = RuleSet::from_json_str(r#"{
///     "name": "must",
///     "age": {"type": "int", "min": 18},
///     "csrf": false
/// }"#).unwrap();
///
/// let built = RuleSet::new()
///     .with_rule("name", Rule::MandatoryString)
///     .with_rule("age", TypedRule::new(FieldType::Int).with_min(18))
///     .with_rule("csrf", Rule::Ignore);
///
/// assert_eq!(from_json, built);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RuleSet {
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, builder style.
    pub fn with_rule(mut self, field: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.insert(field, rule);
        self
    }

    /// Interprets a loosely typed rule document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotAnObject`] if `value` is not an object, or
    /// the first rule error found.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let Value::Object(object) = value else {
            return Err(SchemaError::NotAnObject);
        };
        let mut rules = BTreeMap::new();
        for (field, raw) in object {
            rules.insert(field.clone(), Rule::from_value(field, raw)?);
        }
        Ok(Self { rules })
    }

    /// Parses a JSON rule document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] for invalid JSON, otherwise as
    /// [`from_value`](Self::from_value).
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    /// Parses a YAML rule document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Yaml`] for invalid YAML, otherwise as
    /// [`from_value`](Self::from_value).
    pub fn from_yaml_str(raw: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_yaml::from_str(raw)?;
        Self::from_value(&value)
    }

    /// Loads a rule file; `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str) or
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let rules = if is_yaml_path(path) {
            Self::from_yaml_str(&raw)?
        } else {
            Self::from_json_str(&raw)?
        };
        tracing::info!(path = %path.display(), fields = rules.len(), "loaded rule set");
        Ok(rules)
    }

    /// Looks up the rule for `field`.
    pub fn get(&self, field: &str) -> Option<&Rule> {
        self.rules.get(field)
    }

    /// Inserts or replaces the rule for `field`.
    pub fn insert(&mut self, field: impl Into<String>, rule: impl Into<Rule>) -> Option<Rule> {
        self.rules.insert(field.into(), rule.into())
    }

    /// Removes the rule for `field`.
    pub fn remove(&mut self, field: &str) -> Option<Rule> {
        self.rules.remove(field)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over `(field, rule)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(field, rule)| (field.as_str(), rule))
    }

    /// Iterates over declared field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Renders the rule set back into its authored form.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.rules
                .iter()
                .map(|(field, rule)| (field.clone(), rule.to_value()))
                .collect(),
        )
    }
}

impl TryFrom<Value> for RuleSet {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<RuleSet> for Value {
    fn from(rules: RuleSet) -> Self {
        rules.to_value()
    }
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}
