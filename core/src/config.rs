//! Rule books: several named rule sets in one configuration file.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! forms:
//!   signup:
//!     name: must
//!     email: {type: string, must: true, min: 3, max: 254}
//!     age: {type: int, min: 18, max: 130}
//!     csrf_token: false
//!   search:
//!     q: {type: string, max: 200}
//!     page: {type: int, min: 1}
//!     tag: {type: strings, max_amt: 5}
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;
use crate::extract::Extractor;
use crate::rules::{RuleSet, is_yaml_path};

/// Named rule sets loaded from a single YAML or JSON file.
///
/// # Examples
///
/// ```
/// use form_extract_core::RuleBook;
///
/// let book: RuleBook = serde_yaml::from_str(r#"
/// version: "1.0"
/// forms:
///   login:
///     user: must
///     remember: {type: bool}
/// "#).unwrap();
///
/// let extractor = book.extractor("login").unwrap();
/// let out = extractor.extract_query("user=ada&remember=true").unwrap();
/// assert_eq!(out.len(), 2);
/// assert!(book.form("signup").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Rule sets by form name.
    pub forms: BTreeMap<String, RuleSet>,
}

impl RuleBook {
    /// Loads a rule book; `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read, or
    /// [`SchemaError::Yaml`] / [`SchemaError::Json`] if parsing fails,
    /// including when a rule inside a form is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let book: Self = if is_yaml_path(path) {
            serde_yaml::from_reader(reader)?
        } else {
            serde_json::from_reader(reader)?
        };
        tracing::info!(path = %path.display(), forms = book.forms.len(), "loaded rule book");
        Ok(book)
    }

    /// Saves the rule book, choosing the format by extension like
    /// [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be written, or a
    /// serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchemaError> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_yaml_path(path) {
            serde_yaml::to_writer(writer, self)?;
        } else {
            serde_json::to_writer_pretty(writer, self)?;
        }
        Ok(())
    }

    /// Returns the rule set of form `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownForm`] if no such form exists.
    pub fn form(&self, name: &str) -> Result<&RuleSet, SchemaError> {
        self.forms
            .get(name)
            .ok_or_else(|| SchemaError::UnknownForm(name.to_string()))
    }

    /// Builds an [`Extractor`] for form `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownForm`] if no such form exists.
    pub fn extractor(&self, name: &str) -> Result<Extractor, SchemaError> {
        self.form(name).cloned().map(Extractor::new)
    }
}

/// Either kind of rule file, told apart by its shape.
///
/// A top-level object holding a `version` string and a `forms` object is a
/// [`RuleBook`]; anything else is read as a single [`RuleSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuleFile {
    /// A single rule set.
    Rules(RuleSet),
    /// Named rule sets.
    Book(RuleBook),
}

impl RuleFile {
    /// Loads a rule set or rule book, choosing the format by extension like
    /// [`RuleBook::load`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read, a parse error
    /// for invalid JSON or YAML, or the rule error of the detected shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let value: Value = if is_yaml_path(path) {
            serde_yaml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        let file = Self::from_value(value)?;
        tracing::info!(path = %path.display(), book = file.is_book(), "loaded rule file");
        Ok(file)
    }

    /// Interprets an authored document as a rule book or a rule set.
    ///
    /// # Errors
    ///
    /// As [`RuleSet::from_value`], or [`SchemaError::Json`] when a rule book
    /// holds a malformed form.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        if is_book_shape(&value) {
            Ok(Self::Book(serde_json::from_value(value)?))
        } else {
            RuleSet::from_value(&value).map(Self::Rules)
        }
    }

    /// Whether the file was read as a [`RuleBook`].
    pub fn is_book(&self) -> bool {
        matches!(self, Self::Book(_))
    }
}

fn is_book_shape(value: &Value) -> bool {
    let Value::Object(object) = value else {
        return false;
    };
    matches!(object.get("version"), Some(Value::String(_)))
        && matches!(object.get("forms"), Some(Value::Object(_)))
}
