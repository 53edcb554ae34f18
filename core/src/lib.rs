//! Schema-driven decoding and validation of multi-valued form input.
//!
//! This crate turns raw submitted data (each field name mapping to one or
//! more strings) into a typed, bounds-checked map, or rejects it with a
//! single descriptive error:
//!
//! - [`RuleSet`] — the declarative rules, one [`Rule`] per field, loaded
//!   from JSON or YAML and checked eagerly.
//! - [`Extractor`] — applies a rule set to input, optionally delegating
//!   unknown field types to a [`TypeResolver`].
//! - [`FormValues`] / [`FieldSource`] — the raw input, with adapters for
//!   URL-encoded query strings.
//! - [`RuleBook`] — several named rule sets in one configuration file.
//!
//! Malformed rules are [`SchemaError`]s raised at load time; rejected input
//! is an [`ExtractError`] whose [`kind`](ExtractError::kind) tells the
//! categories apart.
//!
//! # Example
//!
//! ```
//! use form_extract_core::*;
//!
//! let rules = RuleSet::from_json_str(r#"{
//!     "id": 1,
//!     "email": "must",
//!     "score": {"type": "float", "max": 5},
//!     "ids": {"type": "ints", "min_amt": 1, "max_amt": 2},
//!     "debug": false
//! }"#).unwrap();
//! let extractor = Extractor::new(rules);
//!
//! let out = extractor.extract_query("id=x7&email=a@b.c&score=4.5&ids=1&ids=2").unwrap();
//! assert_eq!(out["id"], FieldValue::String("x7".into()));
//! assert_eq!(out["score"], FieldValue::Float(4.5));
//! assert_eq!(out["ids"], FieldValue::Ints(vec![1, 2]));
//!
//! let err = extractor.extract_query("email=a@b.c&score=5.9").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ScalarFailed);
//! assert_eq!(err.field(), "score");
//! ```

mod bounds;
pub mod coerce;
mod config;
mod error;
mod extract;
mod input;
mod rules;
mod value;

pub use bounds::Bounds;
pub use config::{RuleBook, RuleFile};
pub use error::{BoxError, ErrorKind, ExtractError, Result, SchemaError};
pub use extract::{Extractor, TypeResolver, extract};
pub use input::{FieldSource, FormValues};
pub use rules::{FieldType, Rule, RuleSet, TypedRule};
pub use value::{Extracted, FieldValue};
