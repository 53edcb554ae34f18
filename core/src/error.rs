//! Error types for rule loading and extraction.
//!
//! Two families are kept apart: [`SchemaError`] means the rules themselves
//! are malformed (a programmer or configuration defect caught at load
//! time), while [`ExtractError`] means the submitted input was rejected.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by external type resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while loading or interpreting a rule set.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The rule value is not one of the recognized shapes.
    #[error("can't interpret rule for field \"{field}\": {reason}")]
    MalformedRule {
        /// Field whose rule is malformed.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A `min`/`max`/`min_amt`/`max_amt` bound is not a number.
    #[error("bound \"{key}\" of field \"{field}\" must be a number")]
    InvalidBound {
        /// Field whose rule carries the bound.
        field: String,
        /// Bound key (`min`, `max`, `min_amt` or `max_amt`).
        key: String,
    },

    /// The top-level rule document is not an object.
    #[error("rule set must be an object mapping field names to rules")]
    NotAnObject,

    /// A rule book does not contain the requested form.
    #[error("unknown form: {0}")]
    UnknownForm(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that abort a single extraction call.
///
/// Every variant names the offending field. Use [`ExtractError::kind`] to
/// branch on the category instead of matching message text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A mandatory field is absent or has no values.
    #[error("mandatory field \"{field}\" is missing")]
    MandatoryFieldMissing {
        /// Field name.
        field: String,
    },

    /// A scalar field was submitted with more than one value.
    #[error("field \"{field}\" sent with multiple values")]
    MultipleValues {
        /// Field name.
        field: String,
    },

    /// A collection field failed its cardinality or an element check.
    #[error("slice field \"{field}\" not passed")]
    CollectionFailed {
        /// Field name.
        field: String,
    },

    /// A scalar field failed to parse or is out of bounds.
    #[error("field \"{field}\" not passed")]
    ScalarFailed {
        /// Field name.
        field: String,
    },

    /// The rule names a type the engine does not know and no resolver is set.
    #[error("field \"{field}\" has unknown type \"{type_name}\"")]
    UnknownType {
        /// Field name.
        field: String,
        /// The unrecognized type tag.
        type_name: String,
    },

    /// The external type resolver rejected the field.
    #[error("outside field \"{field}\" not passed: {source}")]
    Resolver {
        /// Field name.
        field: String,
        /// Error returned by the resolver.
        #[source]
        source: BoxError,
    },
}

impl ExtractError {
    /// Returns the category of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_extract_core::{ErrorKind, ExtractError};
    ///
    /// let err = ExtractError::ScalarFailed { field: "age".into() };
    /// assert_eq!(err.kind(), ErrorKind::ScalarFailed);
    /// assert_eq!(err.kind().to_string(), "scalar_failed");
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MandatoryFieldMissing { .. } => ErrorKind::MandatoryFieldMissing,
            Self::MultipleValues { .. } => ErrorKind::MultipleValues,
            Self::CollectionFailed { .. } => ErrorKind::CollectionFailed,
            Self::ScalarFailed { .. } => ErrorKind::ScalarFailed,
            Self::UnknownType { .. } => ErrorKind::UnknownType,
            Self::Resolver { .. } => ErrorKind::ResolverFailed,
        }
    }

    /// Returns the name of the field that caused the error.
    pub fn field(&self) -> &str {
        match self {
            Self::MandatoryFieldMissing { field }
            | Self::MultipleValues { field }
            | Self::CollectionFailed { field }
            | Self::ScalarFailed { field }
            | Self::UnknownType { field, .. }
            | Self::Resolver { field, .. } => field,
        }
    }
}

/// Stable category codes for [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Mandatory field absent or empty.
    MandatoryFieldMissing,
    /// More than one value for a scalar field.
    MultipleValues,
    /// Collection cardinality or element failure.
    CollectionFailed,
    /// Scalar parse or bound failure.
    ScalarFailed,
    /// Unrecognized type tag with no resolver.
    UnknownType,
    /// External resolver failure.
    ResolverFailed,
}

impl ErrorKind {
    /// Snake-case code suitable for logs and machine-readable output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MandatoryFieldMissing => "mandatory_field_missing",
            Self::MultipleValues => "multiple_values",
            Self::CollectionFailed => "collection_failed",
            Self::ScalarFailed => "scalar_failed",
            Self::UnknownType => "unknown_type",
            Self::ResolverFailed => "resolver_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
