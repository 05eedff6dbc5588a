use std::fmt;

use thiserror::Error;

/// Top-level error type returned while compiling, translating or parsing with propschema.
///
/// Every builder and translator error is fatal: it reports a mistake in the class
/// declarations and is surfaced to the immediate caller instead of being recovered.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field declaration was completed without a type tag.
    #[error("no type declared at \"{path}\"")]
    TypeMissing { path: String },

    /// The declared type tag has no construction rule for the supplied options.
    #[error("no schema builder for {tag} with {options} options at \"{path}\"")]
    BuilderMissing {
        path: String,
        tag: String,
        options: String,
    },

    /// A container or pass-through field refers back to the class being built.
    #[error("circular reference detected at \"{path}\"")]
    CircularReference { path: String },

    /// Index direction outside the recognized set.
    #[error("invalid index direction: {direction}")]
    InvalidDirection { direction: String },

    /// A cached per-class schema was not an object node when merging the lineage.
    #[error("unexpected schema type for class {class}: {kind}")]
    UnexpectedNodeShape { class: String, kind: String },

    /// The translator has no rule for this schema node kind.
    #[error("no JSON schema translation for {kind} nodes")]
    UnsupportedType { kind: String },

    /// A class handle that the registry does not know about.
    #[error("invalid class provided: {message}")]
    InvalidClassArgument { message: String },

    /// Validation failed for one or more fields.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// A produced document could not be converted into JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn invalid_class(message: impl Into<String>) -> Self {
        Self::InvalidClassArgument {
            message: message.into(),
        }
    }
}

/// Collection of validation issues encountered while parsing a value.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Paths of every failing field, in the order they were reported.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.field.as_str())
    }
}

/// Detailed validation failure for a single field or logical path.
///
/// `field` is the dotted path to the value (`address.zip`, `tags.2`); the root value has
/// an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{} ({}): {}", self.field, self.code, self.message)
        }
    }
}

/// Convenience alias used by parse helpers.
pub type ValidationResult<T> = Result<T, ValidationError>;
