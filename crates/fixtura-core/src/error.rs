use thiserror::Error;

/// Core error type shared across fixtura crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A value did not have the variant a conversion expected.
    #[error("type mismatch for '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A record was missing a field required by its target type.
    #[error("missing field: {0}")]
    MissingField(String),
    /// The shape violates internal invariants.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// A field type expression could not be parsed.
    #[error("invalid field type: {0}")]
    InvalidFieldType(String),
}

impl Error {
    pub fn mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }
}

/// Convenience alias for results returned by fixtura crates.
pub type Result<T> = std::result::Result<T, Error>;
