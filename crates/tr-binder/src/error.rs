//! Error types for input validation, binding and variant configuration

use thiserror::Error;

/// A value rejected at the input boundary, before it reaches the binder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' expects {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Field '{field}' must be at least {min}, got {value}")]
    BelowMinimum { field: String, min: i64, value: i64 },

    #[error("Field '{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("Field '{field}' has no option '{value}'")]
    NotAnOption { field: String, value: String },
}

impl InputError {
    /// Key of the offending field
    pub fn field(&self) -> &str {
        match self {
            InputError::UnknownField(field)
            | InputError::TypeMismatch { field, .. }
            | InputError::BelowMinimum { field, .. }
            | InputError::OutOfRange { field, .. }
            | InputError::NotAnOption { field, .. } => field,
        }
    }
}

/// Binding errors raised when a record is finalized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingRequiredField(Vec<String>),
}

/// Errors loading or validating the variant catalogue
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Variant '{variant}' declares field '{field}' more than once")]
    DuplicateField { variant: String, field: String },

    #[error("Variant '{variant}' is missing core field '{field}'")]
    MissingCoreField { variant: String, field: String },

    #[error("Field '{field}' in variant '{variant}' is gated by undeclared toggle '{group}'")]
    UndeclaredGroup {
        variant: String,
        field: String,
        group: String,
    },

    #[error("Invalid default for field '{field}' in variant '{variant}': {source}")]
    InvalidDefault {
        variant: String,
        field: String,
        #[source]
        source: InputError,
    },

    #[error("Duplicate variant id: {0}")]
    DuplicateVariant(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
