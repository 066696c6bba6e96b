//! Error types for the collection store.

use crate::value::Value;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Result type alias for store operations.
pub type Result<T> = core::result::Result<T, StoreError>;

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field
    pub field: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A document failed validator acceptance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// One entry per failing field
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a validation error from field errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error for a single field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: alloc::vec![FieldError::new(field, message)],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for err in &self.errors {
            write!(f, "; {}", err)?;
        }
        Ok(())
    }
}

/// Error types for collection store operations.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreError {
    /// Document failed validator acceptance.
    Validation(ValidationError),
    /// Document is missing its identity field.
    MissingKey { collection: String, field: String },
    /// A document with the same identity already exists.
    DuplicateKey { collection: String, key: Value },
    /// No document with the given identity exists.
    NotFound { collection: String, key: Value },
    /// An update attempted to change the identity field.
    ImmutableKey { collection: String, key: Value },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(err) => write!(f, "{}", err),
            StoreError::MissingKey { collection, field } => {
                write!(f, "document for {} is missing key field {}", collection, field)
            }
            StoreError::DuplicateKey { collection, key } => {
                write!(f, "duplicate key in {}: {}", collection, key)
            }
            StoreError::NotFound { collection, key } => {
                write!(f, "not found in {}: {}", collection, key)
            }
            StoreError::ImmutableKey { collection, key } => {
                write!(f, "key field of {} document {} is immutable", collection, key)
            }
        }
    }
}

impl StoreError {
    /// Creates a missing-key error.
    pub fn missing_key(collection: impl Into<String>, field: impl Into<String>) -> Self {
        StoreError::MissingKey {
            collection: collection.into(),
            field: field.into(),
        }
    }

    /// Creates a duplicate-key error.
    pub fn duplicate_key(collection: impl Into<String>, key: Value) -> Self {
        StoreError::DuplicateKey {
            collection: collection.into(),
            key,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(collection: impl Into<String>, key: Value) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            key,
        }
    }

    /// Creates an immutable-key error.
    pub fn immutable_key(collection: impl Into<String>, key: Value) -> Self {
        StoreError::ImmutableKey {
            collection: collection.into(),
            key,
        }
    }

    /// Returns the validation errors if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationError> {
        match self {
            StoreError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Validation(err)
    }
}
