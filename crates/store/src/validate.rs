//! Document validation capability.
//!
//! A [`Validator`] inspects a candidate document before it is committed and
//! either returns the document to store (possibly normalized) or rejects it
//! with field-level errors. Collections without explicit validation use
//! [`AcceptAll`]. Any closure of the right shape is a validator, so tests
//! and callers rarely need a named type.

use ripple_core::{Document, ValidationError};

pub trait Validator {
    /// Returns the document to commit, which may be a normalized copy of
    /// the candidate, or the reasons it was rejected.
    fn validate(&self, doc: &Document) -> Result<Document, ValidationError>;
}

/// Validator that admits every document unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, doc: &Document) -> Result<Document, ValidationError> {
        Ok(doc.clone())
    }
}

impl<F> Validator for F
where
    F: Fn(&Document) -> Result<Document, ValidationError>,
{
    fn validate(&self, doc: &Document) -> Result<Document, ValidationError> {
        self(doc)
    }
}
