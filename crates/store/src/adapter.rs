//! Storage boundary for collections.
//!
//! A [`StorageAdapter`] is a string-keyed document store the collection
//! writes through to after each committed mutation. It is best-effort by
//! contract: in-memory reads never depend on it, and a persistence failure
//! is logged by the collection rather than surfaced. Adapters expose both
//! a flat per-key space and whole-collection sequences; collections only
//! use the latter.

use crate::filter::Filter;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use hashbrown::HashMap;
use ripple_core::Document;

/// Failure at the storage boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error: {}", self.message)
    }
}

/// String-keyed persistence contract consumed by [`Collection`].
///
/// [`Collection`]: crate::Collection
pub trait StorageAdapter {
    fn get(&self, key: &str) -> Result<Option<Document>, StorageError>;

    fn set(&self, key: &str, doc: &Document) -> Result<(), StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// The full persisted document sequence for a collection, in insertion
    /// order. An unknown collection is empty, not an error.
    fn get_collection(&self, name: &str) -> Result<Vec<Document>, StorageError>;

    /// Replaces the persisted sequence for a collection.
    fn set_collection(&self, name: &str, docs: &[Document]) -> Result<(), StorageError>;

    /// Filtered read over a persisted collection.
    fn query(&self, name: &str, filter: &Filter) -> Result<Vec<Document>, StorageError> {
        Ok(self
            .get_collection(name)?
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect())
    }
}

/// Heap-backed adapter, used in tests and as the reference implementation.
#[derive(Default)]
pub struct MemoryAdapter {
    entries: RefCell<HashMap<String, Document>>,
    collections: RefCell<HashMap<String, Vec<Document>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> Result<Option<Document>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, doc: &Document) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn get_collection(&self, name: &str) -> Result<Vec<Document>, StorageError> {
        Ok(self
            .collections
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    fn set_collection(&self, name: &str, docs: &[Document]) -> Result<(), StorageError> {
        self.collections
            .borrow_mut()
            .insert(name.to_string(), docs.to_vec());
        Ok(())
    }
}
