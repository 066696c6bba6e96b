//! Ordered, keyed, validated document collections with live queries.
//!
//! A [`Collection`] owns a document sequence in insertion order with a
//! hash index on the identity field. Every mutation runs the same
//! pipeline: validate, commit in memory, write through to storage (best
//! effort), then refresh registered live queries. Live queries are
//! reactive nodes holding the filtered result set; they re-emit only when
//! their result actually changes.
//!
//! Re-entrant mutation is legal: all collection borrows are released
//! before any query notification runs, and the reactive layer serializes
//! nested emission rounds.

use crate::adapter::StorageAdapter;
use crate::filter::Filter;
use crate::validate::{AcceptAll, Validator};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;
use ripple_core::{Document, Result, StoreError, ValidationError, Value};
use ripple_reactive::{Reactive, WeakReactive};

/// Tri-state result of the non-erroring mutation entry points
/// ([`Collection::try_insert`], [`Collection::try_update`]).
#[derive(Clone, Debug, PartialEq)]
pub enum TryOutcome {
    /// The document as committed (validator normalization applied).
    Accepted(Document),
    /// The validator turned the document away.
    Rejected(ValidationError),
    /// A structural failure (duplicate key, missing key, not found).
    Failed(StoreError),
}

impl TryOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TryOutcome::Accepted(_))
    }
}

struct QueryEntry {
    filter: Filter,
    target: WeakReactive<Vec<Document>>,
}

struct State {
    documents: Vec<Document>,
    index: HashMap<Value, usize>,
    queries: Vec<QueryEntry>,
}

/// An in-memory document store with pluggable validation and storage.
pub struct Collection {
    name: String,
    key_field: String,
    validator: Rc<dyn Validator>,
    storage: Option<Rc<dyn StorageAdapter>>,
    state: Rc<RefCell<State>>,
}

impl Collection {
    /// Creates an empty collection keyed by `"id"` that accepts every
    /// document.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key_field: "id".to_string(),
            validator: Rc::new(AcceptAll),
            storage: None,
            state: Rc::new(RefCell::new(State {
                documents: Vec::new(),
                index: HashMap::new(),
                queries: Vec::new(),
            })),
        }
    }

    /// Changes the identity field. Call before any documents are stored.
    pub fn with_key(mut self, key_field: &str) -> Self {
        self.key_field = key_field.to_string();
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Rc::new(validator);
        self
    }

    /// Attaches a storage adapter and loads any persisted documents.
    /// Documents that lack the identity field or collide on it are skipped
    /// with a warning. Configure the key field before calling this.
    pub fn with_storage(self, adapter: Rc<dyn StorageAdapter>) -> Self {
        match adapter.get_collection(&self.name) {
            Ok(persisted) => {
                let mut state = self.state.borrow_mut();
                for doc in persisted {
                    match doc.get(&self.key_field) {
                        Some(key) if !state.index.contains_key(key) => {
                            let key = key.clone();
                            let pos = state.documents.len();
                            state.documents.push(doc);
                            state.index.insert(key, pos);
                        }
                        _ => {
                            log::warn!(
                                "collection {}: skipping persisted document without usable key",
                                self.name
                            );
                        }
                    }
                }
            }
            Err(err) => {
                log::warn!("collection {}: load failed: {}", self.name, err);
            }
        }
        Self {
            storage: Some(adapter),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn len(&self) -> usize {
        self.state.borrow().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().documents.is_empty()
    }

    /// Snapshot of all documents in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.state.borrow().documents.clone()
    }

    /// Looks a document up by its identity value.
    pub fn get(&self, key: impl Into<Value>) -> Option<Document> {
        let key = key.into();
        let state = self.state.borrow();
        state
            .index
            .get(&key)
            .map(|pos| state.documents[*pos].clone())
    }

    /// Runs the validator and the identity check without committing;
    /// returns the document as it would be stored.
    pub fn validate_insert(&self, doc: &Document) -> Result<Document> {
        let validated = self.validator.validate(doc).map_err(StoreError::from)?;
        self.key_of(&validated)?;
        Ok(validated)
    }

    /// Validates and commits a new document, then persists and refreshes
    /// live queries. Returns the document as stored.
    pub fn insert(&self, doc: Document) -> Result<Document> {
        let validated = self.validator.validate(&doc).map_err(StoreError::from)?;
        let key = self.key_of(&validated)?;
        {
            let mut state = self.state.borrow_mut();
            if state.index.contains_key(&key) {
                return Err(StoreError::duplicate_key(&self.name, key));
            }
            let pos = state.documents.len();
            state.documents.push(validated.clone());
            state.index.insert(key, pos);
        }
        self.after_commit();
        Ok(validated)
    }

    /// Insert that reports validator rejection as data instead of an error.
    pub fn try_insert(&self, doc: Document) -> TryOutcome {
        match self.insert(doc) {
            Ok(stored) => TryOutcome::Accepted(stored),
            Err(StoreError::Validation(err)) => TryOutcome::Rejected(err),
            Err(err) => TryOutcome::Failed(err),
        }
    }

    /// Merges `patch` over the document with the given identity, validates
    /// the merged result and commits it. The identity field cannot change.
    pub fn update(&self, key: impl Into<Value>, patch: &Document) -> Result<Document> {
        let key = key.into();
        let merged = {
            let state = self.state.borrow();
            let pos = state
                .index
                .get(&key)
                .copied()
                .ok_or_else(|| StoreError::not_found(&self.name, key.clone()))?;
            state.documents[pos].merged(patch)
        };
        if merged.get(&self.key_field) != Some(&key) {
            return Err(StoreError::immutable_key(&self.name, key));
        }
        let validated = self.validator.validate(&merged).map_err(StoreError::from)?;
        if validated.get(&self.key_field) != Some(&key) {
            return Err(StoreError::immutable_key(&self.name, key));
        }
        {
            let mut state = self.state.borrow_mut();
            // Position may have moved if a subscriber mutated re-entrantly.
            let pos = state
                .index
                .get(&key)
                .copied()
                .ok_or_else(|| StoreError::not_found(&self.name, key.clone()))?;
            state.documents[pos] = validated.clone();
        }
        self.after_commit();
        Ok(validated)
    }

    /// Update that reports validator rejection as data instead of an error.
    pub fn try_update(&self, key: impl Into<Value>, patch: &Document) -> TryOutcome {
        match self.update(key, patch) {
            Ok(stored) => TryOutcome::Accepted(stored),
            Err(StoreError::Validation(err)) => TryOutcome::Rejected(err),
            Err(err) => TryOutcome::Failed(err),
        }
    }

    /// Removes and returns the document with the given identity.
    pub fn delete(&self, key: impl Into<Value>) -> Result<Document> {
        let key = key.into();
        let removed = {
            let mut state = self.state.borrow_mut();
            let pos = state
                .index
                .remove(&key)
                .ok_or_else(|| StoreError::not_found(&self.name, key.clone()))?;
            let doc = state.documents.remove(pos);
            for slot in state.index.values_mut() {
                if *slot > pos {
                    *slot -= 1;
                }
            }
            doc
        };
        self.after_commit();
        Ok(removed)
    }

    /// Removes every document.
    pub fn clear(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.documents.clear();
            state.index.clear();
        }
        self.after_commit();
    }

    /// Registers a live query and returns its result node, seeded with the
    /// current matches in insertion order. The node re-emits after any
    /// mutation that changes its result set; dropping every handle to it
    /// retires the query.
    pub fn find(&self, filter: Filter) -> Reactive<Vec<Document>> {
        let initial: Vec<Document> = {
            let state = self.state.borrow();
            state
                .documents
                .iter()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .collect()
        };
        let query = Reactive::new(initial);
        self.state.borrow_mut().queries.push(QueryEntry {
            filter,
            target: query.downgrade(),
        });
        query
    }

    /// Live query over the whole collection.
    pub fn live(&self) -> Reactive<Vec<Document>> {
        self.find(Filter::all())
    }

    /// Returns the first document matching `filter`, in insertion order.
    /// Synchronous and non-reactive; no query is registered.
    pub fn find_one(&self, filter: &Filter) -> Option<Document> {
        let state = self.state.borrow();
        state
            .documents
            .iter()
            .find(|doc| filter.matches(doc))
            .cloned()
    }

    /// Live query for the first matching document.
    pub fn live_one(&self, filter: Filter) -> Reactive<Option<Document>> {
        self.find(filter).map(|docs| docs.first().cloned())
    }

    fn key_of(&self, doc: &Document) -> Result<Value> {
        doc.get(&self.key_field)
            .cloned()
            .ok_or_else(|| StoreError::missing_key(&self.name, &self.key_field))
    }

    fn after_commit(&self) {
        self.persist();
        self.refresh_queries();
    }

    fn persist(&self) {
        if let Some(storage) = &self.storage {
            let snapshot = self.state.borrow().documents.clone();
            if let Err(err) = storage.set_collection(&self.name, &snapshot) {
                log::warn!("collection {}: persist failed: {}", self.name, err);
            }
        }
    }

    /// Re-evaluates every registered filter and notifies queries whose
    /// result set changed. Retired queries are swept here.
    ///
    /// Each result is computed from the document sequence as it stands when
    /// that query is notified, not from a snapshot taken up front: a
    /// subscriber may mutate the collection re-entrantly, and a query
    /// notified later in the round must reflect that mutation rather than
    /// be rolled back to a stale result. All state borrows are released
    /// before any `set` runs.
    fn refresh_queries(&self) {
        let live: Vec<(Reactive<Vec<Document>>, Filter)> = {
            let mut state = self.state.borrow_mut();
            let mut live = Vec::new();
            state.queries.retain(|entry| match entry.target.upgrade() {
                Some(target) => {
                    live.push((target, entry.filter.clone()));
                    true
                }
                None => false,
            });
            live
        };
        for (target, filter) in live {
            let result: Vec<Document> = {
                let state = self.state.borrow();
                state
                    .documents
                    .iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            };
            if target.read(|current| current != Some(&result)) {
                target.set(result);
            }
        }
    }
}
