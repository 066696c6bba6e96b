//! Live-query document collections for the Ripple reactive data layer.
//!
//! A [`Collection`] stores documents in insertion order, keyed by an
//! identity field, behind a pluggable [`Validator`] and an optional
//! [`StorageAdapter`]. Queries built from [`Filter`] conditions come back
//! as reactive result sets that stay in sync as the collection mutates:
//!
//! ```
//! use ripple_core::doc;
//! use ripple_store::{field, Collection};
//!
//! let users = Collection::new("users");
//! let adults = users.find(field("age").gte(18));
//!
//! users.insert(doc! {"id" => 1, "name" => "ada", "age" => 36}).unwrap();
//! assert_eq!(adults.get().map(|docs| docs.len()), Some(1));
//! ```

#![no_std]

extern crate alloc;

pub mod adapter;
pub mod collection;
pub mod filter;
pub mod validate;

pub use adapter::{MemoryAdapter, StorageAdapter, StorageError};
pub use collection::{Collection, TryOutcome};
pub use filter::{field, Cond, Filter};
pub use validate::{AcceptAll, Validator};

pub use ripple_core::{Document, FieldError, StoreError, ValidationError, Value};
