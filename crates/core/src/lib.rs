//! Ripple Core - Foundational types for the Ripple reactive data layer.
//!
//! This crate provides the types shared by the reactive engine and the
//! collection store:
//!
//! - `Value`: Runtime values that can be stored in a document field
//! - `Document`: An ordered field map with an identity field
//! - `ValidationError` / `FieldError` / `StoreError`: Error taxonomy for
//!   collection mutations
//! - `text_match`: SQL LIKE and a compact regex subset used by filter
//!   conditions
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{doc, Value};
//!
//! let user = doc! {
//!     "id" => 1,
//!     "name" => "Alice",
//!     "age" => 30,
//! };
//!
//! assert_eq!(user.get("name"), Some(&Value::from("Alice")));
//! assert_eq!(user.get("age").and_then(|v| v.as_int()), Some(30));
//! ```

#![no_std]

extern crate alloc;

mod document;
mod error;
pub mod text_match;
mod value;

pub use document::Document;
pub use error::{FieldError, Result, StoreError, ValidationError};
pub use value::Value;
