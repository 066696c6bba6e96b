//! Declarative document filters for queries and live queries.
//!
//! A [`Filter`] is a conjunction of per-field conditions built through the
//! fluent [`field`] entry point:
//!
//! ```
//! use ripple_store::filter::{field, Filter};
//!
//! let adults = field("age").gte(18).and(field("active").eq(true));
//! let anyone = Filter::all();
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use ripple_core::text_match;
use ripple_core::{Document, Value};

/// Starts a condition on a named document field.
pub fn field(name: &str) -> Field {
    Field {
        name: name.to_string(),
    }
}

/// A field reference awaiting its condition.
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
}

impl Field {
    pub fn eq(self, value: impl Into<Value>) -> Filter {
        self.cond(Cond::Eq(value.into()))
    }

    pub fn ne(self, value: impl Into<Value>) -> Filter {
        self.cond(Cond::Ne(value.into()))
    }

    pub fn gt(self, value: impl Into<Value>) -> Filter {
        self.cond(Cond::Gt(value.into()))
    }

    pub fn gte(self, value: impl Into<Value>) -> Filter {
        self.cond(Cond::Gte(value.into()))
    }

    pub fn lt(self, value: impl Into<Value>) -> Filter {
        self.cond(Cond::Lt(value.into()))
    }

    pub fn lte(self, value: impl Into<Value>) -> Filter {
        self.cond(Cond::Lte(value.into()))
    }

    /// Matches when the field equals any of the given values.
    pub fn one_of(self, values: impl IntoIterator<Item = impl Into<Value>>) -> Filter {
        self.cond(Cond::In(values.into_iter().map(Into::into).collect()))
    }

    /// SQL LIKE match with `%` (any run) and `_` (any char) wildcards.
    /// Only string fields can match.
    pub fn like(self, pattern: &str) -> Filter {
        self.cond(Cond::Like(pattern.to_string()))
    }

    /// Regular-expression match (compact subset: anchors, classes, `.`,
    /// `*` `+` `?` quantifiers). Only string fields can match; an invalid
    /// pattern matches nothing.
    pub fn matches(self, pattern: &str) -> Filter {
        self.cond(Cond::Matches(pattern.to_string()))
    }

    fn cond(self, cond: Cond) -> Filter {
        Filter {
            conditions: alloc::vec![(self.name, cond)],
        }
    }
}

/// A single field condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Cond {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Like(String),
    Matches(String),
}

/// A conjunction of field conditions. The empty filter matches every
/// document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Cond)>,
}

impl Filter {
    /// The filter that matches every document.
    pub fn all() -> Self {
        Filter::default()
    }

    /// Conjunction: the combined filter matches documents matching both.
    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates the filter against a document.
    ///
    /// A condition on a field the document lacks never matches, with the
    /// one exception of `Ne`, which treats an absent field as unequal.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|(name, cond)| {
            match doc.get(name) {
                Some(value) => eval(cond, value),
                None => matches!(cond, Cond::Ne(_)),
            }
        })
    }
}

fn eval(cond: &Cond, value: &Value) -> bool {
    use core::cmp::Ordering;
    match cond {
        Cond::Eq(expected) => value == expected,
        Cond::Ne(expected) => value != expected,
        Cond::Gt(bound) => ordered(value, bound, |o| o == Ordering::Greater),
        Cond::Gte(bound) => ordered(value, bound, |o| o != Ordering::Less),
        Cond::Lt(bound) => ordered(value, bound, |o| o == Ordering::Less),
        Cond::Lte(bound) => ordered(value, bound, |o| o != Ordering::Greater),
        Cond::In(options) => options.iter().any(|option| value == option),
        Cond::Like(pattern) => match value.as_str() {
            Some(s) => text_match::like(s, pattern),
            None => false,
        },
        Cond::Matches(pattern) => match value.as_str() {
            Some(s) => text_match::regex_match(s, pattern),
            None => false,
        },
    }
}

// Incomparable kinds (e.g. string vs int) fail ordered conditions.
fn ordered(
    value: &Value,
    bound: &Value,
    accept: impl Fn(core::cmp::Ordering) -> bool,
) -> bool {
    value.compare_same_kind(bound).map_or(false, accept)
}
