//! Ripple Reactive - Push-based reactive stream engine.
//!
//! This crate implements the reactive primitive and its operator layer. A
//! [`Reactive<T>`] holds a current value and an insertion-ordered set of
//! subscribers; setting a new value synchronously notifies every subscriber
//! in attachment order. Operators derive new reactives from existing ones,
//! wiring upstream subscriptions into their own `set`.
//!
//! # Core concepts
//!
//! - [`Reactive`]: the stream primitive (`get` / `set` / `subscribe`)
//! - [`Subscription`]: an idempotent unsubscribe handle
//! - [`Scheduler`]: virtual-time scheduler backing the `delay` operator
//! - [`OperatorError`]: the distinguished error notification carried on the
//!   error channel alongside values
//! - [`Multicast`]: connect-gated sharing of a single upstream subscription
//!
//! # Semantics
//!
//! The model is single-threaded and cooperative. Propagation happens
//! synchronously, depth-first, within the `set` call that triggered it.
//! Re-entrant `set` calls from inside a subscriber are queued per node and
//! drained after the current notification round, so no subscriber observes a
//! partial multi-step mutation. A reactive's current value is *state*;
//! operators that react to emissions (`pairwise`, `combine_latest`, `zip`,
//! `sample`, ...) count only `set` calls made after the operator was built.
//!
//! # Example
//!
//! ```rust
//! use ripple_reactive::reactive;
//!
//! let source = reactive(1);
//! let doubled = source.map(|v| v * 2);
//! assert_eq!(doubled.get(), Some(2));
//!
//! source.set(21);
//! assert_eq!(doubled.get(), Some(42));
//! ```

#![no_std]

extern crate alloc;

mod combine;
mod error;
mod flatten;
mod reactive;
mod recover;
mod scheduler;
mod share;
mod subscription;
mod timing;
mod transform;

pub use error::{OperatorError, SubscriptionError};
pub use reactive::{Reactive, SubscriberId, WeakReactive};
pub use scheduler::{Scheduler, TimerId};
pub use share::Multicast;
pub use subscription::Subscription;

/// Creates a root reactive holding `initial`.
///
/// External producers (timers, sockets, adapters) only ever need this and
/// [`Reactive::set`].
pub fn reactive<T: Clone + 'static>(initial: T) -> Reactive<T> {
    Reactive::new(initial)
}
