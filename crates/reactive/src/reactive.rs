//! The reactive primitive.
//!
//! A `Reactive<T>` is a cheaply clonable handle onto a node that owns a
//! current value and an insertion-ordered subscriber list. `set` replaces the
//! value and synchronously notifies every subscriber attached at call time,
//! in attachment order. The model is single-threaded; handles are `!Send`.
//!
//! Two details carry most of the correctness weight:
//!
//! - Notification iterates a snapshot of the subscriber list, and each entry
//!   carries an alive flag checked immediately before its callback runs. A
//!   subscriber unsubscribed mid-round (by itself or by another subscriber)
//!   is never invoked again in that round. Flattening operators rely on this
//!   to guarantee that a cancelled inner stream cannot leak a stale emission.
//! - `set`/`fail` calls arriving while a notification round is in progress
//!   are queued on the node and dispatched after the round completes, so a
//!   subscriber never observes an interleaved partial update.
//!
//! Derived nodes (built by operators) store their upstream subscriptions on
//! the node itself; dropping the last handle to a derived node releases its
//! upstream subscriptions, propagating teardown toward the source.

use crate::error::{OperatorError, SubscriptionError};
use crate::subscription::Subscription;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// Unique identifier of a subscriber within one node.
pub type SubscriberId = u64;

enum Emission<T> {
    Value(T),
    Error(OperatorError),
}

struct Entry<T> {
    id: SubscriberId,
    alive: Cell<bool>,
    on_value: Box<dyn Fn(&T)>,
    on_error: Option<Box<dyn Fn(&OperatorError)>>,
}

pub(crate) struct Inner<T> {
    value: RefCell<Option<T>>,
    subscribers: RefCell<Vec<Rc<Entry<T>>>>,
    next_id: Cell<SubscriberId>,
    notifying: Cell<bool>,
    pending: RefCell<VecDeque<Emission<T>>>,
    /// Resources this node uniquely owns: upstream subscriptions, timers.
    links: RefCell<Vec<Subscription>>,
    /// Activation hooks for ref-counted sharing (Idle -> Active and back).
    on_first: RefCell<Option<Rc<dyn Fn()>>>,
    on_last: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        for link in self.links.get_mut().drain(..) {
            link.unsubscribe();
        }
    }
}

/// A push-based reactive value.
pub struct Reactive<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A non-owning handle to a reactive node.
///
/// Used where holding a `Reactive` would keep a dead consumer alive, e.g.
/// operator callbacks pointing downstream and a collection's live-query
/// registry.
pub struct WeakReactive<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for WeakReactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WeakReactive<T> {
    /// Upgrades to a strong handle if the node is still alive.
    pub fn upgrade(&self) -> Option<Reactive<T>> {
        self.inner.upgrade().map(|inner| Reactive { inner })
    }
}

impl<T: Clone + 'static> Reactive<T> {
    /// Creates a root reactive holding `initial`. Never fails.
    pub fn new(initial: T) -> Self {
        Self::with_value(Some(initial))
    }

    /// Creates a derived node. Operators whose output has no defined value
    /// until a first emission pass `None`.
    pub(crate) fn derived(initial: Option<T>) -> Self {
        Self::with_value(initial)
    }

    fn with_value(value: Option<T>) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                notifying: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
                links: RefCell::new(Vec::new()),
                on_first: RefCell::new(None),
                on_last: RefCell::new(None),
            }),
        }
    }

    /// Returns a clone of the current value.
    ///
    /// Root reactives always hold a value; a derived node returns `None`
    /// until its first emission. O(1) apart from the clone, no side effect.
    pub fn get(&self) -> Option<T> {
        self.inner.value.borrow().clone()
    }

    /// Reads the current value without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.inner.value.borrow().as_ref())
    }

    /// Replaces the current value, then synchronously notifies every
    /// subscriber attached at call time, in attachment order.
    ///
    /// A `set` issued from inside a subscriber callback is queued and
    /// dispatched after the current round completes.
    pub fn set(&self, value: T) {
        self.inner.push(Emission::Value(value));
    }

    /// Pushes an error notification onto the error channel.
    ///
    /// Subscribers without an error handler log the error; operators forward
    /// it downstream.
    pub fn fail(&self, error: OperatorError) {
        self.inner.push(Emission::Error(error));
    }

    /// Attaches a value callback.
    ///
    /// The callback is invoked synchronously, once, with the current value
    /// (if the node holds one) before `subscribe` returns. Error
    /// notifications reaching this subscriber are logged; use
    /// [`subscribe_with`](Self::subscribe_with) to observe them.
    pub fn subscribe(&self, on_value: impl Fn(&T) + 'static) -> Subscription {
        self.attach(Box::new(on_value), None, true)
    }

    /// Attaches a value callback and an error callback.
    pub fn subscribe_with(
        &self,
        on_value: impl Fn(&T) + 'static,
        on_error: impl Fn(&OperatorError) + 'static,
    ) -> Subscription {
        self.attach(Box::new(on_value), Some(Box::new(on_error)), true)
    }

    /// Attaches a fallible value callback.
    ///
    /// A returned `Err` is logged and isolated: it never prevents the
    /// remaining subscribers in the same notification round from running and
    /// never corrupts the node's state.
    pub fn subscribe_guarded(
        &self,
        on_value: impl Fn(&T) -> Result<(), SubscriptionError> + 'static,
    ) -> Subscription {
        self.attach(
            Box::new(move |v: &T| {
                if let Err(err) = on_value(v) {
                    log::warn!("{}", err);
                }
            }),
            None,
            true,
        )
    }

    /// Attaches operator callbacks without delivering the current value.
    ///
    /// Operators treat the current value as state, not as an emission; they
    /// derive their own initial value at construction and react only to
    /// `set` calls made afterwards.
    pub(crate) fn watch(
        &self,
        on_value: impl Fn(&T) + 'static,
        on_error: impl Fn(&OperatorError) + 'static,
    ) -> Subscription {
        self.attach(Box::new(on_value), Some(Box::new(on_error)), false)
    }

    /// Returns the number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Downgrades to a non-owning handle.
    pub fn downgrade(&self) -> WeakReactive<T> {
        WeakReactive {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Stores a resource to be released when this node is dropped.
    pub(crate) fn hold(&self, link: Subscription) {
        self.inner.links.borrow_mut().push(link);
    }

    /// Installs the Idle -> Active transition hook (first subscriber).
    pub(crate) fn set_on_first(&self, hook: impl Fn() + 'static) {
        *self.inner.on_first.borrow_mut() = Some(Rc::new(hook));
    }

    /// Installs the Active -> Idle transition hook (last unsubscribe).
    pub(crate) fn set_on_last(&self, hook: impl Fn() + 'static) {
        *self.inner.on_last.borrow_mut() = Some(Rc::new(hook));
    }

    fn attach(
        &self,
        on_value: Box<dyn Fn(&T)>,
        on_error: Option<Box<dyn Fn(&OperatorError)>>,
        emit_current: bool,
    ) -> Subscription {
        // Idle -> Active before the entry is added: the upstream attach may
        // synchronously push a value through this node, and the new
        // subscriber must not see it twice.
        let activate = self.inner.subscribers.borrow().is_empty();
        if activate {
            let hook = self.inner.on_first.borrow().clone();
            if let Some(hook) = hook {
                hook();
            }
        }

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let entry = Rc::new(Entry {
            id,
            alive: Cell::new(true),
            on_value,
            on_error,
        });
        self.inner.subscribers.borrow_mut().push(entry.clone());

        if emit_current {
            let current = self.get();
            if let Some(value) = current {
                if entry.alive.get() {
                    (entry.on_value)(&value);
                }
            }
        }

        let inner = self.inner.clone();
        Subscription::new(move || {
            entry.alive.set(false);
            let now_empty = {
                let mut subs = inner.subscribers.borrow_mut();
                if let Some(pos) = subs.iter().position(|e| e.id == id) {
                    subs.remove(pos);
                }
                subs.is_empty()
            };
            if now_empty {
                let hook = inner.on_last.borrow().clone();
                if let Some(hook) = hook {
                    hook();
                }
            }
        })
    }
}

impl<T: Clone> Inner<T> {
    fn push(&self, emission: Emission<T>) {
        if self.notifying.get() {
            self.pending.borrow_mut().push_back(emission);
            return;
        }
        self.notifying.set(true);
        self.dispatch(emission);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(emission) => self.dispatch(emission),
                None => break,
            }
        }
        self.notifying.set(false);
    }

    fn dispatch(&self, emission: Emission<T>) {
        match emission {
            Emission::Value(value) => {
                *self.value.borrow_mut() = Some(value.clone());
                let snapshot: Vec<Rc<Entry<T>>> = self.subscribers.borrow().clone();
                for entry in snapshot {
                    if entry.alive.get() {
                        (entry.on_value)(&value);
                    }
                }
            }
            Emission::Error(error) => {
                let snapshot: Vec<Rc<Entry<T>>> = self.subscribers.borrow().clone();
                if snapshot.is_empty() {
                    log::warn!("unobserved {}", error);
                }
                for entry in snapshot {
                    if entry.alive.get() {
                        match &entry.on_error {
                            Some(on_error) => on_error(&error),
                            None => log::warn!("unhandled {}", error),
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperatorError;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn test_get_returns_latest_value() {
        let r = Reactive::new(1);
        assert_eq!(r.get(), Some(1));
        r.set(2);
        assert_eq!(r.get(), Some(2));
    }

    #[test]
    fn test_subscribe_emits_current_value_synchronously() {
        let r = Reactive::new(10);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();

        let _sub = r.subscribe(move |v| s.borrow_mut().push(*v));

        // Delivered before subscribe returned
        assert_eq!(*seen.borrow(), vec![10]);
    }

    #[test]
    fn test_set_notifies_in_attachment_order() {
        let r = Reactive::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = order.clone();
        let _s1 = r.subscribe(move |v| o1.borrow_mut().push((1, *v)));
        let o2 = order.clone();
        let _s2 = r.subscribe(move |v| o2.borrow_mut().push((2, *v)));

        order.borrow_mut().clear();
        r.set(5);

        assert_eq!(*order.borrow(), vec![(1, 5), (2, 5)]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let r = Reactive::new(0);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = r.subscribe(move |_| c.set(c.get() + 1));
        assert_eq!(count.get(), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        sub.unsubscribe();

        r.set(1);
        assert_eq!(count.get(), 1);
        assert_eq!(r.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribed_mid_round_not_invoked() {
        let r = Reactive::new(0);
        let hits = Rc::new(Cell::new(0));

        // First subscriber unsubscribes the second during the round
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot2 = slot.clone();
        let _s1 = r.subscribe(move |v| {
            if *v == 1 {
                if let Some(sub) = slot2.borrow_mut().take() {
                    sub.unsubscribe();
                }
            }
        });
        let h = hits.clone();
        let s2 = r.subscribe(move |_| h.set(h.get() + 1));
        *slot.borrow_mut() = Some(s2);

        assert_eq!(hits.get(), 1); // initial delivery only
        r.set(1);
        assert_eq!(hits.get(), 1); // removed before its turn
    }

    #[test]
    fn test_reentrant_set_is_queued_not_nested() {
        let r = Reactive::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let handle = r.clone();
        let s1 = seen.clone();
        let _s = r.subscribe(move |v| {
            s1.borrow_mut().push(*v);
            if *v == 1 {
                handle.set(2); // re-entrant: must run after this round
            }
        });
        let s2 = seen.clone();
        let _t = r.subscribe(move |v| s2.borrow_mut().push(10 + *v));

        seen.borrow_mut().clear();
        r.set(1);

        // Round for 1 completes (both subscribers) before the round for 2
        assert_eq!(*seen.borrow(), vec![1, 11, 2, 12]);
        assert_eq!(r.get(), Some(2));
    }

    #[test]
    fn test_subscribe_during_notification_sees_no_partial_round() {
        let r = Reactive::new(0);
        let late_hits = Rc::new(Cell::new(0));

        let handle = r.clone();
        let hits = late_hits.clone();
        let subs: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
        let subs2 = subs.clone();
        let _s = r.subscribe(move |v| {
            if *v == 1 {
                let h = hits.clone();
                // Attached mid-round: receives the current value once at
                // attach, nothing extra from the snapshot in flight.
                let sub = handle.subscribe(move |_| h.set(h.get() + 1));
                subs2.borrow_mut().push(sub);
            }
        });

        r.set(1);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_error_channel_reaches_error_handler() {
        let r: Reactive<i32> = Reactive::new(0);
        let errors = Rc::new(RefCell::new(Vec::new()));
        let e = errors.clone();
        let _sub = r.subscribe_with(|_| {}, move |err| e.borrow_mut().push(err.clone()));

        r.fail(OperatorError::new("boom"));

        assert_eq!(errors.borrow().len(), 1);
        assert_eq!(errors.borrow()[0].message(), "boom");
        // Value state untouched by the error
        assert_eq!(r.get(), Some(0));
    }

    #[test]
    fn test_guarded_subscriber_failure_does_not_stop_round() {
        let r = Reactive::new(0);
        let hits = Rc::new(Cell::new(0));

        let _bad = r.subscribe_guarded(|v| {
            if *v > 0 {
                Err(crate::SubscriptionError::new("always fails"))
            } else {
                Ok(())
            }
        });
        let h = hits.clone();
        let _good = r.subscribe(move |_| h.set(h.get() + 1));

        r.set(1);
        r.set(2);
        assert_eq!(hits.get(), 3); // initial + two sets
        assert_eq!(r.get(), Some(2));
    }

    #[test]
    fn test_weak_reactive_upgrade() {
        let r = Reactive::new(5);
        let weak = r.downgrade();
        assert!(weak.upgrade().is_some());
        drop(r);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_subscription_handle_keeps_node_alive() {
        let weak = {
            let r = Reactive::new(5);
            let sub = r.subscribe(|_| {});
            let weak = r.downgrade();
            drop(r);
            // The outstanding subscription still references the node
            assert!(weak.upgrade().is_some());
            sub.unsubscribe();
            weak
        };
        assert!(weak.upgrade().is_none());
    }
}
