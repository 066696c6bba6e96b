//! Hot sharing: reference-counted `share` and explicitly-driven `multicast`.
//!
//! Both put a single upstream subscription in front of any number of
//! downstream subscribers. `share` manages the upstream connection by
//! subscriber count (first subscriber connects, last disconnect tears it
//! down); `multicast` leaves connection lifetime to an explicit
//! `connect` / disconnect handshake.

use crate::reactive::{Reactive, WeakReactive};
use crate::subscription::Subscription;
use alloc::rc::Rc;
use core::cell::Cell;

impl<A: Clone + 'static> Reactive<A> {
    /// Returns a node that shares one upstream subscription among all of
    /// its subscribers.
    ///
    /// The upstream subscription is created when the first subscriber
    /// attaches and released when the last one leaves. Re-activation after
    /// an idle period re-reads the source's current value, so late
    /// subscribers never see a stale snapshot from the previous active
    /// window.
    pub fn share(&self) -> Reactive<A> {
        let out = Reactive::derived(self.get());
        let upstream: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));

        let source = self.clone();
        let weak = out.downgrade();
        let connect_slot = upstream.clone();
        out.set_on_first(move || {
            connect_slot.set(Some(forward_to(&source, &weak)));
        });

        out.set_on_last(move || {
            if let Some(sub) = upstream.take() {
                sub.unsubscribe();
            }
        });
        out
    }

    /// Returns a multicast wrapper around this node. Nothing flows until
    /// [`Multicast::connect`] is called, regardless of subscriber count.
    pub fn multicast(&self) -> Multicast<A> {
        let output = Reactive::derived(None);
        let connection: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));

        let slot = connection.clone();
        output.hold(Subscription::new(move || {
            if let Some(sub) = slot.take() {
                sub.unsubscribe();
            }
        }));

        Multicast {
            source: self.clone(),
            output,
            connection,
        }
    }
}

/// A shared node whose upstream connection is driven explicitly rather than
/// by subscriber count.
pub struct Multicast<A: Clone + 'static> {
    source: Reactive<A>,
    output: Reactive<A>,
    connection: Rc<Cell<Option<Subscription>>>,
}

impl<A: Clone + 'static> Multicast<A> {
    /// The shared output node. Subscribers may attach before or after
    /// `connect`; they only receive emissions while connected.
    pub fn stream(&self) -> Reactive<A> {
        self.output.clone()
    }

    /// Opens the upstream connection and returns a disconnect handle.
    /// The source's current value flows through immediately. Calling
    /// `connect` while already connected is a no-op and returns an inert
    /// handle.
    pub fn connect(&self) -> Subscription {
        let existing = self.connection.take();
        if existing.is_some() {
            self.connection.set(existing);
            return Subscription::empty();
        }

        self.connection
            .set(Some(forward_to(&self.source, &self.output.downgrade())));

        let slot = self.connection.clone();
        Subscription::new(move || {
            if let Some(sub) = slot.take() {
                sub.unsubscribe();
            }
        })
    }

    pub fn is_connected(&self) -> bool {
        let current = self.connection.take();
        let connected = current.is_some();
        self.connection.set(current);
        connected
    }
}

/// Subscribes `source` and mirrors its values and errors into `out`,
/// starting from the source's current value.
fn forward_to<A: Clone + 'static>(
    source: &Reactive<A>,
    out: &WeakReactive<A>,
) -> Subscription {
    let weak = out.clone();
    let weak_err = out.clone();
    source.subscribe_with(
        move |v| {
            if let Some(out) = weak.upgrade() {
                out.set(v.clone());
            }
        },
        move |e| {
            if let Some(out) = weak_err.upgrade() {
                out.fail(e.clone());
            }
        },
    )
}
