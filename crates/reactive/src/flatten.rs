//! Flattening operators: switch_map, merge_map, concat_map.
//!
//! Each outer emission is projected to an inner reactive. The operators
//! differ only in how inner lifetimes overlap:
//!
//! - `switch_map` keeps exactly one inner alive, cancelling the previous one
//!   *before* the next subscription begins, so a stale inner can never slip
//!   an emission through.
//! - `merge_map` keeps every inner alive and interleaves their emissions in
//!   arrival order.
//! - `concat_map` runs inners strictly one at a time in outer-emission
//!   order; a queued successor takes over once the active inner has
//!   contributed at least one value.
//!
//! Subscribing to an inner delivers the inner's current value immediately
//! (it is the inner stream's present state). All inner subscriptions are
//! torn down when the derived node is dropped.

use crate::reactive::{Reactive, WeakReactive};
use crate::subscription::Subscription;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

impl<A: Clone + 'static> Reactive<A> {
    /// Projects each outer emission to an inner reactive and forwards only
    /// the currently-active inner's emissions.
    ///
    /// This is the engine's primary cancellation primitive: the previous
    /// inner is unsubscribed strictly before the new inner subscription
    /// begins.
    pub fn switch_map<B: Clone + 'static>(
        &self,
        project: impl Fn(&A) -> Reactive<B> + 'static,
    ) -> Reactive<B> {
        let out = Reactive::derived(None);
        let active: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));

        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let slot = active.clone();
        let sub = self.watch(
            move |v| {
                // Cancel the stale inner first; only then may the new inner
                // begin emitting.
                if let Some(previous) = slot.take() {
                    previous.unsubscribe();
                }
                let inner = project(v);
                slot.set(Some(forward_inner(&inner, &weak)));
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );

        out.hold(sub);
        let slot = active;
        out.hold(Subscription::new(move || {
            if let Some(inner) = slot.take() {
                inner.unsubscribe();
            }
        }));
        out
    }

    /// Projects each outer emission to an inner reactive and forwards every
    /// inner's emissions, interleaved by arrival order. Inner lifetimes
    /// overlap; all are torn down with the derived node.
    pub fn merge_map<B: Clone + 'static>(
        &self,
        project: impl Fn(&A) -> Reactive<B> + 'static,
    ) -> Reactive<B> {
        let out = Reactive::derived(None);
        let inners: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let pool = inners.clone();
        let sub = self.watch(
            move |v| {
                let inner = project(v);
                pool.borrow_mut().push(forward_inner(&inner, &weak));
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );

        out.hold(sub);
        let pool = inners;
        out.hold(Subscription::new(move || {
            for inner in pool.borrow_mut().drain(..) {
                inner.unsubscribe();
            }
        }));
        out
    }

    /// Projects each outer emission to an inner reactive and subscribes to
    /// them strictly one at a time, in outer-emission order.
    ///
    /// The active inner keeps forwarding until it has produced at least one
    /// value *and* a successor is waiting; it is then unsubscribed and the
    /// next queued inner takes over.
    pub fn concat_map<B: Clone + 'static>(
        &self,
        project: impl Fn(&A) -> Reactive<B> + 'static,
    ) -> Reactive<B> {
        let out = Reactive::derived(None);
        let state: Rc<RefCell<ConcatState<B>>> = Rc::new(RefCell::new(ConcatState {
            active: None,
            emitted: false,
            queue: VecDeque::new(),
        }));

        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let st = state.clone();
        let sub = self.watch(
            move |v| {
                let inner = project(v);
                let start_now = {
                    let mut s = st.borrow_mut();
                    if s.active.is_some() {
                        if s.emitted {
                            // Finish the current step and move on.
                            let previous = s.active.take();
                            s.emitted = false;
                            drop(s);
                            if let Some(previous) = previous {
                                previous.unsubscribe();
                            }
                            true
                        } else {
                            s.queue.push_back(inner.clone());
                            false
                        }
                    } else {
                        true
                    }
                };
                if start_now {
                    attach_next(&st, &weak, inner.clone());
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );

        out.hold(sub);
        let st = state;
        out.hold(Subscription::new(move || {
            let mut s = st.borrow_mut();
            s.queue.clear();
            if let Some(active) = s.active.take() {
                drop(s);
                active.unsubscribe();
            }
        }));
        out
    }
}

struct ConcatState<B: Clone + 'static> {
    active: Option<Subscription>,
    emitted: bool,
    queue: VecDeque<Reactive<B>>,
}

/// Subscribes an inner stream, forwarding values and errors downstream.
fn forward_inner<B: Clone + 'static>(
    inner: &Reactive<B>,
    out: &WeakReactive<B>,
) -> Subscription {
    let weak = out.clone();
    let weak_err = out.clone();
    inner.subscribe_with(
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

/// Subscribes the next inner for `concat_map`, advancing the queue once the
/// inner has contributed a value and a successor is waiting.
fn attach_next<B: Clone + 'static>(
    state: &Rc<RefCell<ConcatState<B>>>,
    out: &WeakReactive<B>,
    inner: Reactive<B>,
) {
    let weak = out.clone();
    let weak_err = out.clone();
    let st = state.clone();
    let st_out = state.clone();
    let sub = inner.subscribe_with(
        move |v| {
            if let Some(out) = weak.upgrade() {
                out.set(v.clone());
            }
            // Advance after forwarding, outside the state borrow, because
            // the successor's subscribe emits synchronously.
            let next = {
                let mut s = st.borrow_mut();
                s.emitted = true;
                if s.queue.is_empty() {
                    None
                } else {
                    let previous = s.active.take();
                    s.emitted = false;
                    s.queue.pop_front().map(|n| (previous, n))
                }
            };
            if let Some((previous, next_inner)) = next {
                if let Some(previous) = previous {
                    previous.unsubscribe();
                }
                attach_next(&st, &weak, next_inner);
            }
        },
        move |e| {
            if let Some(out) = weak_err.upgrade() {
                out.fail(e.clone());
            }
        },
    );
    let mut s = st_out.borrow_mut();
    // The inner may already have advanced past itself during its initial
    // synchronous emission; only store the handle if the slot is free.
    if s.active.is_none() {
        s.active = Some(sub);
    } else {
        drop(s);
        sub.unsubscribe();
    }
}
