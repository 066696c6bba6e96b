//! Multi-source combination operators.
//!
//! These operators synchronize emissions from several sources. They track
//! emissions, not attach-time state: a source "has emitted" only once `set`
//! was called on it after the operator was built.

use crate::reactive::Reactive;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;

impl<A: Clone + 'static> Reactive<A> {
    /// Emits `(a, b)` whenever either source emits, using the other source's
    /// most recent emission. Emits nothing until both have emitted.
    pub fn combine_latest<B: Clone + 'static>(&self, other: &Reactive<B>) -> Reactive<(A, B)> {
        let out = Reactive::derived(None);
        let latest: Rc<RefCell<(Option<A>, Option<B>)>> = Rc::new(RefCell::new((None, None)));

        let weak = out.downgrade();
        let state = latest.clone();
        let sub_a = self.watch(
            move |v| {
                state.borrow_mut().0 = Some(v.clone());
                let pair = {
                    let s = state.borrow();
                    match (&s.0, &s.1) {
                        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                        _ => None,
                    }
                };
                if let (Some(pair), Some(out)) = (pair, weak.upgrade()) {
                    out.set(pair);
                }
            },
            forward_error(&out),
        );

        let weak = out.downgrade();
        let state = latest;
        let sub_b = other.watch(
            move |v| {
                state.borrow_mut().1 = Some(v.clone());
                let pair = {
                    let s = state.borrow();
                    match (&s.0, &s.1) {
                        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                        _ => None,
                    }
                };
                if let (Some(pair), Some(out)) = (pair, weak.upgrade()) {
                    out.set(pair);
                }
            },
            forward_error(&out),
        );

        out.hold(sub_a);
        out.hold(sub_b);
        out
    }

    /// Three-source [`combine_latest`](Self::combine_latest).
    pub fn combine_latest3<B: Clone + 'static, C: Clone + 'static>(
        &self,
        second: &Reactive<B>,
        third: &Reactive<C>,
    ) -> Reactive<(A, B, C)> {
        self.combine_latest(&second.combine_latest(third))
            .map(|(a, (b, c))| (a.clone(), b.clone(), c.clone()))
    }

    /// Emits `(a, b)` only when every source holds at least one unconsumed
    /// buffered emission. Buffers are FIFO; one entry per source is consumed
    /// per output, strictly in arrival order.
    pub fn zip<B: Clone + 'static>(&self, other: &Reactive<B>) -> Reactive<(A, B)> {
        let out = Reactive::derived(None);
        let buffers: Rc<RefCell<(VecDeque<A>, VecDeque<B>)>> =
            Rc::new(RefCell::new((VecDeque::new(), VecDeque::new())));

        let weak = out.downgrade();
        let state = buffers.clone();
        let sub_a = self.watch(
            move |v| {
                let pair = {
                    let mut s = state.borrow_mut();
                    s.0.push_back(v.clone());
                    if !s.0.is_empty() && !s.1.is_empty() {
                        let a = s.0.pop_front();
                        let b = s.1.pop_front();
                        a.zip(b)
                    } else {
                        None
                    }
                };
                if let (Some(pair), Some(out)) = (pair, weak.upgrade()) {
                    out.set(pair);
                }
            },
            forward_error(&out),
        );

        let weak = out.downgrade();
        let state = buffers;
        let sub_b = other.watch(
            move |v| {
                let pair = {
                    let mut s = state.borrow_mut();
                    s.1.push_back(v.clone());
                    if !s.0.is_empty() && !s.1.is_empty() {
                        let a = s.0.pop_front();
                        let b = s.1.pop_front();
                        a.zip(b)
                    } else {
                        None
                    }
                };
                if let (Some(pair), Some(out)) = (pair, weak.upgrade()) {
                    out.set(pair);
                }
            },
            forward_error(&out),
        );

        out.hold(sub_a);
        out.hold(sub_b);
        out
    }

    /// Emits on this source's emissions only, paired with `other`'s latest
    /// emission. Silent until `other` has emitted at least once.
    pub fn with_latest_from<B: Clone + 'static>(&self, other: &Reactive<B>) -> Reactive<(A, B)> {
        let out = Reactive::derived(None);
        let latest: Rc<RefCell<Option<B>>> = Rc::new(RefCell::new(None));

        let state = latest.clone();
        let sub_other = other.watch(
            move |v| {
                *state.borrow_mut() = Some(v.clone());
            },
            forward_error(&out),
        );

        let weak = out.downgrade();
        let state = latest;
        let sub_self = self.watch(
            move |v| {
                let pair = state.borrow().as_ref().map(|b| (v.clone(), b.clone()));
                if let (Some(pair), Some(out)) = (pair, weak.upgrade()) {
                    out.set(pair);
                }
            },
            forward_error(&out),
        );

        out.hold(sub_other);
        out.hold(sub_self);
        out
    }

    /// Emits this source's latest value each time `trigger` emits.
    pub fn sample<B: Clone + 'static>(&self, trigger: &Reactive<B>) -> Reactive<A> {
        let out = Reactive::derived(None);
        let source = self.clone();
        let weak = out.downgrade();
        let sub = trigger.watch(
            move |_| {
                if let (Some(value), Some(out)) = (source.get(), weak.upgrade()) {
                    out.set(value);
                }
            },
            forward_error(&out),
        );
        out.hold(sub);
        out
    }
}

/// Builds the standard error-forwarding callback for a derived node.
fn forward_error<T: Clone + 'static>(
    out: &Reactive<T>,
) -> impl Fn(&crate::OperatorError) + 'static {
    let weak = out.downgrade();
    move |e| {
        if let Some(out) = weak.upgrade() {
            out.fail(e.clone());
        }
    }
}
