//! Single-source transform operators.
//!
//! Every operator here is a pure constructor: it derives a new node, wires
//! the source's emissions (and errors) into that node's `set`/`fail`, and
//! stores the upstream subscription on the node so teardown follows the
//! node's lifetime. Pointwise operators also derive a coherent initial value
//! from the source's current value so `get()` composes through chains.

use crate::reactive::Reactive;
use core::cell::{Cell, RefCell};

impl<A: Clone + 'static> Reactive<A> {
    /// Derives a node holding `f` applied to every source value.
    pub fn map<B: Clone + 'static>(&self, f: impl Fn(&A) -> B + 'static) -> Reactive<B> {
        let initial = self.read(|v| v.map(&f));
        let out = Reactive::derived(initial);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                if let Some(out) = weak.upgrade() {
                    out.set(f(v));
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }

    /// Forwards only values for which `pred` holds.
    ///
    /// A suppressed emission produces no downstream notification at all; the
    /// derived node keeps its last passed-through value, so `get()` stays
    /// coherent while the source holds a non-matching value.
    pub fn filter(&self, pred: impl Fn(&A) -> bool + 'static) -> Reactive<A> {
        let initial = self.read(|v| v.filter(|v| pred(v)).cloned());
        let out = Reactive::derived(initial);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                if pred(v) {
                    if let Some(out) = weak.upgrade() {
                        out.set(v.clone());
                    }
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }

    /// Folds emissions into an accumulator, emitting each intermediate
    /// state. The derived node starts at `seed`.
    pub fn scan<B: Clone + 'static>(
        &self,
        seed: B,
        f: impl Fn(&B, &A) -> B + 'static,
    ) -> Reactive<B> {
        let out = Reactive::derived(Some(seed.clone()));
        let acc = RefCell::new(seed);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                let next = f(&acc.borrow(), v);
                *acc.borrow_mut() = next.clone();
                if let Some(out) = weak.upgrade() {
                    out.set(next);
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }

    /// Suppresses an emission equal to the immediately preceding one.
    pub fn distinct(&self) -> Reactive<A>
    where
        A: PartialEq,
    {
        let initial = self.get();
        let out = Reactive::derived(initial.clone());
        let last = RefCell::new(initial);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                if last.borrow().as_ref() != Some(v) {
                    *last.borrow_mut() = Some(v.clone());
                    if let Some(out) = weak.upgrade() {
                        out.set(v.clone());
                    }
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }

    /// Emits `(previous, current)` starting from the second emission.
    ///
    /// The source's value at construction time does not count as an
    /// emission: after two `set` calls the first pair appears.
    pub fn pairwise(&self) -> Reactive<(A, A)> {
        let out = Reactive::derived(None);
        let prev: RefCell<Option<A>> = RefCell::new(None);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                let previous = prev.borrow_mut().replace(v.clone());
                if let Some(previous) = previous {
                    if let Some(out) = weak.upgrade() {
                        out.set((previous, v.clone()));
                    }
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }

    /// Forwards while `pred` holds; after the first failure every later
    /// emission is dropped, permanently.
    pub fn take_while(&self, pred: impl Fn(&A) -> bool + 'static) -> Reactive<A> {
        let initial = self.read(|v| v.filter(|v| pred(v)).cloned());
        let out = Reactive::derived(initial);
        let done = Cell::new(false);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                if done.get() {
                    return;
                }
                if pred(v) {
                    if let Some(out) = weak.upgrade() {
                        out.set(v.clone());
                    }
                } else {
                    done.set(true);
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }

    /// Derives a node whose first observed value is `seed`, regardless of
    /// the source's current value. Source emissions then flow through.
    pub fn start_with(&self, seed: A) -> Reactive<A> {
        let out = Reactive::derived(Some(seed));
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
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
        );
        out.hold(sub);
        out
    }

    /// Invokes `f` for its side effect on every forwarded emission without
    /// altering the value.
    pub fn tap(&self, f: impl Fn(&A) + 'static) -> Reactive<A> {
        let initial = self.get();
        let out = Reactive::derived(initial);
        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sub = self.watch(
            move |v| {
                f(v);
                if let Some(out) = weak.upgrade() {
                    out.set(v.clone());
                }
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );
        out.hold(sub);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn recorded<T: Clone + 'static>(
        r: &Reactive<T>,
    ) -> (Rc<RefCell<Vec<T>>>, crate::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let sub = r.subscribe(move |v| s.borrow_mut().push(v.clone()));
        (seen, sub)
    }

    #[test]
    fn test_map_tracks_source() {
        let src = Reactive::new(2);
        let doubled = src.map(|v| v * 2);
        assert_eq!(doubled.get(), Some(4));

        src.set(10);
        assert_eq!(doubled.get(), Some(20));
    }

    #[test]
    fn test_map_composes_through_chains() {
        let src = Reactive::new(3);
        let chained = src.map(|v| v + 1).map(|v| v * 10).map(|v| v.to_string());
        assert_eq!(chained.get(), Some("40".to_string()));

        src.set(5);
        assert_eq!(chained.get(), Some("60".to_string()));
    }

    #[test]
    fn test_filter_counts_matching_emissions_only() {
        let src = Reactive::new(0);
        let evens = src.filter(|v| v % 2 == 0);
        let (seen, _sub) = recorded(&evens);
        seen.borrow_mut().clear();

        for v in [1, 2, 3, 4, 5, 6] {
            src.set(v);
        }

        assert_eq!(*seen.borrow(), vec![2, 4, 6]);
    }

    #[test]
    fn test_filter_holds_last_good_value() {
        let src = Reactive::new(2);
        let evens = src.filter(|v| v % 2 == 0);
        assert_eq!(evens.get(), Some(2));

        src.set(3); // suppressed
        assert_eq!(evens.get(), Some(2));

        src.set(4);
        assert_eq!(evens.get(), Some(4));
    }

    #[test]
    fn test_filter_initial_value_respects_predicate() {
        let src = Reactive::new(1);
        let evens = src.filter(|v| v % 2 == 0);
        assert_eq!(evens.get(), None);

        let (seen, _sub) = recorded(&evens);
        assert!(seen.borrow().is_empty()); // nothing to deliver at attach
    }

    #[test]
    fn test_scan_accumulates() {
        let src = Reactive::new(0);
        let sum = src.scan(0, |acc, v| acc + v);
        assert_eq!(sum.get(), Some(0));

        src.set(1);
        src.set(2);
        src.set(3);
        assert_eq!(sum.get(), Some(6));
    }

    #[test]
    fn test_distinct_suppresses_consecutive_duplicates() {
        let src = Reactive::new(1);
        let d = src.distinct();
        let (seen, _sub) = recorded(&d);
        seen.borrow_mut().clear();

        src.set(1); // duplicate of current
        src.set(2);
        src.set(2);
        src.set(3);
        src.set(2);

        assert_eq!(*seen.borrow(), vec![2, 3, 2]);
    }

    #[test]
    fn test_pairwise_starts_at_second_emission() {
        let src = Reactive::new(0);
        let pairs = src.pairwise();
        let (seen, _sub) = recorded(&pairs);

        assert!(seen.borrow().is_empty());
        src.set(1);
        assert!(seen.borrow().is_empty());
        src.set(2);
        src.set(3);

        assert_eq!(*seen.borrow(), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_take_while_never_resumes() {
        let src = Reactive::new(1);
        let small = src.take_while(|v| *v < 10);
        let (seen, _sub) = recorded(&small);
        seen.borrow_mut().clear();

        src.set(5);
        src.set(20); // trips the predicate
        src.set(3); // would match again, but the gate is closed

        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_start_with_overrides_initial_value() {
        let src = Reactive::new(100);
        let s = src.start_with(0);
        assert_eq!(s.get(), Some(0));

        let (seen, _sub) = recorded(&s);
        assert_eq!(*seen.borrow(), vec![0]);

        src.set(7);
        assert_eq!(*seen.borrow(), vec![0, 7]);
    }

    #[test]
    fn test_tap_observes_without_altering() {
        let src = Reactive::new(1);
        let taps = Rc::new(RefCell::new(Vec::new()));
        let t = taps.clone();
        let tapped = src.tap(move |v| t.borrow_mut().push(*v));

        src.set(2);
        src.set(3);

        assert_eq!(tapped.get(), Some(3));
        assert_eq!(*taps.borrow(), vec![2, 3]); // initial value is state, not an emission
    }

    #[test]
    fn test_errors_propagate_through_transform_chain() {
        let src: Reactive<i32> = Reactive::new(1);
        let chain = src.map(|v| v + 1).filter(|_| true).distinct();

        let errors = Rc::new(RefCell::new(Vec::<String>::new()));
        let e = errors.clone();
        let _sub = chain.subscribe_with(|_| {}, move |err| {
            e.borrow_mut().push(err.message().to_string())
        });

        src.fail(crate::OperatorError::new("upstream broke"));

        assert_eq!(*errors.borrow(), vec!["upstream broke".to_string()]);
    }

    #[test]
    fn test_dropped_operator_releases_upstream_subscription() {
        let src = Reactive::new(1);
        {
            let _mapped = src.map(|v| v * 2);
            assert_eq!(src.subscriber_count(), 1);
        }
        assert_eq!(src.subscriber_count(), 0);
    }
}
