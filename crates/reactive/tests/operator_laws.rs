//! Property tests for operator algebra over arbitrary emission sequences.

use proptest::prelude::*;
use ripple_reactive::Reactive;
use std::cell::RefCell;
use std::rc::Rc;

fn record<T: Clone + 'static>(
    r: &Reactive<T>,
) -> (Rc<RefCell<Vec<T>>>, ripple_reactive::Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let sub = r.subscribe(move |v| s.borrow_mut().push(v.clone()));
    (seen, sub)
}

proptest! {
    /// Mapping twice is the same as mapping the composed function.
    #[test]
    fn map_composes(initial in -1000i64..1000, values in prop::collection::vec(-1000i64..1000, 0..32)) {
        let source = Reactive::new(initial);
        let staged = source.map(|v| v + 3).map(|v| v * 2);
        let fused = source.map(|v| (v + 3) * 2);

        let (seen_staged, _a) = record(&staged);
        let (seen_fused, _b) = record(&fused);

        for v in &values {
            source.set(*v);
        }
        prop_assert_eq!(&*seen_staged.borrow(), &*seen_fused.borrow());
    }

    /// The last value written is always the value read back.
    #[test]
    fn get_returns_last_set(initial in any::<i64>(), values in prop::collection::vec(any::<i64>(), 0..32)) {
        let source = Reactive::new(initial);
        for v in &values {
            source.set(*v);
        }
        let expected = values.last().copied().unwrap_or(initial);
        prop_assert_eq!(source.get(), Some(expected));
    }

    /// A filtered node emits exactly the passing values, in order, with the
    /// initial value counted when it passes.
    #[test]
    fn filter_passes_exactly_matching_values(initial in -100i64..100, values in prop::collection::vec(-100i64..100, 0..32)) {
        let source = Reactive::new(initial);
        let evens = source.filter(|v| v % 2 == 0);
        let (seen, _sub) = record(&evens);

        for v in &values {
            source.set(*v);
        }

        let mut expected: Vec<i64> = Vec::new();
        if initial % 2 == 0 {
            expected.push(initial);
        }
        expected.extend(values.iter().copied().filter(|v| v % 2 == 0));
        prop_assert_eq!(&*seen.borrow(), &expected);
    }

    /// Distinct collapses consecutive duplicates and nothing else.
    #[test]
    fn distinct_collapses_runs(initial in 0i64..4, values in prop::collection::vec(0i64..4, 0..48)) {
        let source = Reactive::new(initial);
        let deduped = source.distinct();
        let (seen, _sub) = record(&deduped);

        for v in &values {
            source.set(*v);
        }

        let mut expected = vec![initial];
        for v in &values {
            if expected.last() != Some(v) {
                expected.push(*v);
            }
        }
        prop_assert_eq!(&*seen.borrow(), &expected);
    }

    /// Scan over addition replays the running sum of all emissions.
    #[test]
    fn scan_accumulates_every_emission(values in prop::collection::vec(-50i64..50, 0..32)) {
        let source = Reactive::new(0i64);
        let sums = source.scan(0i64, |acc, v| acc + v);
        let (seen, _sub) = record(&sums);

        for v in &values {
            source.set(*v);
        }

        // The seed is the node's starting state, delivered on subscribe.
        let mut expected = vec![0i64];
        let mut acc = 0i64;
        for v in &values {
            acc += v;
            expected.push(acc);
        }
        prop_assert_eq!(&*seen.borrow(), &expected);
    }

    /// Zip pairs the i-th emission of each side, regardless of interleaving.
    #[test]
    fn zip_pairs_positionally(
        left in prop::collection::vec(-100i64..100, 0..16),
        right in prop::collection::vec(-100i64..100, 0..16),
        interleave in any::<bool>(),
    ) {
        let a = Reactive::new(0i64);
        let b = Reactive::new(0i64);
        let zipped = a.zip(&b);
        let (seen, _sub) = record(&zipped);

        if interleave {
            let mut la = left.iter();
            let mut lb = right.iter();
            loop {
                match (la.next(), lb.next()) {
                    (None, None) => break,
                    (va, vb) => {
                        if let Some(v) = va { a.set(*v); }
                        if let Some(v) = vb { b.set(*v); }
                    }
                }
            }
        } else {
            for v in &left { a.set(*v); }
            for v in &right { b.set(*v); }
        }

        let expected: Vec<(i64, i64)> = left.iter().zip(right.iter()).map(|(x, y)| (*x, *y)).collect();
        prop_assert_eq!(&*seen.borrow(), &expected);
    }
}
