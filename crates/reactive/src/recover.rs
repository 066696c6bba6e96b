//! Error-recovery operators: retry and catch_error.

use crate::error::OperatorError;
use crate::reactive::{Reactive, WeakReactive};
use crate::subscription::Subscription;
use alloc::rc::Rc;
use core::cell::Cell;

impl<A: Clone + 'static> Reactive<A> {
    /// Re-subscribes to the source after an error, up to `max_attempts`
    /// times, before letting the error through.
    ///
    /// Attempts are cumulative across the node's lifetime; a successful
    /// value between failures does not reset the count. Each re-attach
    /// treats the source's current value as a fresh starting emission.
    pub fn retry(&self, max_attempts: u32) -> Reactive<A> {
        let out = Reactive::derived(self.get());
        let attempts: Rc<Cell<u32>> = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));

        attach_retry(self, &out.downgrade(), &attempts, max_attempts, &slot, false);

        let cleanup = slot;
        out.hold(Subscription::new(move || {
            if let Some(sub) = cleanup.take() {
                sub.unsubscribe();
            }
        }));
        out
    }

    /// Switches to a fallback stream produced by `handler` when the source
    /// errors. The primary subscription ends at the first error; from then
    /// on the fallback drives the node, current value included.
    pub fn catch_error(
        &self,
        handler: impl Fn(&OperatorError) -> Reactive<A> + 'static,
    ) -> Reactive<A> {
        let out = Reactive::derived(self.get());
        let primary: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let fallback: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));

        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let primary_slot = primary.clone();
        let fallback_slot = fallback.clone();
        let sub = self.watch(
            move |v| {
                if let Some(out) = weak.upgrade() {
                    out.set(v.clone());
                }
            },
            move |e| {
                if let Some(sub) = primary_slot.take() {
                    sub.unsubscribe();
                }
                let fb = handler(e);
                let weak = weak_err.clone();
                let weak_fb_err = weak_err.clone();
                fallback_slot.set(Some(fb.subscribe_with(
                    move |v| {
                        if let Some(out) = weak.upgrade() {
                            out.set(v.clone());
                        }
                    },
                    move |e| {
                        if let Some(out) = weak_fb_err.upgrade() {
                            out.fail(e.clone());
                        }
                    },
                )));
            },
        );
        primary.set(Some(sub));

        out.hold(Subscription::new(move || {
            if let Some(sub) = primary.take() {
                sub.unsubscribe();
            }
            if let Some(sub) = fallback.take() {
                sub.unsubscribe();
            }
        }));
        out
    }
}

/// Attaches (or re-attaches) the retry subscription. The first attach skips
/// the source's current value, since the derived node already seeded from
/// it; re-attaches forward it as the fresh start of the new attempt.
fn attach_retry<A: Clone + 'static>(
    source: &Reactive<A>,
    out: &WeakReactive<A>,
    attempts: &Rc<Cell<u32>>,
    max_attempts: u32,
    slot: &Rc<Cell<Option<Subscription>>>,
    resubscribe: bool,
) {
    let weak = out.clone();
    let weak_err = out.clone();
    let count = attempts.clone();
    let retry_slot = slot.clone();
    let retry_source = source.clone();

    let on_value = move |v: &A| {
        if let Some(out) = weak.upgrade() {
            out.set(v.clone());
        }
    };
    let on_error = move |e: &OperatorError| {
        let used = count.get();
        if used < max_attempts {
            count.set(used + 1);
            if let Some(old) = retry_slot.take() {
                old.unsubscribe();
            }
            attach_retry(
                &retry_source,
                &weak_err,
                &count,
                max_attempts,
                &retry_slot,
                true,
            );
        } else if let Some(out) = weak_err.upgrade() {
            out.fail(e.clone());
        }
    };

    let sub = if resubscribe {
        source.subscribe_with(on_value, on_error)
    } else {
        source.watch(on_value, on_error)
    };
    slot.set(Some(sub));
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn test_retry_swallows_errors_within_budget() {
        let source = Reactive::new(1);
        let retried = source.retry(2);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let e = errors.clone();
        let _sub = retried.subscribe_with(
            move |v| s.borrow_mut().push(*v),
            move |err: &OperatorError| e.borrow_mut().push(err.message().to_string()),
        );

        source.set(2);
        source.fail(OperatorError::new("boom"));
        // Re-attach forwards the source's current value as a fresh start.
        assert_eq!(*seen.borrow(), vec![1, 2, 2]);
        assert!(errors.borrow().is_empty());

        source.set(3);
        source.fail(OperatorError::new("boom again"));
        assert_eq!(*seen.borrow(), vec![1, 2, 2, 3, 3]);
        assert!(errors.borrow().is_empty());

        // Budget exhausted: the third error passes through.
        source.fail(OperatorError::new("final"));
        assert_eq!(*errors.borrow(), vec!["final".to_string()]);
    }

    #[test]
    fn test_retry_attempts_are_cumulative() {
        let source = Reactive::new(0);
        let retried = source.retry(1);

        let errors = Rc::new(RefCell::new(Vec::new()));
        let e = errors.clone();
        let _sub = retried.subscribe_with(
            |_| {},
            move |err: &OperatorError| e.borrow_mut().push(err.message().to_string()),
        );

        source.fail(OperatorError::new("first"));
        source.set(5); // success in between does not reset the count
        source.fail(OperatorError::new("second"));
        assert_eq!(*errors.borrow(), vec!["second".to_string()]);
    }

    #[test]
    fn test_catch_error_switches_to_fallback() {
        let source = Reactive::new(1);
        let fallback = Reactive::new(100);

        let fb = fallback.clone();
        let caught = source.catch_error(move |_| fb.clone());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = caught.subscribe(move |v| s.borrow_mut().push(*v));

        source.set(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);

        source.fail(OperatorError::new("down"));
        // Fallback's current value arrives, then its later emissions.
        assert_eq!(*seen.borrow(), vec![1, 2, 100]);

        fallback.set(101);
        assert_eq!(*seen.borrow(), vec![1, 2, 100, 101]);

        // The primary subscription ended at the error.
        source.set(3);
        assert_eq!(*seen.borrow(), vec![1, 2, 100, 101]);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_catch_error_handler_sees_the_error() {
        let source = Reactive::new(0);
        let messages: Rc<RefCell<VecDeque<alloc::string::String>>> =
            Rc::new(RefCell::new(VecDeque::new()));
        let m = messages.clone();
        let caught = source.catch_error(move |e| {
            m.borrow_mut().push_back(e.message().into());
            Reactive::new(-1)
        });
        let _sub = caught.subscribe(|_| {});

        source.fail(OperatorError::new("bad upstream"));
        assert_eq!(messages.borrow().front().map(|s| s.as_str()), Some("bad upstream"));
    }

    #[test]
    fn test_catch_error_drop_releases_fallback() {
        let source = Reactive::new(0);
        let fallback = Reactive::new(100);

        {
            let fb = fallback.clone();
            let caught = source.catch_error(move |_| fb.clone());
            let _sub = caught.subscribe(|_| {});
            source.fail(OperatorError::new("down"));
            assert_eq!(fallback.subscriber_count(), 1);
        }
        assert_eq!(fallback.subscriber_count(), 0);
    }
}
