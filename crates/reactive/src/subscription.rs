//! Subscription handles.

use alloc::boxed::Box;
use core::cell::Cell;

/// An idempotent unsubscribe capability.
///
/// Calling [`unsubscribe`](Subscription::unsubscribe) more than once is a
/// no-op, never an error. Dropping a `Subscription` without calling it does
/// **not** cancel anything; teardown is always explicit, or owned by the
/// node holding the handle.
pub struct Subscription {
    cancel: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Wraps a cancel action.
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Cell::new(Some(Box::new(cancel))),
        }
    }

    /// A handle that releases nothing.
    pub fn empty() -> Self {
        Self {
            cancel: Cell::new(None),
        }
    }

    /// Releases the resources this subscription uniquely owns, synchronously.
    pub fn unsubscribe(&self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Returns true if `unsubscribe` has already run (or there was nothing
    /// to release).
    #[inline]
    pub fn is_unsubscribed(&self) -> bool {
        // Cell<Option<..>> has no non-consuming read; take and put back.
        let cancel = self.cancel.take();
        let done = cancel.is_none();
        self.cancel.set(cancel);
        done
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;

    #[test]
    fn test_unsubscribe_runs_cancel_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = Subscription::new(move || c.set(c.get() + 1));

        assert!(!sub.is_unsubscribed());
        sub.unsubscribe();
        assert_eq!(count.get(), 1);
        assert!(sub.is_unsubscribed());

        // Idempotent: no second release
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_empty_subscription() {
        let sub = Subscription::empty();
        assert!(sub.is_unsubscribed());
        sub.unsubscribe(); // no-op
    }

    #[test]
    fn test_drop_does_not_cancel() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        {
            let _sub = Subscription::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 0);
    }
}
