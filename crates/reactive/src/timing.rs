//! Time-shifting operators built on the virtual-time [`Scheduler`].

use crate::reactive::Reactive;
use crate::scheduler::{Scheduler, TimerId};
use crate::subscription::Subscription;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

impl<A: Clone + 'static> Reactive<A> {
    /// Shifts each emission `delay_ms` into the virtual future, preserving
    /// emission order. A zero delay forwards synchronously. Errors are never
    /// delayed. Pending deliveries are cancelled when the node is dropped.
    pub fn delay(&self, scheduler: &Scheduler, delay_ms: u64) -> Reactive<A> {
        let out = Reactive::derived(None);
        let pending: Rc<RefCell<Vec<TimerId>>> = Rc::new(RefCell::new(Vec::new()));

        let weak = out.downgrade();
        let weak_err = out.downgrade();
        let sched = scheduler.clone();
        let timers = pending.clone();
        let sub = self.watch(
            move |v| {
                if delay_ms == 0 {
                    if let Some(out) = weak.upgrade() {
                        out.set(v.clone());
                    }
                    return;
                }
                let value = v.clone();
                let target = weak.clone();
                let prune = timers.clone();
                // Filled in right after scheduling; the task removes its own
                // id so the pending list only holds live timers.
                let own_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
                let own = own_id.clone();
                let id = sched.schedule(delay_ms, move || {
                    if let Some(id) = own.get() {
                        prune.borrow_mut().retain(|t| *t != id);
                    }
                    if let Some(out) = target.upgrade() {
                        out.set(value);
                    }
                });
                own_id.set(Some(id));
                timers.borrow_mut().push(id);
            },
            move |e| {
                if let Some(out) = weak_err.upgrade() {
                    out.fail(e.clone());
                }
            },
        );

        out.hold(sub);
        let sched = scheduler.clone();
        out.hold(Subscription::new(move || {
            for id in pending.borrow_mut().drain(..) {
                sched.cancel(id);
            }
        }));
        out
    }
}
