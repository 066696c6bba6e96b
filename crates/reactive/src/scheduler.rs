//! Cooperative virtual-time scheduler backing the timing operators.
//!
//! Time only moves when the caller advances it, so timing behaviour is
//! fully deterministic: `advance(ms)` runs every task whose due time falls
//! inside the window, in (due time, schedule order) order, with the clock
//! set to each task's due time while it runs.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::RefCell;

/// Opaque handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

struct SchedulerState {
    now: u64,
    next_seq: u64,
    // Keyed by (due, seq): ready-order tie-breaks by scheduling order.
    queue: BTreeMap<(u64, u64), Box<dyn FnOnce()>>,
}

/// Shared handle to a single-threaded virtual clock and task queue.
#[derive(Clone)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            state: Rc::new(RefCell::new(SchedulerState {
                now: 0,
                next_seq: 0,
                queue: BTreeMap::new(),
            })),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Enqueues `task` to run `delay_ms` after the current virtual time.
    /// A zero delay still waits for the next `advance` call.
    pub fn schedule(&self, delay_ms: u64, task: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now.saturating_add(delay_ms);
        state.queue.insert((due, seq), Box::new(task));
        TimerId(seq)
    }

    /// Removes a pending task. Cancelling an already-fired or unknown timer
    /// is a no-op.
    pub fn cancel(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        let key = state
            .queue
            .keys()
            .find(|(_, seq)| *seq == id.0)
            .copied();
        if let Some(key) = key {
            state.queue.remove(&key);
        }
    }

    /// Moves the clock forward by `ms`, running every task due in the
    /// window. Tasks scheduled by running tasks also run if they fall due
    /// before the window closes.
    pub fn advance(&self, ms: u64) {
        let target = self.state.borrow().now.saturating_add(ms);
        self.advance_to(target);
    }

    /// Moves the clock to the absolute time `target` (never backwards).
    pub fn advance_to(&self, target: u64) {
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                match state.queue.keys().next().copied() {
                    Some(key) if key.0 <= target => {
                        state.now = key.0;
                        state.queue.remove(&key)
                    }
                    _ => None,
                }
            };
            match next {
                // Run outside the borrow: tasks may schedule or cancel.
                Some(task) => task(),
                None => break,
            }
        }
        let mut state = self.state.borrow_mut();
        if target > state.now {
            state.now = target;
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new()
    }
}
