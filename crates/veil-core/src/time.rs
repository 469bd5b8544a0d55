#![forbid(unsafe_code)]

//! Timer service capability.
//!
//! A [`Scheduler`] runs a single deferred callback after a delay and can
//! cancel it before it fires. Hosts provide the implementation: a browser
//! wraps `setTimeout`, a terminal runtime wraps its tick loop, and tests use
//! a virtual clock.
//!
//! [`TimerSlot`] is the per-instance holder that enforces "at most one
//! pending timer": arming a slot cancels whatever it held before.
//!
//! # Invariants
//!
//! - A cancelled timer never runs its callback.
//! - `TimerSlot::arm` leaves exactly one pending timer in the slot.
//! - `TimerSlot::disarm` is idempotent.

use std::fmt;

use web_time::Duration;

/// Callback executed when a timer fires.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Opaque handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Wrap a raw host timer handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host timer handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Schedule and cancel single delayed callbacks.
///
/// Implementations are single-threaded and use interior mutability. They
/// must never run a callback from inside `schedule`, and must not hold
/// internal borrows while running a callback: callbacks are allowed to
/// schedule or cancel other timers.
pub trait Scheduler {
    /// Run `callback` once after `delay`.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

/// Single-slot holder for the one pending timer of an instance.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<TimerId>,
}

impl TimerSlot {
    /// Create an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Cancel any pending timer and schedule `callback` in its place.
    pub fn arm(&mut self, scheduler: &dyn Scheduler, delay: Duration, callback: TimerCallback) {
        self.disarm(scheduler);
        self.pending = Some(scheduler.schedule(delay, callback));
    }

    /// Cancel the pending timer, if any.
    pub fn disarm(&mut self, scheduler: &dyn Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }

    /// Forget the pending id without cancelling. Called from inside the
    /// callback once the timer has fired.
    pub fn mark_fired(&mut self) {
        self.pending = None;
    }

    /// The id of the pending timer, if any.
    #[must_use]
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    /// True while a timer is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingScheduler {
        next: Cell<u64>,
        scheduled: RefCell<Vec<(TimerId, Duration)>>,
        cancelled: RefCell<Vec<TimerId>>,
    }

    impl Scheduler for RecordingScheduler {
        fn schedule(&self, delay: Duration, _callback: TimerCallback) -> TimerId {
            let id = TimerId::new(self.next.get());
            self.next.set(self.next.get() + 1);
            self.scheduled.borrow_mut().push((id, delay));
            id
        }

        fn cancel(&self, id: TimerId) {
            self.cancelled.borrow_mut().push(id);
        }
    }

    #[test]
    fn arm_replaces_pending_timer() {
        let scheduler = Rc::new(RecordingScheduler::default());
        let mut slot = TimerSlot::new();
        slot.arm(scheduler.as_ref(), Duration::from_millis(10), Box::new(|| {}));
        slot.arm(scheduler.as_ref(), Duration::from_millis(20), Box::new(|| {}));

        assert_eq!(scheduler.scheduled.borrow().len(), 2);
        assert_eq!(*scheduler.cancelled.borrow(), vec![TimerId::new(0)]);
        assert_eq!(slot.pending(), Some(TimerId::new(1)));
    }

    #[test]
    fn disarm_is_idempotent() {
        let scheduler = RecordingScheduler::default();
        let mut slot = TimerSlot::new();
        slot.arm(&scheduler, Duration::ZERO, Box::new(|| {}));
        slot.disarm(&scheduler);
        slot.disarm(&scheduler);
        assert_eq!(scheduler.cancelled.borrow().len(), 1);
        assert!(!slot.is_armed());
    }

    #[test]
    fn mark_fired_forgets_without_cancelling() {
        let scheduler = RecordingScheduler::default();
        let mut slot = TimerSlot::new();
        slot.arm(&scheduler, Duration::ZERO, Box::new(|| {}));
        slot.mark_fired();
        assert!(!slot.is_armed());
        slot.disarm(&scheduler);
        assert!(scheduler.cancelled.borrow().is_empty());
    }

    #[test]
    fn timer_id_display() {
        assert_eq!(TimerId::new(7).to_string(), "timer#7");
    }
}
