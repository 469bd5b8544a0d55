#![forbid(unsafe_code)]

//! Virtual-clock scheduler.
//!
//! [`ManualScheduler`] never fires on its own. Tests move time forward with
//! [`advance`](ManualScheduler::advance) and due timers run in deadline
//! order (ties in scheduling order). Callbacks may schedule or cancel other
//! timers; those scheduled within the advanced window also fire.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use veil_core::{Scheduler, TimerCallback, TimerId};
use web_time::Duration;

/// Deterministic [`Scheduler`] driven by explicit time advancement.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    scheduled_total: Cell<u64>,
    fired_total: Cell<u64>,
    /// Keyed by (deadline, id); ids grow monotonically so ties keep order.
    queue: RefCell<BTreeMap<(Duration, TimerId), TimerCallback>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("pending", &self.pending_count())
            .field("scheduled_total", &self.scheduled_total.get())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of timers waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Number of `schedule` calls so far.
    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total.get()
    }

    /// Number of callbacks run so far.
    pub fn fired_total(&self) -> u64 {
        self.fired_total.get()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.borrow().keys().next().map(|(due, _)| *due)
    }

    /// Delays (relative to now) of every pending timer, earliest first.
    pub fn pending_delays(&self) -> Vec<Duration> {
        let now = self.now.get();
        self.queue
            .borrow()
            .keys()
            .map(|(due, _)| due.saturating_sub(now))
            .collect()
    }

    /// Move the clock forward by `by`, running every timer that comes due.
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut fired = 0;
        while let Some(callback) = self.pop_due(target) {
            callback();
            fired += 1;
        }
        self.now.set(target);
        fired
    }

    /// Run timers until none remain, advancing the clock to each deadline.
    /// Stops after `max_steps` callbacks to catch runaway rescheduling.
    pub fn run_until_idle(&self, max_steps: usize) -> usize {
        let mut fired = 0;
        while fired < max_steps {
            let Some(due) = self.next_deadline() else {
                break;
            };
            if due > self.now.get() {
                self.now.set(due);
            }
            match self.pop_due(due) {
                Some(callback) => {
                    callback();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    fn pop_due(&self, limit: Duration) -> Option<TimerCallback> {
        let mut queue = self.queue.borrow_mut();
        let key = *queue.keys().next().filter(|(due, _)| *due <= limit)?;
        let callback = queue.remove(&key)?;
        drop(queue);
        if key.0 > self.now.get() {
            self.now.set(key.0);
        }
        self.fired_total.set(self.fired_total.get() + 1);
        Some(callback)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.scheduled_total.set(self.scheduled_total.get() + 1);
        let due = self.now.get() + delay;
        self.queue.borrow_mut().insert((due, id), callback);
        id
    }

    fn cancel(&self, id: TimerId) {
        self.queue.borrow_mut().retain(|(_, timer), _| *timer != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30, "c"), (10, "a"), (20, "b")] {
            let log = Rc::clone(&log);
            scheduler.schedule(ms(delay), Box::new(move || log.borrow_mut().push(tag)));
        }
        assert_eq!(scheduler.advance(ms(25)), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(scheduler.now(), ms(25));
        assert_eq!(scheduler.pending_delays(), vec![ms(5)]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let scheduler = ManualScheduler::new();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        let id = scheduler.schedule(ms(5), Box::new(move || h.set(true)));
        scheduler.cancel(id);
        scheduler.advance(ms(100));
        assert!(!hit.get());
        assert_eq!(scheduler.fired_total(), 0);
    }

    #[test]
    fn callbacks_can_chain_within_window() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hit = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&scheduler);
        let h = Rc::clone(&hit);
        scheduler.schedule(
            ms(10),
            Box::new(move || {
                h.set(h.get() + 1);
                let h = Rc::clone(&h);
                s.schedule(ms(10), Box::new(move || h.set(h.get() + 1)));
            }),
        );
        assert_eq!(scheduler.advance(ms(20)), 2);
        assert_eq!(hit.get(), 2);
    }

    #[test]
    fn run_until_idle_jumps_clock() {
        let scheduler = ManualScheduler::new();
        scheduler.schedule(ms(300), Box::new(|| {}));
        assert_eq!(scheduler.run_until_idle(10), 1);
        assert_eq!(scheduler.now(), ms(300));
        assert_eq!(scheduler.pending_count(), 0);
    }
}
