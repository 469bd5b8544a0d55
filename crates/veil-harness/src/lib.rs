#![forbid(unsafe_code)]

//! Deterministic host fakes for Veil tests and demos.
//!
//! - [`ManualScheduler`]: virtual clock; timers fire only when time advances.
//! - [`FakeWindow`]: fragment history with queued `hashchange` delivery.
//! - [`FakeDocument`]: elements in document order with Tab navigation.
//! - [`EventCapture`]: tracing layer for asserting on emitted events.

pub mod capture;
pub mod document;
pub mod scheduler;
pub mod window;

use std::rc::Rc;

use veil_core::{Scheduler, Window};
use web_time::Duration;

pub use capture::{CapturedEvent, EventCapture};
pub use document::{FakeDocument, FakeElement};
pub use scheduler::ManualScheduler;
pub use window::{FakeWindow, normalize_fragment};

/// Upper bound on callbacks run by [`FakeHost::settle`].
pub const SETTLE_LIMIT: usize = 1_000;

/// A scheduler and a window sharing one simulated event loop.
#[derive(Debug, Clone)]
pub struct FakeHost {
    pub scheduler: Rc<ManualScheduler>,
    pub window: Rc<FakeWindow>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self::with_window(FakeWindow::new())
    }

    pub fn with_window(window: FakeWindow) -> Self {
        Self {
            scheduler: Rc::new(ManualScheduler::new()),
            window: Rc::new(window),
        }
    }

    pub fn scheduler_handle(&self) -> Rc<dyn Scheduler> {
        self.scheduler.clone()
    }

    pub fn window_handle(&self) -> Rc<dyn Window> {
        self.window.clone()
    }

    /// Deliver queued window events, then advance the clock by `by`.
    pub fn step(&self, by: Duration) -> usize {
        let events = self.window.dispatch_pending();
        events + self.scheduler.advance(by)
    }

    /// Alternate event delivery and timers until both queues are empty.
    /// Returns the number of events and callbacks run.
    pub fn settle(&self) -> usize {
        let mut ran = 0;
        loop {
            let events = self.window.dispatch_pending();
            let timers = self.scheduler.run_until_idle(1);
            ran += events + timers;
            if (events == 0 && timers == 0) || ran >= SETTLE_LIMIT {
                return ran;
            }
        }
    }
}
