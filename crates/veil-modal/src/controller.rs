#![forbid(unsafe_code)]

//! Modal state machine.
//!
//! [`ModalController`] owns one dialog's lifecycle. It stages transitions
//! with timers, mirrors visibility in the URL fragment when a hash is
//! configured, closes on Escape, restores focus to the trigger, and
//! publishes its close function on a [`CloseChannel`].
//!
//! # Example
//!
//! ```ignore
//! let host = ModalHost::new(scheduler, window);
//! let modal = ModalController::mount(
//!     ModalOptions::new().trigger(focus_ref(&button)).hash("settings"),
//!     &host,
//! );
//! button.on_click(modal.handle().toggle_fn());
//! ```
//!
//! # Invariants
//!
//! 1. **Single state**: exactly one [`ModalState`] holds at any instant.
//! 2. **Single timer**: at most one pending timer exists per controller;
//!    every state change cancels the previous one.
//! 3. **Idempotence**: `open()` while mounted/opening/open and `close()`
//!    while closing/closed are no-ops.
//! 4. **Focus restoration**: each close restores focus to the trigger
//!    exactly once, synchronously inside `close()`.
//! 5. **Hash authority**: with a hash configured, hash changes drive state;
//!    `open()` navigates to the fragment and `close()` strips it without
//!    pushing a history entry.
//! 6. **Teardown**: after drop no timer callback, listener, or close request
//!    reaches the controller.
//!
//! # Failure Modes
//!
//! - Hosts without navigation or listener APIs: hash sync and Escape are
//!   skipped; `open()` falls back to a direct transition.
//! - A dropped trigger element: focus restoration is skipped.
//! - A stale timer firing after a newer transition: detected by generation
//!   and ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;
use veil_core::{
    HeadlessWindow, KeyEvent, ListenerGuard, Scheduler, TimerSlot, TriggerRef, Window,
    WindowEvent, WindowEventKind, focus_weak,
};
use web_time::Duration;

use crate::close_channel::{CloseChannel, CloseFn};
use crate::config::{ModalOptions, NEXT_TICK, effective_delay};
use crate::focus_trap::FocusTrap;
use crate::hash::{HashBridge, HashRoute};
use crate::state::{Lifecycle, ModalState};
use crate::view::ModalView;

/// Host capabilities a controller runs against.
#[derive(Clone)]
pub struct ModalHost {
    scheduler: Rc<dyn Scheduler>,
    window: Rc<dyn Window>,
}

impl ModalHost {
    pub fn new(scheduler: Rc<dyn Scheduler>, window: Rc<dyn Window>) -> Self {
        Self { scheduler, window }
    }

    /// Host with timers but no navigation or window listeners.
    pub fn headless(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::new(scheduler, Rc::new(HeadlessWindow))
    }
}

impl fmt::Debug for ModalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHost").finish_non_exhaustive()
    }
}

/// Observer of state transitions, called with `(from, to)`.
type TransitionFn = dyn Fn(ModalState, ModalState);

/// Keeps a transition observer registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    _guard: Rc<TransitionFn>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Deferred step scheduled on the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    BeginOpening,
    FinishOpening,
    FinishClosing,
}

impl Step {
    fn source_state(self) -> ModalState {
        match self {
            Self::BeginOpening => ModalState::Mounted,
            Self::FinishOpening => ModalState::Opening,
            Self::FinishClosing => ModalState::Closing,
        }
    }

    fn target_state(self) -> ModalState {
        match self {
            Self::BeginOpening => ModalState::Opening,
            Self::FinishOpening => ModalState::Open,
            Self::FinishClosing => ModalState::Closed,
        }
    }
}

struct Core {
    state: ModalState,
    lifecycle: Lifecycle,
    configured: Duration,
    reduced_motion: bool,
    trigger: Option<TriggerRef>,
    timer: TimerSlot,
    /// Bumped on every state change and on teardown; timers carry the value
    /// they were armed with.
    generation: u64,
    torn_down: bool,
}

impl Core {
    fn delay(&self) -> Duration {
        effective_delay(self.configured, self.reduced_motion)
    }
}

struct Shared {
    core: RefCell<Core>,
    scheduler: Rc<dyn Scheduler>,
    bridge: Option<HashBridge>,
    channel: CloseChannel,
    /// The closure this instance last wrote into `channel`.
    published: RefCell<Option<CloseFn>>,
    trap: RefCell<Option<FocusTrap>>,
    observers: RefCell<Vec<Weak<TransitionFn>>>,
    listeners: RefCell<Vec<ListenerGuard>>,
}

impl Shared {
    fn state(&self) -> ModalState {
        self.core.borrow().state
    }

    fn is_torn_down(&self) -> bool {
        self.core.borrow().torn_down
    }

    /// Commit a state change, cancelling any pending timer. Returns the
    /// previous state and the new generation.
    fn commit(&self, to: ModalState) -> Option<(ModalState, u64)> {
        let mut core = self.core.borrow_mut();
        if core.torn_down {
            return None;
        }
        core.timer.disarm(self.scheduler.as_ref());
        let from = core.state;
        core.state = to;
        core.generation += 1;
        Some((from, core.generation))
    }

    /// Schedule `step` unless another transition happened since `generation`.
    fn arm(self: &Rc<Self>, generation: u64, delay: Duration, step: Step) {
        let mut core = self.core.borrow_mut();
        if core.torn_down || core.generation != generation {
            return;
        }
        let weak = Rc::downgrade(self);
        core.timer.arm(
            self.scheduler.as_ref(),
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.fire(generation, step);
                }
            }),
        );
    }

    fn fire(self: &Rc<Self>, generation: u64, step: Step) {
        let current = {
            let mut core = self.core.borrow_mut();
            let current = !core.torn_down
                && core.generation == generation
                && core.state == step.source_state();
            if current {
                core.timer.mark_fired();
            }
            current
        };
        if !current {
            debug!(message = "modal.timer.stale", step = ?step);
            return;
        }
        let Some((from, generation)) = self.commit(step.target_state()) else {
            return;
        };
        if step == Step::BeginOpening {
            let delay = self.core.borrow().delay();
            self.arm(generation, delay, Step::FinishOpening);
        }
        self.announce(generation, from, step.target_state());
    }

    fn request_open(self: &Rc<Self>) {
        if self.is_torn_down() {
            return;
        }
        let state = self.state();
        if !state.wants_open() {
            debug!(message = "modal.open.noop", state = state.as_str());
            return;
        }
        if let Some(bridge) = &self.bridge
            && bridge.is_current() == Some(false)
            && bridge.write()
        {
            // The hash-change listener performs the transition.
            return;
        }
        self.begin_open();
    }

    fn begin_open(self: &Rc<Self>) {
        let (state, lifecycle) = {
            let core = self.core.borrow();
            (core.state, core.lifecycle)
        };
        if !state.wants_open() {
            debug!(message = "modal.open.noop", state = state.as_str());
            return;
        }
        match lifecycle {
            Lifecycle::Staged => {
                let Some((from, generation)) = self.commit(ModalState::Mounted) else {
                    return;
                };
                self.arm(generation, NEXT_TICK, Step::BeginOpening);
                self.announce(generation, from, ModalState::Mounted);
            }
            Lifecycle::Simple => {
                let Some((from, generation)) = self.commit(ModalState::Open) else {
                    return;
                };
                self.announce(generation, from, ModalState::Open);
            }
        }
    }

    fn request_close(self: &Rc<Self>) {
        if self.is_torn_down() {
            return;
        }
        let (state, lifecycle) = {
            let core = self.core.borrow();
            (core.state, core.lifecycle)
        };
        if matches!(state, ModalState::Closed | ModalState::Closing) {
            debug!(message = "modal.close.noop", state = state.as_str());
            return;
        }

        if let Some(bridge) = &self.bridge {
            bridge.clear_if_current();
        }

        let to = match lifecycle {
            Lifecycle::Staged => ModalState::Closing,
            Lifecycle::Simple => ModalState::Closed,
        };
        let Some((from, generation)) = self.commit(to) else {
            return;
        };

        self.restore_focus();

        if lifecycle == Lifecycle::Staged {
            let delay = self.core.borrow().delay();
            self.arm(generation, delay, Step::FinishClosing);
        }
        self.announce(generation, from, to);
    }

    fn restore_focus(&self) {
        let trigger = self.core.borrow().trigger.clone();
        if let Some(trigger) = trigger {
            let restored = focus_weak(&trigger);
            debug!(message = "modal.focus.restore", restored);
        }
    }

    fn on_hash_change(self: &Rc<Self>, fragment: &str) {
        let Some(bridge) = &self.bridge else {
            return;
        };
        let matches = bridge
            .is_current()
            .unwrap_or_else(|| bridge.route().matches(fragment));
        debug!(
            message = "modal.hash.sync",
            fragment,
            route = bridge.route().fragment(),
            matches
        );
        if matches {
            self.begin_open();
        } else {
            self.request_close();
        }
    }

    /// Tell the focus trap and observers about a transition, unless a newer
    /// transition already superseded it.
    fn announce(&self, generation: u64, from: ModalState, to: ModalState) {
        {
            let core = self.core.borrow();
            if core.torn_down || core.generation != generation || from == to {
                return;
            }
        }
        debug!(
            message = "modal.transition",
            from = from.as_str(),
            to = to.as_str()
        );
        let trap = self.trap.borrow().clone();
        if let Some(trap) = trap {
            trap.sync(to);
        }
        let callbacks: Vec<Rc<TransitionFn>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|w| w.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(from, to);
        }
    }

    fn publish_close(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let close: CloseFn = Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.request_close();
            }
        });
        *self.published.borrow_mut() = Some(Rc::clone(&close));
        self.channel.register(close);
    }

    fn teardown(&self) {
        {
            let mut core = self.core.borrow_mut();
            if core.torn_down {
                return;
            }
            core.torn_down = true;
            core.generation += 1;
            core.timer.disarm(self.scheduler.as_ref());
        }
        let guards = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(guards);
        // A newer instance may have taken over a shared channel.
        let published = self.published.borrow_mut().take();
        if let Some(close) = published {
            self.channel.clear_if(&close);
        }
        self.observers.borrow_mut().clear();
        self.trap.borrow_mut().take();
        debug!(message = "modal.teardown");
    }
}

/// One mounted dialog instance.
///
/// Dropping the controller tears it down: the pending timer is cancelled,
/// window listeners are removed, and the close channel is emptied.
pub struct ModalController {
    shared: Rc<Shared>,
}

impl fmt::Debug for ModalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.borrow();
        f.debug_struct("ModalController")
            .field("state", &core.state)
            .field("lifecycle", &core.lifecycle)
            .field("delay", &core.delay())
            .field("route", &self.route())
            .field("timer_armed", &core.timer.is_armed())
            .finish()
    }
}

impl ModalController {
    /// Mount a dialog with a fresh close channel.
    pub fn mount(options: ModalOptions, host: &ModalHost) -> Self {
        Self::mount_with_channel(options, host, CloseChannel::new())
    }

    /// Mount a dialog publishing its close function on `channel`.
    ///
    /// With a hash configured and the fragment already matching, the dialog
    /// starts opening immediately (deep link).
    pub fn mount_with_channel(options: ModalOptions, host: &ModalHost, channel: CloseChannel) -> Self {
        let bridge = options
            .route()
            .map(|route| HashBridge::new(route, Rc::clone(&host.window)));
        let shared = Rc::new(Shared {
            core: RefCell::new(Core {
                state: ModalState::Closed,
                lifecycle: options.lifecycle,
                configured: options.configured_duration(),
                reduced_motion: options.prefers_reduced_motion,
                trigger: options.trigger,
                timer: TimerSlot::new(),
                generation: 0,
                torn_down: false,
            }),
            scheduler: Rc::clone(&host.scheduler),
            bridge,
            channel,
            published: RefCell::new(None),
            trap: RefCell::new(None),
            observers: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        });

        shared.publish_close();

        let weak = Rc::downgrade(&shared);
        let on_key_up = Rc::new(move |event: &WindowEvent| {
            if let WindowEvent::KeyUp(key) = event
                && key.is_escape_release()
                && let Some(shared) = weak.upgrade()
            {
                shared.request_close();
            }
        });
        attach(&shared, &host.window, WindowEventKind::KeyUp, on_key_up);

        if shared.bridge.is_some() {
            let weak = Rc::downgrade(&shared);
            let on_hash_change = Rc::new(move |event: &WindowEvent| {
                if let WindowEvent::HashChange { fragment } = event
                    && let Some(shared) = weak.upgrade()
                {
                    shared.on_hash_change(fragment);
                }
            });
            attach(&shared, &host.window, WindowEventKind::HashChange, on_hash_change);

            let deep_linked = shared
                .bridge
                .as_ref()
                .and_then(HashBridge::is_current)
                .unwrap_or(false);
            if deep_linked {
                shared.begin_open();
            }
        }

        Self { shared }
    }

    /// Request opening. With a hash configured this navigates to the
    /// fragment and lets the hash-change event drive the transition.
    pub fn open(&self) {
        self.shared.request_open();
    }

    /// Request closing. Alias: [`on_close`](Self::on_close).
    pub fn close(&self) {
        self.shared.request_close();
    }

    /// Same as [`close`](Self::close); the name presentational bindings use.
    pub fn on_close(&self) {
        self.close();
    }

    /// Open when closed or closing, close otherwise.
    pub fn toggle(&self) {
        toggle(&self.shared);
    }

    /// Route an Escape release delivered outside window listeners.
    /// Returns whether it started a close.
    pub fn handle_key(&self, key: &KeyEvent) -> bool {
        if !key.is_escape_release() {
            return false;
        }
        let before = self.state();
        self.close();
        before != self.state()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModalState {
        self.shared.state()
    }

    /// Whether the dialog should be rendered (any state but `Closed`).
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Delay used for the opening and closing transitions.
    pub fn effective_delay(&self) -> Duration {
        self.shared.core.borrow().delay()
    }

    /// The configured hash route, if any.
    pub fn route(&self) -> Option<&HashRoute> {
        self.shared.bridge.as_ref().map(HashBridge::route)
    }

    /// The close channel this dialog publishes on.
    pub fn close_channel(&self) -> CloseChannel {
        self.shared.channel.clone()
    }

    /// A weak handle for wiring buttons and callbacks.
    pub fn handle(&self) -> ModalHandle {
        ModalHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Snapshot for the presentational layer.
    pub fn view(&self) -> ModalView {
        let core = self.shared.core.borrow();
        ModalView::new(core.state, core.reduced_motion, core.delay())
    }

    /// Whether a transition timer is pending.
    pub fn has_pending_timer(&self) -> bool {
        self.shared.core.borrow().timer.is_armed()
    }

    /// Let `trap` follow this dialog's state. Syncs immediately.
    pub fn bind_focus_trap(&self, trap: FocusTrap) {
        let state = self.state();
        *self.shared.trap.borrow_mut() = Some(trap.clone());
        trap.sync(state);
    }

    /// Observe every transition as `(from, to)`.
    pub fn on_transition(&self, f: impl Fn(ModalState, ModalState) + 'static) -> Subscription {
        let strong: Rc<TransitionFn> = Rc::new(f);
        self.shared
            .observers
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Called once the dialog is fully open.
    pub fn on_open(&self, f: impl Fn() + 'static) -> Subscription {
        self.on_transition(move |_, to| {
            if to == ModalState::Open {
                f();
            }
        })
    }

    /// Called when a close begins.
    pub fn on_close_started(&self, f: impl Fn() + 'static) -> Subscription {
        self.on_transition(move |from, to| {
            let started = to == ModalState::Closing
                || (to == ModalState::Closed && from != ModalState::Closing);
            if started {
                f();
            }
        })
    }

    /// Called once the dialog is fully closed.
    pub fn on_close_complete(&self, f: impl Fn() + 'static) -> Subscription {
        self.on_transition(move |_, to| {
            if to == ModalState::Closed {
                f();
            }
        })
    }

    /// Update the transition duration. Affects the next scheduled step.
    pub fn set_transition_duration(&self, duration: Duration) {
        self.shared.core.borrow_mut().configured = duration;
        self.shared.publish_close();
    }

    /// Update the reduced-motion preference.
    pub fn set_prefers_reduced_motion(&self, reduced: bool) {
        self.shared.core.borrow_mut().reduced_motion = reduced;
        self.shared.publish_close();
    }

    /// Replace the element refocused on close.
    pub fn set_trigger(&self, trigger: Option<TriggerRef>) {
        self.shared.core.borrow_mut().trigger = trigger;
        self.shared.publish_close();
    }

    /// Tear down explicitly. Equivalent to dropping the controller.
    pub fn unmount(self) {}
}

impl Drop for ModalController {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

fn toggle(shared: &Rc<Shared>) {
    if shared.state().wants_open() {
        shared.request_open();
    } else {
        shared.request_close();
    }
}

fn attach(
    shared: &Shared,
    window: &Rc<dyn Window>,
    kind: WindowEventKind,
    listener: Rc<dyn Fn(&WindowEvent)>,
) {
    match ListenerGuard::attach(window, kind, listener) {
        Ok(guard) => shared.listeners.borrow_mut().push(guard),
        Err(err) => debug!(message = "modal.env.unavailable", kind = ?kind, error = %err),
    }
}

/// Weak, cloneable handle to a controller.
///
/// Every method is a no-op (and queries report `Closed`) once the
/// controller has been dropped.
#[derive(Clone)]
pub struct ModalHandle {
    shared: Weak<Shared>,
}

impl fmt::Debug for ModalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHandle")
            .field("state", &self.state())
            .finish()
    }
}

impl ModalHandle {
    fn live(&self) -> Option<Rc<Shared>> {
        self.shared.upgrade().filter(|shared| !shared.is_torn_down())
    }

    pub fn open(&self) {
        if let Some(shared) = self.live() {
            shared.request_open();
        }
    }

    pub fn close(&self) {
        if let Some(shared) = self.live() {
            shared.request_close();
        }
    }

    pub fn toggle(&self) {
        if let Some(shared) = self.live() {
            toggle(&shared);
        }
    }

    pub fn state(&self) -> ModalState {
        self.live()
            .map_or(ModalState::Closed, |shared| shared.state())
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// `toggle` as a callback for click bindings.
    pub fn toggle_fn(&self) -> impl Fn() + 'static {
        let handle = self.clone();
        move || handle.toggle()
    }

    /// `close` as a callback for click bindings.
    pub fn close_fn(&self) -> impl Fn() + 'static {
        let handle = self.clone();
        move || handle.close()
    }
}
