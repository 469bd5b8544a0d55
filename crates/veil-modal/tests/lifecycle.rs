#![forbid(unsafe_code)]

//! Staged lifecycle, focus restoration, reduced motion, and teardown.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use veil_core::{KeyCode, KeyEvent, Scheduler, TimerCallback, TimerId, WindowEventKind, focus_ref};
use veil_harness::{EventCapture, FakeDocument, FakeHost, ManualScheduler};
use veil_modal::{Lifecycle, ModalController, ModalHost, ModalOptions, ModalState, NEXT_TICK};
use web_time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn host() -> (FakeHost, ModalHost) {
    let fake = FakeHost::new();
    let host = ModalHost::new(fake.scheduler_handle(), fake.window_handle());
    (fake, host)
}

#[test]
fn open_twice_schedules_one_timer_chain() {
    let (fake, host) = host();
    let modal = ModalController::mount(ModalOptions::new(), &host);

    modal.open();
    modal.open();
    assert_eq!(modal.state(), ModalState::Mounted);
    assert_eq!(fake.scheduler.scheduled_total(), 1);

    fake.settle();
    modal.open();
    assert_eq!(modal.state(), ModalState::Open);
    // NEXT_TICK + the opening transition.
    assert_eq!(fake.scheduler.scheduled_total(), 2);
}

#[test]
fn staged_open_respects_next_tick_and_duration() {
    let (fake, host) = host();
    let modal =
        ModalController::mount(ModalOptions::new().transition_duration(ms(200)), &host);

    modal.toggle();
    assert_eq!(fake.scheduler.pending_delays(), vec![NEXT_TICK]);
    fake.scheduler.advance(ms(9));
    assert_eq!(modal.state(), ModalState::Mounted);
    fake.scheduler.advance(ms(1));
    assert_eq!(modal.state(), ModalState::Opening);
    fake.scheduler.advance(ms(199));
    assert_eq!(modal.state(), ModalState::Opening);
    fake.scheduler.advance(ms(1));
    assert_eq!(modal.state(), ModalState::Open);
    assert!(!modal.has_pending_timer());
}

#[test]
fn toggle_symmetry() {
    let (fake, host) = host();
    let modal = ModalController::mount(ModalOptions::new(), &host);

    modal.toggle();
    fake.settle();
    assert_eq!(modal.state(), ModalState::Open);
    assert!(modal.is_open());

    modal.toggle();
    assert_eq!(modal.state(), ModalState::Closing);
    assert!(modal.is_open());
    fake.scheduler.advance(ms(300));
    assert_eq!(modal.state(), ModalState::Closed);
    assert!(!modal.is_open());
}

#[test]
fn double_toggle_without_waiting_resolves_closed() {
    let (fake, host) = host();
    let modal = ModalController::mount(ModalOptions::new(), &host);

    modal.toggle();
    modal.toggle();
    assert_eq!(modal.state(), ModalState::Closing);
    assert_eq!(fake.scheduler.pending_count(), 1);
    fake.settle();
    assert_eq!(modal.state(), ModalState::Closed);
    assert_eq!(fake.scheduler.pending_count(), 0);
}

#[test]
fn close_restores_trigger_focus_synchronously_once() {
    let (fake, host) = host();
    let doc = FakeDocument::new();
    let trigger = doc.element("trigger");
    doc.element("elsewhere");
    let modal = ModalController::mount(
        ModalOptions::new()
            .trigger(focus_ref(&trigger))
            .transition_duration(ms(400)),
        &host,
    );

    modal.open();
    fake.settle();
    let before = fake.scheduler.now();

    modal.close();
    assert_eq!(doc.active().as_deref(), Some("trigger"));
    assert_eq!(fake.scheduler.now(), before);
    assert_eq!(modal.state(), ModalState::Closing);

    modal.close();
    fake.settle();
    modal.close();
    assert_eq!(trigger.focus_count(), 1);
}

#[test]
fn dropped_trigger_is_skipped() {
    let (fake, host) = host();
    let doc = FakeDocument::new();
    let modal = {
        let trigger = doc.element("trigger");
        ModalController::mount(ModalOptions::new().trigger(focus_ref(&trigger)), &host)
    };
    // The document holds the last strong reference to the trigger.
    drop(doc);

    modal.open();
    fake.settle();
    modal.close();
    fake.settle();
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn reduced_motion_skips_transition_wait() {
    let (fake, host) = host();
    let modal = ModalController::mount(
        ModalOptions::new()
            .transition_duration(ms(500))
            .prefers_reduced_motion(true),
        &host,
    );
    assert_eq!(modal.effective_delay(), Duration::ZERO);

    modal.open();
    fake.scheduler.advance(NEXT_TICK);
    assert_eq!(modal.state(), ModalState::Open);

    modal.close();
    fake.scheduler.advance(Duration::ZERO);
    assert_eq!(modal.state(), ModalState::Closed);
    assert!(fake.scheduler.now() < ms(500));
}

#[test]
fn reduced_motion_can_change_while_mounted() {
    let (fake, host) = host();
    let modal =
        ModalController::mount(ModalOptions::new().transition_duration(ms(500)), &host);
    let channel = modal.close_channel();

    modal.open();
    fake.settle();
    modal.set_prefers_reduced_motion(true);
    assert!(channel.is_ready());
    channel.request_close().unwrap();
    assert_eq!(fake.scheduler.pending_delays(), vec![Duration::ZERO]);
    fake.scheduler.advance(Duration::ZERO);
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn simple_lifecycle_never_schedules() {
    let (fake, host) = host();
    let modal = ModalController::mount(ModalOptions::new().lifecycle(Lifecycle::Simple), &host);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _sub = modal.on_transition(move |from, to| s.borrow_mut().push((from, to)));

    modal.toggle();
    modal.toggle();
    assert_eq!(fake.scheduler.scheduled_total(), 0);
    assert_eq!(
        *seen.borrow(),
        vec![
            (ModalState::Closed, ModalState::Open),
            (ModalState::Open, ModalState::Closed),
        ]
    );
}

#[test]
fn lifecycle_callbacks_fire_once_per_cycle() {
    let (fake, host) = host();
    let modal = ModalController::mount(ModalOptions::new(), &host);
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    let _open = modal.on_open(move || l.borrow_mut().push("open"));
    let l = Rc::clone(&log);
    let _started = modal.on_close_started(move || l.borrow_mut().push("close-started"));
    let l = Rc::clone(&log);
    let _done = modal.on_close_complete(move || l.borrow_mut().push("close-complete"));

    modal.open();
    fake.settle();
    modal.close();
    fake.settle();
    assert_eq!(*log.borrow(), vec!["open", "close-started", "close-complete"]);
}

#[test]
fn unmount_mid_closing_is_inert() {
    let (fake, host) = host();
    let doc = FakeDocument::new();
    let trigger = doc.element("trigger");
    let modal = ModalController::mount(ModalOptions::new().trigger(focus_ref(&trigger)), &host);
    let handle = modal.handle();
    let transitions = Rc::new(RefCell::new(0));
    let t = Rc::clone(&transitions);
    let _sub = modal.on_transition(move |_, _| *t.borrow_mut() += 1);

    modal.open();
    fake.settle();
    modal.close();
    assert_eq!(modal.state(), ModalState::Closing);
    let seen_before = *transitions.borrow();

    modal.unmount();
    assert_eq!(fake.scheduler.pending_count(), 0);
    assert_eq!(fake.window.listener_count(WindowEventKind::KeyUp), 0);

    fake.scheduler.advance(ms(1_000));
    fake.window.key_up(KeyEvent::release(KeyCode::Escape));
    handle.close();
    handle.toggle();
    assert_eq!(*transitions.borrow(), seen_before);
    assert_eq!(trigger.focus_count(), 1);
    assert_eq!(handle.state(), ModalState::Closed);
}

/// Scheduler whose `cancel` does nothing, so superseded timers still fire.
struct IgnoresCancel(ManualScheduler);

impl Scheduler for IgnoresCancel {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        self.0.schedule(delay, callback)
    }

    fn cancel(&self, _id: TimerId) {}
}

#[test]
fn superseded_timer_is_ignored_when_cancel_fails() {
    let scheduler = Rc::new(IgnoresCancel(ManualScheduler::new()));
    let host = ModalHost::headless(scheduler.clone());
    let modal = ModalController::mount(ModalOptions::new(), &host);
    let capture = EventCapture::new();
    let _guard = capture.install();

    modal.open();
    modal.close();
    scheduler.0.advance(NEXT_TICK);
    assert_eq!(modal.state(), ModalState::Closing);
    assert_eq!(capture.count("modal.timer.stale"), 1);

    scheduler.0.advance(ms(300));
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn emits_structured_events() {
    let (fake, host) = host();
    let capture = EventCapture::new();
    let _guard = capture.install();

    let modal = ModalController::mount(ModalOptions::new(), &host);
    modal.close();
    modal.open();
    modal.open();
    fake.settle();
    drop(modal);

    assert_eq!(capture.count("modal.close.noop"), 1);
    assert_eq!(capture.count("modal.open.noop"), 1);
    let transitions: Vec<(String, String)> = capture
        .with_message("modal.transition")
        .into_iter()
        .map(|e| {
            (
                e.field("from").unwrap_or_default().to_owned(),
                e.field("to").unwrap_or_default().to_owned(),
            )
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            ("closed".to_owned(), "mounted".to_owned()),
            ("mounted".to_owned(), "opening".to_owned()),
            ("opening".to_owned(), "open".to_owned()),
        ]
    );
    assert!(capture.contains("modal.teardown"));
}

#[test]
fn view_tracks_state_classes() {
    let (fake, host) = host();
    let modal = ModalController::mount(ModalOptions::new(), &host);
    assert_eq!(modal.view().class_list("modal"), "modal");

    modal.open();
    assert_eq!(modal.view().class_list("modal"), "modal modal--mounted");
    fake.scheduler.advance(NEXT_TICK);
    assert_eq!(modal.view().class_list("modal"), "modal modal--entering");
    fake.settle();
    let view = modal.view();
    assert_eq!(view.class_list("modal"), "modal modal--open");
    assert_eq!(view.transition_ms, 300);
    modal.close();
    assert_eq!(modal.view().class_list("modal"), "modal modal--exiting");
}
