#![forbid(unsafe_code)]

//! Focus trap wired to a controller, and nested close controls.

use std::rc::Rc;

use pretty_assertions::assert_eq;
use veil_core::{CloseRequestError, Focusable, KeyCode, KeyEvent, focus_ref};
use veil_harness::{FakeDocument, FakeElement, FakeHost};
use veil_modal::{
    Backdrop, CloseChannel, CloseControl, FocusBounds, FocusSlot, FocusTrap, ModalController,
    ModalHost, ModalOptions, ModalState, Sentinel, SlotAttributes, Subscription,
};

/// A dialog rendered into a fake document:
/// `trigger [leading] a b c [trailing] after`.
struct Fixture {
    fake: FakeHost,
    doc: FakeDocument,
    trigger: Rc<FakeElement>,
    trap: FocusTrap,
    modal: ModalController,
    _render: Subscription,
}

fn fixture() -> Fixture {
    let fake = FakeHost::new();
    let host = ModalHost::new(fake.scheduler_handle(), fake.window_handle());
    let doc = FakeDocument::new();
    let trigger = doc.element("trigger");
    let leading = doc.element("leading");
    let a = doc.element("a");
    let b = doc.element("b");
    let c = doc.element("c");
    let trailing = doc.element("trailing");
    doc.element("after");

    let trap = FocusTrap::new(FocusBounds::new(focus_ref(&a), focus_ref(&c)));
    let t = trap.clone();
    leading.on_focus(move || {
        t.on_sentinel_focus(Sentinel::Leading);
    });
    let t = trap.clone();
    trailing.on_focus(move || {
        t.on_slot_focus(FocusSlot::TrailingSentinel);
    });

    // Stand-in for the rendering layer: dialog slots follow the state.
    let slots = [leading, a, b, c, trailing];
    let apply = move |state: ModalState| {
        let attrs = SlotAttributes::for_state(state);
        for element in &slots {
            element.set_tab_index(attrs.tab_index);
        }
    };
    apply(ModalState::Closed);

    let modal = ModalController::mount(
        ModalOptions::new().trigger(focus_ref(&trigger)),
        &host,
    );
    let render = modal.on_transition(move |_, to| apply(to));
    modal.bind_focus_trap(trap.clone());

    Fixture {
        fake,
        doc,
        trigger,
        trap,
        modal,
        _render: render,
    }
}

#[test]
fn opening_moves_focus_inside() {
    let f = fixture();
    f.trigger.focus();
    f.modal.open();
    assert_eq!(f.doc.active().as_deref(), Some("a"));
    assert!(f.trap.is_active());
    f.fake.settle();
    // Seized once per open, not on every staged step.
    assert_eq!(f.doc.focus_log(), vec!["trigger", "a"]);
}

#[test]
fn tab_cycles_through_three_elements() {
    let f = fixture();
    f.modal.open();
    f.fake.settle();
    f.doc.clear_focus_log();

    f.doc.tab();
    f.doc.tab();
    assert_eq!(f.doc.active().as_deref(), Some("c"));
    f.doc.tab();
    assert_eq!(f.doc.active().as_deref(), Some("a"));
    f.doc.shift_tab();
    assert_eq!(f.doc.active().as_deref(), Some("c"));

    assert_eq!(
        f.doc.focus_log(),
        vec!["b", "c", "trailing", "a", "leading", "c"]
    );
    assert_eq!(f.trap.redirect_count(), 2);
}

#[test]
fn shift_tab_key_from_first_wraps_to_last() {
    let f = fixture();
    f.modal.open();
    f.fake.settle();
    assert_eq!(f.doc.active().as_deref(), Some("a"));

    f.doc.press(KeyEvent::new(KeyCode::BackTab));
    assert_eq!(f.doc.active().as_deref(), Some("c"));
    f.doc.press(KeyEvent::new(KeyCode::Tab));
    assert_eq!(f.doc.active().as_deref(), Some("a"));
}

#[test]
fn closed_dialog_is_out_of_tab_order() {
    let f = fixture();
    f.modal.open();
    f.fake.settle();
    f.modal.close();
    assert_eq!(f.doc.active().as_deref(), Some("trigger"));
    assert!(!f.trap.is_active());

    f.doc.tab();
    assert_eq!(f.doc.active().as_deref(), Some("after"));
    // Sentinels do nothing while the dialog is not interactive.
    assert!(!f.trap.on_sentinel_focus(Sentinel::Trailing));
}

#[test]
fn reopening_seizes_focus_again() {
    let f = fixture();
    f.modal.open();
    f.fake.settle();
    f.modal.close();
    f.fake.settle();
    f.modal.open();
    assert_eq!(f.doc.active().as_deref(), Some("a"));
}

#[test]
fn initial_element_takes_precedence() {
    let f = fixture();
    let close_button = f.doc.get("b").unwrap();
    f.trap.set_bounds(
        FocusBounds::new(
            focus_ref(&f.doc.get("a").unwrap()),
            focus_ref(&f.doc.get("c").unwrap()),
        )
        .initial(focus_ref(&close_button)),
    );
    f.modal.open();
    assert_eq!(f.doc.active().as_deref(), Some("b"));
}

#[test]
fn close_control_and_backdrop_use_the_channel() {
    let f = fixture();
    let control = CloseControl::new(f.modal.close_channel());
    let backdrop = Backdrop::new(f.modal.close_channel());

    f.modal.open();
    f.fake.settle();
    control.activate().unwrap();
    assert_eq!(f.modal.state(), ModalState::Closing);
    f.fake.settle();

    f.modal.open();
    f.fake.settle();
    assert!(backdrop.click());
    assert_eq!(f.modal.state(), ModalState::Closing);
}

#[test]
fn provider_channel_before_and_after_mount() {
    let fake = FakeHost::new();
    let host = ModalHost::new(fake.scheduler_handle(), fake.window_handle());
    let channel = CloseChannel::new();
    let control = CloseControl::new(channel.clone());
    assert_eq!(control.activate(), Err(CloseRequestError::NotReady));

    let modal = ModalController::mount_with_channel(ModalOptions::new(), &host, channel.clone());
    assert!(modal.close_channel().same_channel(&channel));
    modal.open();
    fake.settle();
    control.activate().unwrap();
    assert_eq!(modal.state(), ModalState::Closing);

    drop(modal);
    assert_eq!(control.activate(), Err(CloseRequestError::NotReady));
}

#[test]
fn remount_on_shared_channel_keeps_new_close_function() {
    let fake = FakeHost::new();
    let host = ModalHost::new(fake.scheduler_handle(), fake.window_handle());
    let channel = CloseChannel::new();
    let control = CloseControl::new(channel.clone());

    let first = ModalController::mount_with_channel(ModalOptions::new(), &host, channel.clone());
    let second = ModalController::mount_with_channel(ModalOptions::new(), &host, channel.clone());
    drop(first);
    assert!(channel.is_ready());

    second.open();
    fake.settle();
    control.activate().unwrap();
    assert_eq!(second.state(), ModalState::Closing);

    drop(second);
    assert_eq!(control.activate(), Err(CloseRequestError::NotReady));
}
