#![forbid(unsafe_code)]

//! Focus capability.
//!
//! Anything that can receive keyboard focus implements [`Focusable`].
//! Dialogs never own the elements they focus: the trigger control and the
//! focus bounds are held as [`Weak`] references and silently skipped once
//! the host has dropped them.

use std::rc::{Rc, Weak};

/// An element that can receive keyboard focus.
pub trait Focusable {
    /// Move keyboard focus to this element.
    fn focus(&self);
}

/// Borrowed reference to the control that opened a dialog.
pub type TriggerRef = Weak<dyn Focusable>;

/// Downgrade a concrete element into a type-erased weak focus reference.
#[must_use]
pub fn focus_ref<F: Focusable + 'static>(element: &Rc<F>) -> Weak<dyn Focusable> {
    let erased: Rc<dyn Focusable> = Rc::clone(element) as Rc<dyn Focusable>;
    Rc::downgrade(&erased)
}

/// Focus `target` if it is still alive. Returns whether focus was moved.
pub fn focus_weak(target: &Weak<dyn Focusable>) -> bool {
    match target.upgrade() {
        Some(element) => {
            element.focus();
            true
        }
        None => false,
    }
}
