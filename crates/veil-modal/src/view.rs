#![forbid(unsafe_code)]

//! Presentational snapshot of a dialog.
//!
//! [`ModalView`] is what a rendering layer binds to: whether to render at
//! all, the ARIA attributes of the dialog container, and the class names for
//! staged transition styling.

use web_time::Duration;

use crate::focus_trap::DialogAttributes;
use crate::state::ModalState;

/// Class applied while reduced motion is active.
pub const REDUCED_MOTION_CLASS: &str = "modal--reduced-motion";

/// Render-time snapshot of one dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalView {
    pub state: ModalState,
    pub is_open: bool,
    pub role: &'static str,
    pub aria_modal: bool,
    pub reduced_motion: bool,
    /// Effective transition duration, for a `--transition-duration` variable.
    pub transition_ms: u64,
}

impl ModalView {
    pub fn new(state: ModalState, reduced_motion: bool, delay: Duration) -> Self {
        let attrs = DialogAttributes::for_state(state);
        Self {
            state,
            is_open: state.is_open(),
            role: attrs.role,
            aria_modal: attrs.aria_modal,
            reduced_motion,
            transition_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// State modifier class, if any.
    pub fn modifier(&self) -> Option<&'static str> {
        self.state.class_modifier()
    }

    /// Join `base` with the active modifiers, skipping empty parts.
    pub fn class_list(&self, base: &str) -> String {
        let reduced = self.reduced_motion.then_some(REDUCED_MOTION_CLASS);
        join_classes([Some(base), self.modifier(), reduced])
    }
}

/// Space-join the non-empty class names.
pub fn join_classes<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let mut out = String::new();
    for part in parts.into_iter().flatten() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
