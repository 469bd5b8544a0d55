#![forbid(unsafe_code)]

//! Sentinel-based focus trap for dialogs.
//!
//! The dialog's children are rendered between two focus bounds, and the
//! bounds between two invisible wrap sentinels:
//!
//! ```text
//!   [leading sentinel] [first bound] ...children... [last bound] [trailing sentinel]
//! ```
//!
//! Native Tab order only reaches a sentinel by tabbing past a bound. When the
//! trailing sentinel receives focus the trap sends focus to the first bound;
//! when the leading sentinel receives focus it goes to the last bound. This
//! closes the loop without intercepting Tab keypresses, so native tab order
//! and assistive technology keep working.
//!
//! # Invariants
//!
//! 1. **Auto-focus**: entering an interactive state moves focus inside the
//!    dialog exactly once per open (initial element, else the first bound).
//! 2. **Loop**: sentinel focus redirects to the opposite bound only while the
//!    dialog is interactive.
//! 3. **Exclusion**: in non-interactive states every slot reports
//!    `tab_index == -1` and `aria_hidden == true`.
//!
//! # Failure Modes
//!
//! - Bounds are weak; a dropped bound is skipped and the redirect reports
//!   `false` (focus stays where the host put it).
//! - Focus calls are made with no internal borrow held, so a bound whose
//!   focus handler re-enters the trap is fine.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;
use veil_core::{Focusable, focus_weak};

use crate::state::ModalState;

/// One of the two wrap sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Before the first bound; reached by Shift+Tab from the first bound.
    Leading,
    /// After the last bound; reached by Tab from the last bound.
    Trailing,
}

/// Render-order slots of a trapped dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusSlot {
    LeadingSentinel,
    FirstBound,
    Content,
    LastBound,
    TrailingSentinel,
}

impl FocusSlot {
    /// Slots in render order.
    pub const ORDER: [FocusSlot; 5] = [
        FocusSlot::LeadingSentinel,
        FocusSlot::FirstBound,
        FocusSlot::Content,
        FocusSlot::LastBound,
        FocusSlot::TrailingSentinel,
    ];

    /// The sentinel this slot represents, if any.
    pub fn sentinel(self) -> Option<Sentinel> {
        match self {
            Self::LeadingSentinel => Some(Sentinel::Leading),
            Self::TrailingSentinel => Some(Sentinel::Trailing),
            Self::FirstBound | Self::Content | Self::LastBound => None,
        }
    }

    /// Sentinels are visually hidden; bounds are invisible but focusable.
    pub fn is_visually_hidden(self) -> bool {
        self.sentinel().is_some()
    }
}

/// Accessibility attributes for a trap slot in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAttributes {
    pub tab_index: i32,
    pub aria_hidden: bool,
}

impl SlotAttributes {
    /// Attributes for every trap slot while the dialog is in `state`.
    pub fn for_state(state: ModalState) -> Self {
        if state.is_interactive() {
            Self {
                tab_index: 0,
                aria_hidden: false,
            }
        } else {
            Self {
                tab_index: -1,
                aria_hidden: true,
            }
        }
    }
}

/// Accessibility attributes for the dialog container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogAttributes {
    pub role: &'static str,
    pub aria_modal: bool,
    pub tab_index: i32,
    pub aria_hidden: bool,
}

impl DialogAttributes {
    pub fn for_state(state: ModalState) -> Self {
        let slot = SlotAttributes::for_state(state);
        Self {
            role: "dialog",
            aria_modal: true,
            tab_index: slot.tab_index,
            aria_hidden: slot.aria_hidden,
        }
    }
}

/// The focus anchors a trap works with.
#[derive(Clone, Default)]
pub struct FocusBounds {
    first: Option<Weak<dyn Focusable>>,
    last: Option<Weak<dyn Focusable>>,
    initial: Option<Weak<dyn Focusable>>,
}

impl FocusBounds {
    /// Bounds bracketing the dialog content.
    pub fn new(first: Weak<dyn Focusable>, last: Weak<dyn Focusable>) -> Self {
        Self {
            first: Some(first),
            last: Some(last),
            initial: None,
        }
    }

    /// Element focused on open instead of the first bound (e.g. a close
    /// button).
    pub fn initial(mut self, initial: Weak<dyn Focusable>) -> Self {
        self.initial = Some(initial);
        self
    }

    fn entry_point(&self) -> Option<Weak<dyn Focusable>> {
        let alive = |w: &&Weak<dyn Focusable>| w.strong_count() > 0;
        self.initial
            .as_ref()
            .filter(alive)
            .or(self.first.as_ref())
            .cloned()
    }
}

impl fmt::Debug for FocusBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusBounds")
            .field("first", &self.first.is_some())
            .field("last", &self.last.is_some())
            .field("initial", &self.initial.is_some())
            .finish()
    }
}

struct TrapInner {
    bounds: FocusBounds,
    interactive: bool,
    seized: bool,
    redirects: u64,
}

/// Focus trap controller.
///
/// Cloning creates a new handle to the same trap, so sentinel focus handlers
/// can hold a clone.
#[derive(Clone)]
pub struct FocusTrap {
    inner: Rc<RefCell<TrapInner>>,
}

impl fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FocusTrap")
            .field("bounds", &inner.bounds)
            .field("interactive", &inner.interactive)
            .field("seized", &inner.seized)
            .field("redirects", &inner.redirects)
            .finish()
    }
}

impl FocusTrap {
    /// Create an inactive trap around `bounds`.
    pub fn new(bounds: FocusBounds) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TrapInner {
                bounds,
                interactive: false,
                seized: false,
                redirects: 0,
            })),
        }
    }

    /// Replace the bounds (e.g. after the content re-rendered).
    pub fn set_bounds(&self, bounds: FocusBounds) {
        self.inner.borrow_mut().bounds = bounds;
    }

    /// Follow a dialog state change.
    ///
    /// Entering an interactive state moves focus inside once; leaving it
    /// re-arms the trap for the next open.
    pub fn sync(&self, state: ModalState) {
        let target = {
            let mut inner = self.inner.borrow_mut();
            inner.interactive = state.is_interactive();
            if !inner.interactive {
                inner.seized = false;
                None
            } else if inner.seized {
                None
            } else {
                inner.seized = true;
                inner.bounds.entry_point()
            }
        };
        if let Some(target) = target {
            let moved = focus_weak(&target);
            trace!(message = "modal.focus.seize", state = state.as_str(), moved);
        }
    }

    /// Handle focus arriving on a sentinel. Returns whether focus was
    /// redirected to the opposite bound.
    pub fn on_sentinel_focus(&self, sentinel: Sentinel) -> bool {
        let target = {
            let mut inner = self.inner.borrow_mut();
            if !inner.interactive {
                return false;
            }
            let target = match sentinel {
                Sentinel::Leading => inner.bounds.last.clone(),
                Sentinel::Trailing => inner.bounds.first.clone(),
            };
            if target.is_some() {
                inner.redirects += 1;
            }
            target
        };
        let moved = target.as_ref().is_some_and(focus_weak);
        trace!(message = "modal.focus.wrap", sentinel = ?sentinel, moved);
        moved
    }

    /// Handle focus arriving on any slot; only sentinels act.
    pub fn on_slot_focus(&self, slot: FocusSlot) -> bool {
        slot.sentinel()
            .is_some_and(|sentinel| self.on_sentinel_focus(sentinel))
    }

    /// Whether the trap currently contains focus.
    pub fn is_active(&self) -> bool {
        self.inner.borrow().interactive
    }

    /// Number of sentinel redirects performed so far.
    pub fn redirect_count(&self) -> u64 {
        self.inner.borrow().redirects
    }
}
