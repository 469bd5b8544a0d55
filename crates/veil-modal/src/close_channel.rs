#![forbid(unsafe_code)]

//! Close-request channel.
//!
//! A [`CloseChannel`] is a shared single-slot holder for "the current close
//! function" of one dialog subtree. The owning controller writes the slot
//! when it mounts (and overwrites it whenever the close behavior changes);
//! nested controls such as [`CloseControl`] and [`Backdrop`] read it to
//! request a close without a direct reference to the controller.
//!
//! Cloning a channel shares the slot. Create one channel per dialog
//! subtree and pass clones down; never share one across independently
//! mounted dialogs.
//!
//! # Failure Modes
//!
//! - Requesting a close before any write returns
//!   [`CloseRequestError::NotReady`]. It never panics.
//! - The close function runs with the slot unborrowed, so it may rewrite or
//!   clear the slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;
use veil_core::CloseRequestError;

/// The close function stored in the slot.
pub type CloseFn = Rc<dyn Fn()>;

/// Shared single-slot close function holder.
#[derive(Clone, Default)]
pub struct CloseChannel {
    slot: Rc<RefCell<Option<CloseFn>>>,
}

impl fmt::Debug for CloseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseChannel")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl CloseChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the close function, replacing any previous one.
    pub fn register(&self, close: CloseFn) {
        *self.slot.borrow_mut() = Some(close);
    }

    /// Empty the slot. Subsequent requests report `NotReady`.
    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    /// Empty the slot only if it still holds `close`. Returns whether it did.
    pub fn clear_if(&self, close: &CloseFn) -> bool {
        let mut slot = self.slot.borrow_mut();
        let owned = slot.as_ref().is_some_and(|current| Rc::ptr_eq(current, close));
        if owned {
            slot.take();
        }
        owned
    }

    /// Whether a close function has been registered.
    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Invoke the current close function.
    pub fn request_close(&self) -> Result<(), CloseRequestError> {
        let close = self.slot.borrow().clone();
        match close {
            Some(close) => {
                close();
                Ok(())
            }
            None => {
                debug!(message = "modal.close_channel.not_ready");
                Err(CloseRequestError::NotReady)
            }
        }
    }

    /// Invoke the current close function, ignoring an unset slot.
    pub fn request_close_or_ignore(&self) {
        let _ = self.request_close();
    }

    /// Whether two handles share the same slot.
    pub fn same_channel(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

/// A custom close button bound to a channel.
///
/// Activation runs the optional click callback first, then requests a close.
pub struct CloseControl {
    channel: CloseChannel,
    on_click: Option<Box<dyn Fn()>>,
}

impl CloseControl {
    pub fn new(channel: CloseChannel) -> Self {
        Self {
            channel,
            on_click: None,
        }
    }

    /// Run `f` before each close request.
    pub fn on_click(mut self, f: impl Fn() + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    /// Activate the control (click, Enter, or Space).
    pub fn activate(&self) -> Result<(), CloseRequestError> {
        if let Some(on_click) = &self.on_click {
            on_click();
        }
        self.channel.request_close()
    }
}

impl fmt::Debug for CloseControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseControl")
            .field("channel", &self.channel)
            .field("has_on_click", &self.on_click.is_some())
            .finish()
    }
}

/// Click-outside surface behind the dialog content.
#[derive(Debug, Clone)]
pub struct Backdrop {
    channel: CloseChannel,
    dismissible: bool,
}

impl Backdrop {
    pub fn new(channel: CloseChannel) -> Self {
        Self {
            channel,
            dismissible: true,
        }
    }

    /// Whether a click closes the dialog (default `true`).
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    /// Handle a click on the backdrop. Returns whether a close was requested.
    pub fn click(&self) -> bool {
        self.dismissible && self.channel.request_close().is_ok()
    }
}
