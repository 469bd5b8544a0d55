#![forbid(unsafe_code)]

//! Veil public facade crate.
//!
//! Re-exports the dialog engine and the host capability traits, and offers a
//! prelude for day-to-day usage.

// --- Core re-exports -------------------------------------------------------

pub use veil_core::{
    CloseRequestError, EnvironmentError, Error, Focusable, HeadlessWindow, KeyCode, KeyEvent,
    KeyEventKind, ListenerGuard, Modifiers, MountError, Recovery, Scheduler, TimerId, TriggerRef,
    Window, WindowEvent, WindowEventKind, focus_ref,
};

// --- Modal re-exports ------------------------------------------------------

pub use veil_modal::{
    Backdrop, CloseChannel, CloseControl, FocusBounds, FocusTrap, Lifecycle, ModalController,
    ModalHandle, ModalHost, ModalOptions, ModalSettings, ModalState, ModalView, Placement,
    RenderTarget, Sentinel, Subscription, resolve_placement,
};

/// Standard result type for Veil APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CloseChannel, CloseControl, Error, FocusBounds, FocusTrap, KeyCode, KeyEvent, Lifecycle,
        ModalController, ModalHost, ModalOptions, ModalState, Result, focus_ref,
    };

    pub use crate::{core, modal};
}

pub use veil_core as core;
pub use veil_modal as modal;
