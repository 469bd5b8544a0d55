#![forbid(unsafe_code)]

//! Core: host capabilities, key events, and the error model.
//!
//! # Role in Veil
//! `veil-core` is the host layer. It names the capabilities a dialog
//! consumes without saying anything about dialog semantics.
//!
//! # Primary responsibilities
//! - **Scheduler**: single delayed callbacks with cancellation.
//! - **Window**: URL fragment, non-pushing history replace, scoped listeners.
//! - **Focusable**: the focus capability and weak trigger references.
//! - **Error**: typed errors mapped to local recovery actions.
//!
//! # How it fits in the system
//! `veil-modal` drives these traits from its state machine. Hosts implement
//! them once (browser bindings, a terminal runtime, or the deterministic
//! fakes in `veil-harness`).

pub mod error;
pub mod event;
pub mod focus;
pub mod logging;
pub mod time;
pub mod window;

pub use error::{CloseRequestError, EnvironmentError, Error, MountError, Recovery};
pub use event::{
    KeyCode, KeyEvent, KeyEventKind, Modifiers, TabDirection, WindowEvent, WindowEventKind,
};
pub use focus::{Focusable, TriggerRef, focus_ref, focus_weak};
pub use time::{Scheduler, TimerCallback, TimerId, TimerSlot};
pub use window::{HeadlessWindow, Listener, ListenerGuard, ListenerId, Window};
