#![forbid(unsafe_code)]

//! Modal dialogs: lifecycle, focus containment, and navigation sync.
//!
//! # Role in Veil
//! `veil-modal` is the dialog engine. It owns the lifecycle state machine
//! and everything that reacts to it; rendering is left to the host, which
//! binds to [`ModalView`] and the close channel.
//!
//! # Primary responsibilities
//! - **ModalController**: staged or simple lifecycle with cancellable timers,
//!   Escape handling, trigger focus restoration, and teardown.
//! - **FocusTrap**: sentinel-based focus loop around the dialog content.
//! - **CloseChannel**: lets nested controls request a close.
//! - **HashRoute**: mirrors visibility in the URL fragment.
//! - **Portal placement**: in place or under another host node.

pub mod close_channel;
pub mod config;
pub mod controller;
pub mod focus_trap;
pub mod hash;
pub mod portal;
pub mod state;
pub mod view;

pub use close_channel::{Backdrop, CloseChannel, CloseControl, CloseFn};
pub use config::{DEFAULT_TRANSITION, ModalOptions, ModalSettings, NEXT_TICK, SettingsError};
pub use controller::{ModalController, ModalHandle, ModalHost, Subscription};
pub use focus_trap::{
    DialogAttributes, FocusBounds, FocusSlot, FocusTrap, Sentinel, SlotAttributes,
};
pub use hash::HashRoute;
pub use portal::{
    MountLookup, NodeId, Placement, RenderTarget, resolve_placement, try_resolve_placement,
};
pub use state::{Lifecycle, ModalState};
pub use view::{ModalView, join_classes};
