#![forbid(unsafe_code)]

//! Host window capability: URL fragment, history, and scoped listeners.
//!
//! The [`Window`] trait is the navigation hash bridge's view of the host.
//! It mirrors the small slice of the browser window a dialog needs:
//! reading and writing `location.hash`, replacing the current history entry
//! without pushing a new one, and window-level event listeners.
//!
//! # Invariants
//!
//! - `location_hash` returns the fragment including its leading `#`, or an
//!   empty string when the URL has no fragment.
//! - `push_hash` creates a history entry and causes a `HashChange` event to
//!   be delivered to listeners (possibly later, from the event loop).
//! - `replace_hash` rewrites the current history entry in place and does
//!   NOT deliver a `HashChange` event.
//! - A [`ListenerGuard`] removes its listener exactly once, when dropped.
//!
//! # Failure Modes
//!
//! Headless hosts have no navigation or listener APIs. They return
//! [`EnvironmentError::Unavailable`] and callers treat every such call as a
//! no-op ([`HeadlessWindow`] is the canonical implementation).

use std::fmt;
use std::rc::Rc;

use crate::error::EnvironmentError;
use crate::event::{WindowEvent, WindowEventKind};

/// Callback invoked for each dispatched window event.
pub type Listener = Rc<dyn Fn(&WindowEvent)>;

/// Identifier of a registered window listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw host listener handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host listener handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Navigation and event-listener surface of the host window.
///
/// Implementations are single-threaded and must not hold internal borrows
/// while invoking listeners.
pub trait Window {
    /// Current URL fragment including `#`, or `""` when there is none.
    fn location_hash(&self) -> Result<String, EnvironmentError>;

    /// Navigate to `fragment` (with `#`), pushing a history entry.
    fn push_hash(&self, fragment: &str) -> Result<(), EnvironmentError>;

    /// Replace the current history entry's fragment without navigating.
    /// `None` strips the fragment (and the trailing `#`) entirely.
    fn replace_hash(&self, fragment: Option<&str>) -> Result<(), EnvironmentError>;

    /// Register a listener for `kind`.
    fn add_listener(
        &self,
        kind: WindowEventKind,
        listener: Listener,
    ) -> Result<ListenerId, EnvironmentError>;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Scoped registration of a window listener.
///
/// The listener stays attached for exactly as long as the guard lives.
pub struct ListenerGuard {
    window: Rc<dyn Window>,
    id: ListenerId,
    kind: WindowEventKind,
}

impl ListenerGuard {
    /// Register `listener` on `window`, returning a guard that detaches it.
    pub fn attach(
        window: &Rc<dyn Window>,
        kind: WindowEventKind,
        listener: Listener,
    ) -> Result<Self, EnvironmentError> {
        let id = window.add_listener(kind, listener)?;
        Ok(Self {
            window: Rc::clone(window),
            id,
            kind,
        })
    }

    /// The registered listener id.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The event kind this guard listens to.
    #[must_use]
    pub fn kind(&self) -> WindowEventKind {
        self.kind
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.window.remove_listener(self.id);
    }
}

/// Window for non-interactive hosts: every API is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessWindow;

impl Window for HeadlessWindow {
    fn location_hash(&self) -> Result<String, EnvironmentError> {
        Err(EnvironmentError::Unavailable {
            api: "location.hash",
        })
    }

    fn push_hash(&self, _fragment: &str) -> Result<(), EnvironmentError> {
        Err(EnvironmentError::Unavailable {
            api: "location.hash",
        })
    }

    fn replace_hash(&self, _fragment: Option<&str>) -> Result<(), EnvironmentError> {
        Err(EnvironmentError::Unavailable {
            api: "history.replaceState",
        })
    }

    fn add_listener(
        &self,
        _kind: WindowEventKind,
        _listener: Listener,
    ) -> Result<ListenerId, EnvironmentError> {
        Err(EnvironmentError::Unavailable {
            api: "addEventListener",
        })
    }

    fn remove_listener(&self, _id: ListenerId) {}
}
