#![forbid(unsafe_code)]

//! Key events and window-level events.
//!
//! # Design Notes
//!
//! - Only the keys a dialog reacts to get named variants; everything else
//!   arrives as `Char` or `Other`.
//! - `KeyEventKind` distinguishes press from release: Escape closes on
//!   release, matching how browser dialogs listen to `keyup`.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Shorthand for a key release event.
    #[must_use]
    pub const fn release(code: KeyCode) -> Self {
        Self::new(code).with_kind(KeyEventKind::Release)
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// True for an Escape key release.
    #[must_use]
    pub const fn is_escape_release(&self) -> bool {
        matches!(self.code, KeyCode::Escape) && matches!(self.kind, KeyEventKind::Release)
    }

    /// Direction of sequential focus movement, if this is a Tab press.
    ///
    /// `BackTab` and Shift+Tab both move backwards.
    #[must_use]
    pub fn tab_direction(&self) -> Option<TabDirection> {
        if !matches!(self.kind, KeyEventKind::Press) {
            return None;
        }
        match self.code {
            KeyCode::Tab if self.shift() => Some(TabDirection::Backward),
            KeyCode::Tab => Some(TabDirection::Forward),
            KeyCode::BackTab => Some(TabDirection::Backward),
            _ => None,
        }
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Space bar.
    Space,

    /// Any key the dialog does not interpret.
    Other,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

/// Direction of sequential (Tab) focus navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabDirection {
    Forward,
    Backward,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Kinds of window-scoped events a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEventKind {
    /// The URL fragment changed through navigation.
    HashChange,
    /// A key was released anywhere in the document.
    KeyUp,
}

/// A window-scoped event delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// The URL fragment changed. Carries the new fragment including `#`,
    /// or an empty string when the fragment was removed.
    HashChange { fragment: String },
    /// A key release.
    KeyUp(KeyEvent),
}

impl WindowEvent {
    /// The listener kind this event is dispatched to.
    #[must_use]
    pub fn kind(&self) -> WindowEventKind {
        match self {
            Self::HashChange { .. } => WindowEventKind::HashChange,
            Self::KeyUp(_) => WindowEventKind::KeyUp,
        }
    }
}
