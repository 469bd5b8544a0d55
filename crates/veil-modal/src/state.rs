#![forbid(unsafe_code)]

//! Dialog lifecycle states.
//!
//! State machine (staged): Closed → Mounted → Opening → Open → Closing → Closed
//!
//! `Mounted` exists so the host can commit the dialog to its render tree
//! one frame before the opening transition starts; otherwise the entrance
//! animation would jump straight to its end state.
//!
//! The simple lifecycle only ever uses `Closed` and `Open`.

/// Current lifecycle state of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalState {
    /// Not rendered and not interactive.
    #[default]
    Closed,
    /// Inserted into the render tree; the opening transition has not begun.
    Mounted,
    /// Transition-in in progress.
    Opening,
    /// Fully visible and interactive.
    Open,
    /// Transition-out in progress; still rendered.
    Closing,
}

impl ModalState {
    /// Whether the dialog should be rendered at all.
    #[inline]
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether the dialog accepts keyboard focus.
    #[inline]
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Mounted | Self::Opening | Self::Open)
    }

    /// Whether a staged transition is running.
    #[inline]
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Mounted | Self::Opening | Self::Closing)
    }

    /// `toggle()` intent: closed-or-closing opens, anything else closes.
    #[inline]
    pub fn wants_open(self) -> bool {
        matches!(self, Self::Closed | Self::Closing)
    }

    /// Stable lowercase name, used in logs and class names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Mounted => "mounted",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }

    /// BEM modifier class for staged animation styling.
    pub fn class_modifier(self) -> Option<&'static str> {
        match self {
            Self::Closed => None,
            Self::Mounted => Some("modal--mounted"),
            Self::Opening => Some("modal--entering"),
            Self::Open => Some("modal--open"),
            Self::Closing => Some("modal--exiting"),
        }
    }
}

impl std::fmt::Display for ModalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Richness of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(try_from = "String", into = "&'static str"))]
pub enum Lifecycle {
    /// Five states with timer-staged transitions.
    #[default]
    Staged,
    /// Two states (`Closed`, `Open`); transitions are immediate.
    Simple,
}

impl Lifecycle {
    /// Parse the settings spelling (`"staged"` / `"simple"`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "staged" => Some(Self::Staged),
            "simple" => Some(Self::Simple),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staged => "staged",
            Self::Simple => "simple",
        }
    }
}

impl TryFrom<String> for Lifecycle {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
            .ok_or_else(|| format!("unknown lifecycle {raw:?}, expected \"staged\" or \"simple\""))
    }
}

impl From<Lifecycle> for &'static str {
    fn from(lifecycle: Lifecycle) -> Self {
        lifecycle.as_str()
    }
}
