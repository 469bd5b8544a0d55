#![forbid(unsafe_code)]

//! Error model and local recovery.
//!
//! # Design Principles
//!
//! 1. **Nothing escapes to the host**: dialogs recover from every error in
//!    this taxonomy locally; the caller-visible signal is the dialog state.
//! 2. **Domain-specific errors**: each concern has its own typed error so
//!    callers can match on what matters.
//! 3. **Recovery as data**: every variant maps to a [`Recovery`] action
//!    describing how the dialog keeps working.

use std::fmt;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// Host capability errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentError {
    /// The named host API does not exist (headless or non-interactive host).
    Unavailable { api: &'static str },
}

/// Portal mount target errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    /// No node matched the selector.
    TargetNotFound { selector: String },
    /// The node exists but is not attached to the document yet.
    TargetDetached { node: u64 },
}

/// Close-request channel errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequestError {
    /// No dialog has registered a close function on this channel.
    NotReady,
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error for Veil dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Environment(EnvironmentError),
    Mount(MountError),
    CloseRequest(CloseRequestError),
}

/// How a dialog recovers from an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// Skip the navigation or listener step; state handling continues.
    SkipNavigation,
    /// Render the dialog in its logical position instead of the portal.
    RenderInPlace,
    /// Drop the request; nothing happens.
    Ignore,
}

impl Error {
    /// The recovery action for this error.
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Environment(EnvironmentError::Unavailable { .. }) => Recovery::SkipNavigation,
            Self::Mount(MountError::TargetNotFound { .. }) => Recovery::RenderInPlace,
            Self::Mount(MountError::TargetDetached { .. }) => Recovery::RenderInPlace,
            Self::CloseRequest(CloseRequestError::NotReady) => Recovery::Ignore,
        }
    }

    /// Short machine-readable error category for log fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Environment(_) => "environment",
            Self::Mount(_) => "mount",
            Self::CloseRequest(_) => "close_request",
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { api } => write!(f, "host API unavailable: {api}"),
        }
    }
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound { selector } => {
                write!(f, "portal target not found: {selector:?}")
            }
            Self::TargetDetached { node } => {
                write!(f, "portal target node {node} is not mounted")
            }
        }
    }
}

impl fmt::Display for CloseRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "no dialog has registered a close function"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment(e) => write!(f, "environment: {e}"),
            Self::Mount(e) => write!(f, "mount: {e}"),
            Self::CloseRequest(e) => write!(f, "close request: {e}"),
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipNavigation => write!(f, "skip-navigation"),
            Self::RenderInPlace => write!(f, "render-in-place"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for EnvironmentError {}
impl std::error::Error for MountError {}
impl std::error::Error for CloseRequestError {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Environment(e) => Some(e),
            Self::Mount(e) => Some(e),
            Self::CloseRequest(e) => Some(e),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<EnvironmentError> for Error {
    fn from(e: EnvironmentError) -> Self {
        Self::Environment(e)
    }
}

impl From<MountError> for Error {
    fn from(e: MountError) -> Self {
        Self::Mount(e)
    }
}

impl From<CloseRequestError> for Error {
    fn from(e: CloseRequestError) -> Self {
        Self::CloseRequest(e)
    }
}
