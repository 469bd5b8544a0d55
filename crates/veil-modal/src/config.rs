#![forbid(unsafe_code)]

//! Dialog configuration.
//!
//! [`ModalOptions`] is the builder handed to
//! [`ModalController::mount`](crate::ModalController::mount). It carries the
//! trigger reference, so it cannot be serialized; [`ModalSettings`] is the
//! serializable subset, loadable from TOML or JSON with the `config` feature.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use veil_modal::{Lifecycle, ModalOptions};
//!
//! let options = ModalOptions::new()
//!     .transition_duration(Duration::from_millis(800))
//!     .hash("settings");
//! assert_eq!(options.effective_delay(), Duration::from_millis(800));
//! assert_eq!(options.route().unwrap().fragment(), "#settings");
//!
//! let reduced = options.prefers_reduced_motion(true);
//! assert_eq!(reduced.effective_delay(), Duration::ZERO);
//! # let _ = Lifecycle::Simple;
//! ```

use std::fmt;

use veil_core::TriggerRef;
use web_time::Duration;

use crate::hash::HashRoute;
use crate::state::Lifecycle;

/// Delay between `Mounted` and `Opening`: long enough for the host to paint
/// the mounted frame before the opening styles apply.
pub const NEXT_TICK: Duration = Duration::from_millis(10);

/// Default transition duration for the staged lifecycle.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Options for one dialog instance.
#[derive(Debug, Clone, Default)]
pub struct ModalOptions {
    /// Element to refocus on close.
    pub trigger: Option<TriggerRef>,
    /// Transition duration; `None` uses the lifecycle default.
    pub transition_duration: Option<Duration>,
    /// Collapse every transition delay to zero.
    pub prefers_reduced_motion: bool,
    /// Fragment to synchronize with, without `#`.
    pub hash: Option<String>,
    /// Prefix inserted between `#` and the hash (e.g. `"!/"`).
    pub hash_prefix: String,
    /// Five-state or two-state lifecycle.
    pub lifecycle: Lifecycle,
}

impl ModalOptions {
    /// Create default options (staged lifecycle, 300ms, no hash).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element that receives focus when the dialog closes.
    pub fn trigger(mut self, trigger: TriggerRef) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Set the transition duration.
    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = Some(duration);
        self
    }

    /// Set the reduced-motion preference.
    pub fn prefers_reduced_motion(mut self, reduced: bool) -> Self {
        self.prefers_reduced_motion = reduced;
        self
    }

    /// Enable URL fragment synchronization.
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Set the fragment prefix.
    pub fn hash_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hash_prefix = prefix.into();
        self
    }

    /// Select the lifecycle.
    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Configured duration, falling back to the lifecycle default.
    pub fn configured_duration(&self) -> Duration {
        self.transition_duration
            .unwrap_or(match self.lifecycle {
                Lifecycle::Staged => DEFAULT_TRANSITION,
                Lifecycle::Simple => Duration::ZERO,
            })
    }

    /// Delay actually used at each timer-scheduling point.
    pub fn effective_delay(&self) -> Duration {
        effective_delay(self.configured_duration(), self.prefers_reduced_motion)
    }

    /// The hash route, if synchronization is enabled.
    pub fn route(&self) -> Option<HashRoute> {
        self.hash
            .as_deref()
            .and_then(|hash| HashRoute::new(hash, &self.hash_prefix))
    }

    /// Apply serializable settings on top of these options.
    pub fn with_settings(mut self, settings: &ModalSettings) -> Self {
        if let Some(ms) = settings.transition_duration_ms {
            self.transition_duration = Some(Duration::from_millis(ms));
        }
        self.prefers_reduced_motion = settings.prefers_reduced_motion;
        self.hash = settings.hash.clone();
        self.hash_prefix = settings.hash_prefix.clone();
        self.lifecycle = settings.lifecycle;
        self
    }
}

/// Reduced motion collapses any duration to zero.
pub fn effective_delay(configured: Duration, prefers_reduced_motion: bool) -> Duration {
    if prefers_reduced_motion {
        Duration::ZERO
    } else {
        configured
    }
}

/// Serializable dialog settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct ModalSettings {
    pub transition_duration_ms: Option<u64>,
    pub prefers_reduced_motion: bool,
    pub hash: Option<String>,
    pub hash_prefix: String,
    pub lifecycle: Lifecycle,
}

#[cfg(feature = "config")]
impl ModalSettings {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        toml::from_str(raw).map_err(SettingsError::Toml)
    }

    /// Parse settings from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(raw).map_err(SettingsError::Json)
    }
}

/// Settings document parse failure.
#[derive(Debug)]
pub enum SettingsError {
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// A field parsed but holds an unusable value.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "invalid TOML settings: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "invalid JSON settings: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid setting {field}: {reason}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl ModalSettings {
    /// Reject settings that cannot drive a dialog.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let blank_hash = self
            .hash
            .as_deref()
            .is_some_and(|hash| HashRoute::new(hash, &self.hash_prefix).is_none());
        if blank_hash {
            return Err(SettingsError::Invalid {
                field: "hash",
                reason: "must contain at least one character besides '#'".into(),
            });
        }
        if self.hash_prefix.contains(char::is_whitespace) {
            return Err(SettingsError::Invalid {
                field: "hash_prefix",
                reason: "must not contain whitespace".into(),
            });
        }
        Ok(())
    }
}
