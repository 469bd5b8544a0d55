#![forbid(unsafe_code)]

//! Navigation hash bridge.
//!
//! A dialog configured with a hash mirrors its visibility in the URL
//! fragment `#<prefix><hash>`: the fragment matching means "open", anything
//! else means "closed". This module owns the fragment format and the three
//! navigation moves the controller needs. All of them degrade to no-ops on
//! hosts without navigation APIs.
//!
//! # Invariants
//!
//! - Matching is exact: another dialog's fragment never matches this route.
//! - Clearing never pushes a history entry, so Back cannot re-open a dialog
//!   that was closed from inside the page.

use std::rc::Rc;

use tracing::debug;
use veil_core::{EnvironmentError, Window};

/// The fragment a dialog is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashRoute {
    slug: String,
    fragment: String,
}

impl HashRoute {
    /// Build a route from the configured hash and prefix.
    ///
    /// A leading `#` on `hash` is stripped. Returns `None` for an empty hash,
    /// which disables synchronization.
    pub fn new(hash: &str, prefix: &str) -> Option<Self> {
        let slug = hash.trim().trim_start_matches('#');
        if slug.is_empty() {
            return None;
        }
        let prefix = prefix.trim_start_matches('#');
        Some(Self {
            slug: slug.to_owned(),
            fragment: format!("#{prefix}{slug}"),
        })
    }

    /// The configured hash, without `#` or prefix.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The full fragment, including `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Exact-match test against a `location.hash` value.
    pub fn matches(&self, location_hash: &str) -> bool {
        location_hash == self.fragment
    }
}

/// Navigation moves for one route against one window.
pub(crate) struct HashBridge {
    route: HashRoute,
    window: Rc<dyn Window>,
}

impl HashBridge {
    pub(crate) fn new(route: HashRoute, window: Rc<dyn Window>) -> Self {
        Self { route, window }
    }

    pub(crate) fn route(&self) -> &HashRoute {
        &self.route
    }

    /// Whether the current fragment matches. `None` when the host has no
    /// navigation API.
    pub(crate) fn is_current(&self) -> Option<bool> {
        match self.window.location_hash() {
            Ok(current) => Some(self.route.matches(&current)),
            Err(err) => {
                log_unavailable(err);
                None
            }
        }
    }

    /// Navigate to the route's fragment. Returns `true` when the navigation
    /// was issued and the hash-change listener will drive the transition.
    pub(crate) fn write(&self) -> bool {
        match self.window.push_hash(self.route.fragment()) {
            Ok(()) => {
                debug!(message = "modal.hash.write", fragment = self.route.fragment());
                true
            }
            Err(err) => {
                log_unavailable(err);
                false
            }
        }
    }

    /// Remove the fragment if it is ours, replacing the history entry.
    pub(crate) fn clear_if_current(&self) {
        if self.is_current() != Some(true) {
            return;
        }
        match self.window.replace_hash(None) {
            Ok(()) => debug!(message = "modal.hash.clear", fragment = self.route.fragment()),
            Err(err) => log_unavailable(err),
        }
    }
}

fn log_unavailable(err: EnvironmentError) {
    debug!(message = "modal.env.unavailable", error = %err);
}
