#![forbid(unsafe_code)]

//! Portal placement.
//!
//! A dialog renders either in its logical position or relocated under
//! another node of the host tree (usually the document body). The host
//! supplies a [`MountLookup`] that resolves selectors and reports whether a
//! node is attached; this module decides where the dialog goes.
//!
//! # Failure Modes
//!
//! A selector that matches nothing, or a node not yet attached, falls back to
//! rendering in place. A `modal.portal.missing_target` warning names the
//! target so integrators can spot selector typos.

use std::fmt;

use tracing::warn;
use veil_core::MountError;

/// Host node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Where the dialog was asked to render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderTarget {
    /// Its logical parent.
    #[default]
    InPlace,
    /// A node the caller already holds.
    Node(NodeId),
    /// A node found by selector at mount time.
    Selector(String),
}

impl RenderTarget {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }
}

/// Host-tree queries needed to place a portal.
pub trait MountLookup {
    /// Find the node matching `selector`.
    fn resolve(&self, selector: &str) -> Option<NodeId>;

    /// Whether `node` is attached to the document.
    fn is_mounted(&self, node: NodeId) -> bool;
}

/// Where the dialog actually renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    InPlace,
    Portal(NodeId),
}

impl Placement {
    pub fn is_portal(self) -> bool {
        matches!(self, Self::Portal(_))
    }
}

/// Resolve `target`, reporting why a portal target was rejected.
pub fn try_resolve_placement(
    target: &RenderTarget,
    lookup: &dyn MountLookup,
) -> Result<Placement, MountError> {
    let node = match target {
        RenderTarget::InPlace => return Ok(Placement::InPlace),
        RenderTarget::Node(node) => *node,
        RenderTarget::Selector(selector) => {
            lookup
                .resolve(selector)
                .ok_or_else(|| MountError::TargetNotFound {
                    selector: selector.clone(),
                })?
        }
    };
    if lookup.is_mounted(node) {
        Ok(Placement::Portal(node))
    } else {
        Err(MountError::TargetDetached { node: node.get() })
    }
}

/// Resolve `target`, rendering in place when the portal target is unusable.
pub fn resolve_placement(target: &RenderTarget, lookup: &dyn MountLookup) -> Placement {
    match try_resolve_placement(target, lookup) {
        Ok(placement) => placement,
        Err(err) => {
            warn!(
                message = "modal.portal.missing_target",
                target = ?target,
                error = %err,
                recovery = %veil_core::Error::from(err.clone()).recovery()
            );
            Placement::InPlace
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tree;

    impl MountLookup for Tree {
        fn resolve(&self, selector: &str) -> Option<NodeId> {
            match selector {
                "body" => Some(NodeId::new(1)),
                "#later" => Some(NodeId::new(2)),
                _ => None,
            }
        }

        fn is_mounted(&self, node: NodeId) -> bool {
            node.get() == 1
        }
    }

    #[test]
    fn in_place_needs_no_lookup() {
        assert_eq!(
            resolve_placement(&RenderTarget::InPlace, &Tree),
            Placement::InPlace
        );
    }

    #[test]
    fn selector_resolves_to_portal() {
        let placement = resolve_placement(&RenderTarget::selector("body"), &Tree);
        assert_eq!(placement, Placement::Portal(NodeId::new(1)));
        assert!(placement.is_portal());
    }

    #[test]
    fn unknown_selector_falls_back() {
        let capture = veil_harness::EventCapture::new();
        let _guard = capture.install();
        let target = RenderTarget::selector("#modal-root");
        assert_eq!(
            try_resolve_placement(&target, &Tree),
            Err(MountError::TargetNotFound {
                selector: "#modal-root".into()
            })
        );
        assert_eq!(resolve_placement(&target, &Tree), Placement::InPlace);

        let warnings = capture.with_message("modal.portal.missing_target");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, tracing::Level::WARN);
        assert!(warnings[0].field("error").unwrap().contains("#modal-root"));
        assert!(warnings[0].field("recovery").is_some());
    }

    #[test]
    fn detached_node_falls_back() {
        let target = RenderTarget::selector("#later");
        assert_eq!(
            try_resolve_placement(&target, &Tree),
            Err(MountError::TargetDetached { node: 2 })
        );
        assert_eq!(
            resolve_placement(&RenderTarget::Node(NodeId::new(2)), &Tree),
            Placement::InPlace
        );
    }
}
