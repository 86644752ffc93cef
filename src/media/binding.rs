//! Per-row image binding with discard-on-mismatch.
//!
//! Rows are recycled as the viewport moves over the post list, so a slot's
//! binding can change while the fetch it requested is still in flight.
//! Every resolution carries the resource id it was fetched for; a slot only
//! accepts a result whose id matches its current binding and silently
//! discards the rest. A discarded delivery is the superseded case: the slot
//! simply keeps waiting for the id it is bound to now.
//!
//! Lifecycle: `Unbound -> Requested -> Resolved | Failed`. A failed binding
//! retries when the slot is rebound or reset (which issues a fresh cache
//! resolve), not on every render pass.

use std::sync::Arc;

use crate::client::MediaError;

/// Async image binding for one row position (or the detail view).
#[derive(Debug, Clone, Default)]
pub enum ImageSlot {
    /// No resource bound.
    #[default]
    Unbound,
    /// Bound, waiting for the cache to resolve.
    Requested { id: Arc<str> },
    /// Bound with bytes in hand.
    Resolved { id: Arc<str>, bytes: Arc<[u8]> },
    /// Bound, and the fetch for this id failed; a placeholder renders.
    Failed { id: Arc<str> },
}

impl ImageSlot {
    /// Bind the slot to a resource id.
    ///
    /// Returns true when the binding changed and the caller should request
    /// a resolve for it. Rebinding the currently bound id is a no-op in
    /// every state: resolved bytes stay, an in-flight request keeps
    /// waiting, a failed slot keeps its placeholder.
    pub fn bind(&mut self, id: &Arc<str>) -> bool {
        if self.bound_id() == Some(id.as_ref()) {
            return false;
        }
        *self = ImageSlot::Requested { id: Arc::clone(id) };
        true
    }

    /// Drop the binding entirely (the row scrolled past the end of the
    /// list, or the list was replaced).
    pub fn reset(&mut self) {
        *self = ImageSlot::Unbound;
    }

    /// Deliver the resolution for `id`.
    ///
    /// Returns true when the slot accepted it. A delivery whose id does not
    /// match the current binding belongs to a superseded binding and is
    /// discarded without touching the slot.
    pub fn apply(&mut self, id: &str, outcome: &Result<Arc<[u8]>, MediaError>) -> bool {
        if self.bound_id() != Some(id) {
            tracing::trace!(resource_id = %id, "Discarding resolution for superseded binding");
            return false;
        }

        *self = match outcome {
            Ok(bytes) => ImageSlot::Resolved {
                id: Arc::from(id),
                bytes: Arc::clone(bytes),
            },
            Err(_) => ImageSlot::Failed { id: Arc::from(id) },
        };
        true
    }

    /// Resource id currently bound, in any state.
    pub fn bound_id(&self) -> Option<&str> {
        match self {
            ImageSlot::Unbound => None,
            ImageSlot::Requested { id }
            | ImageSlot::Resolved { id, .. }
            | ImageSlot::Failed { id } => Some(id),
        }
    }

    /// Id the slot is still waiting on, if any.
    pub fn requested_id(&self) -> Option<&Arc<str>> {
        match self {
            ImageSlot::Requested { id } => Some(id),
            _ => None,
        }
    }

    /// Resolved bytes, if the slot has them.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        match self {
            ImageSlot::Resolved { bytes, .. } => Some(Arc::clone(bytes)),
            _ => None,
        }
    }

    pub fn is_requested(&self) -> bool {
        matches!(self, ImageSlot::Requested { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ImageSlot::Failed { .. })
    }
}
