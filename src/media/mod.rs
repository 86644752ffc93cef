//! Media blob fetching and per-row image binding.
//!
//! Two layers with one rule each:
//!
//! - **cache**: [`MediaCache`] guarantees at most one network fetch per
//!   distinct resource id, with concurrent resolves attaching to the fetch
//!   already in flight
//! - **binding**: [`ImageSlot`] guarantees a recycled row never shows bytes
//!   fetched for a post it is no longer displaying
//!
//! There is no cancellation: a fetch whose requester rebound runs to
//! completion, lands in the cache for whoever needs it next, and its
//! delivery is discarded by the slot's id check.

pub mod binding;
pub mod cache;

pub use binding::ImageSlot;
pub use cache::MediaCache;
