//! HTTP access to the feed backend.
//!
//! Split into:
//! - **api**: [`ApiClient`] over reqwest, with per-request timeouts, retry
//!   for transient page-fetch failures, size-limited body reads, and the
//!   session-token header
//! - **decode**: validated decoding of feed responses into domain records
//!
//! The backend is opaque to the rest of the crate; everything above this
//! module works in terms of [`ApiClient`] and the error types it returns.

mod api;
mod decode;

pub use api::{ApiClient, FeedError, MediaError};
