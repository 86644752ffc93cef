//! Feed domain: post records, pagination, and presentation.
//!
//! This module owns everything between the wire and the renderer:
//!
//! - **Records**: validated, immutable post data shared as `Arc` snapshots
//! - **Pagination**: the scroll/refresh state machine deciding when and how
//!   much to fetch
//! - **Presentation**: pure mapping from a post plus resolved media to
//!   renderable row data
//!
//! # Architecture
//!
//! The module is organized into three submodules:
//!
//! - [`model`] - `Post`, `Author`, and the decoded `FeedPage`
//! - [`pager`] - `FeedPager`, which owns the loaded posts and all loading
//!   state; it performs no I/O itself
//! - [`present`] - `present()`, the stateless row formatter
//!
//! # Example
//!
//! ```ignore
//! let mut pager = FeedPager::new(config.page_size);
//!
//! if let Some(request) = pager.begin_refresh() {
//!     // spawn a task that calls client.fetch_page(request.limit)
//!     // and later feed the result to pager.complete(..)
//! }
//! ```

pub mod model;
pub mod pager;
pub mod present;

pub use model::{Author, FeedPage, Post};
pub use pager::{FeedPager, PageOutcome, PageRequest};
pub use present::{present, RowViewModel};
