//! Pagination state machine for the feed.
//!
//! The pager performs no I/O. [`FeedPager::begin_refresh`] and
//! [`FeedPager::on_scroll`] decide whether a fetch should start and return
//! the request plan; the caller spawns the network task and later applies
//! the outcome through [`FeedPager::complete`]. Every transition runs on the
//! event-loop task, so the state needs no locking.
//!
//! The backend exposes a single `limit` parameter with no offset, so each
//! request covers the cumulative window `page_size * page_count` from the
//! top of the feed. A successful fetch therefore fully supersedes the
//! previous result set, and duplicates are impossible by construction.

use std::collections::HashSet;
use std::sync::Arc;

use crate::client::FeedError;
use crate::feed::model::{FeedPage, Post};

/// Plan for one page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Cumulative window size to request, newest-first from the top.
    pub limit: u32,
}

/// Result of applying a finished fetch to the pager.
#[derive(Debug)]
pub enum PageOutcome {
    /// The result set was replaced. `skipped` records were dropped during
    /// decoding.
    Applied { total: usize, skipped: usize },
    /// The fetch failed; state rolled back to its pre-fetch configuration.
    Failed { error: FeedError },
    /// Nothing was in flight; the completion was dropped.
    Ignored,
}

/// Owns the loaded posts and all pagination state.
pub struct FeedPager {
    page_size: u32,
    posts: Arc<Vec<Post>>,
    /// Number of pages in the current window. Never below 1.
    page_count: u32,
    /// True while a scroll-triggered fetch is in flight.
    is_loading: bool,
    /// True while a refresh (or the initial load) is in flight.
    is_refreshing: bool,
    /// Page count to restore if the in-flight fetch fails.
    rollback_page_count: Option<u32>,
}

impl FeedPager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            posts: Arc::new(Vec::new()),
            page_count: 1,
            is_loading: false,
            is_refreshing: false,
            rollback_page_count: None,
        }
    }

    /// Start a refresh: reset the window to one page and request it.
    ///
    /// The initial load is this same operation. Returns `None` while any
    /// fetch is in flight; a refresh requested during one coalesces into
    /// the fetch already running.
    pub fn begin_refresh(&mut self) -> Option<PageRequest> {
        if self.in_flight() {
            tracing::debug!("Refresh requested while a fetch is in flight, coalescing");
            return None;
        }

        self.rollback_page_count = Some(self.page_count);
        self.page_count = 1;
        self.is_refreshing = true;
        Some(PageRequest {
            limit: self.page_size,
        })
    }

    /// Report a scroll position and maybe start the next page.
    ///
    /// `offset_from_bottom` is the distance between the viewport and the
    /// end of the loaded posts; zero or negative means the bottom has been
    /// reached. A fetch starts only when the movement came from the user,
    /// the bottom is reached, and nothing is already in flight.
    pub fn on_scroll(
        &mut self,
        offset_from_bottom: i64,
        is_user_dragging: bool,
    ) -> Option<PageRequest> {
        if self.in_flight() || !is_user_dragging || offset_from_bottom > 0 {
            return None;
        }

        self.rollback_page_count = Some(self.page_count);
        self.page_count = self.page_count.saturating_add(1);
        self.is_loading = true;
        Some(PageRequest {
            limit: self.page_size.saturating_mul(self.page_count),
        })
    }

    /// Apply a finished fetch.
    ///
    /// Success replaces the whole result set; the window is cumulative, so
    /// the new page supersedes everything already loaded. Failure restores
    /// the page count captured when the fetch began and leaves the posts
    /// untouched. Both paths clear the loading flags.
    pub fn complete(&mut self, result: Result<FeedPage, FeedError>) -> PageOutcome {
        if !self.in_flight() {
            tracing::warn!("Fetch completion arrived with nothing in flight, ignoring");
            return PageOutcome::Ignored;
        }

        let rollback = self.rollback_page_count.take();
        self.is_loading = false;
        self.is_refreshing = false;

        match result {
            Ok(page) => {
                debug_assert!(
                    no_duplicate_ids(&page.posts),
                    "duplicate post ids in fetched page"
                );
                let total = page.posts.len();
                let skipped = page.skipped;
                self.posts = Arc::new(page.posts);
                PageOutcome::Applied { total, skipped }
            }
            Err(error) => {
                if let Some(prior) = rollback {
                    self.page_count = prior;
                }
                PageOutcome::Failed { error }
            }
        }
    }

    /// Drop the in-flight fetch without a result (the task died before
    /// reporting). Rolls back like a failure, with no error to surface.
    pub fn abandon(&mut self) {
        if !self.in_flight() {
            return;
        }
        if let Some(prior) = self.rollback_page_count.take() {
            self.page_count = prior;
        }
        self.is_loading = false;
        self.is_refreshing = false;
    }

    /// Snapshot of the loaded posts, newest-first.
    pub fn posts(&self) -> Arc<Vec<Post>> {
        Arc::clone(&self.posts)
    }

    pub fn post(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    /// True while any page fetch is in flight.
    pub fn in_flight(&self) -> bool {
        self.is_loading || self.is_refreshing
    }
}

fn no_duplicate_ids(posts: &[Post]) -> bool {
    let mut seen = HashSet::with_capacity(posts.len());
    posts.iter().all(|post| seen.insert(Arc::clone(&post.id)))
}
