use crate::client::{ApiClient, FeedError, MediaError};
use crate::feed::{FeedPage, FeedPager, Post};
use crate::media::{ImageSlot, MediaCache};
use crate::theme::{ColorPalette, ThemeVariant};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;

// ============================================================================
// Row Media Slots
// ============================================================================

/// Number of recycled media slots for feed rows.
///
/// Slot for post `i` is `row_slots[i % ROW_POOL]`. The pool is larger than
/// the bind window, so a binding is never evicted while it is still inside
/// the window.
pub const ROW_POOL: usize = 16;

/// Rows above the selection that keep their media bound.
const BIND_BEHIND: usize = 3;

/// Rows below the selection bound ahead of the scroll direction.
const BIND_AHEAD: usize = 8;

/// Media bindings for one recycled row position.
///
/// As the selection moves, row positions are reused for different posts;
/// [`ImageSlot`] handles the rebinding and discards resolutions that arrive
/// for a post the position no longer shows.
#[derive(Debug, Default)]
pub struct RowSlots {
    pub avatar: ImageSlot,
    pub photo: ImageSlot,
}

// ============================================================================
// View and Detail State
// ============================================================================

/// Current view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,   // Scrolling list of posts
    Detail, // Full-screen single post
}

/// State for the full-screen detail view.
///
/// Owns a clone of the post so the view stays stable even if a refresh
/// replaces the feed list while it is open. The media slots are separate
/// from the row pool: closing the detail view drops them without touching
/// the feed bindings.
pub struct DetailState {
    pub post: Post,
    pub avatar: ImageSlot,
    pub photo: ImageSlot,
}

// ============================================================================
// Event Types
// ============================================================================

/// Events from background tasks
pub enum AppEvent {
    /// A feed page fetch finished.
    ///
    /// Carries the decoded page or the error; the pager decides whether to
    /// apply or roll back.
    PageLoaded {
        result: Result<FeedPage, FeedError>,
    },
    /// A media fetch settled, successfully or not.
    ///
    /// Fields:
    /// - `resource_id`: The media resource this outcome belongs to
    /// - `outcome`: The bytes or the error the cache recorded
    MediaResolved {
        resource_id: Arc<str>,
        outcome: Result<Arc<[u8]>, MediaError>,
    },
    /// The logout request finished.
    LoggedOut { result: Result<(), FeedError> },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "page_fetch")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: ApiClient,
    pub media: MediaCache,

    // Theme
    /// Current theme variant (for cycling).
    pub theme_variant: ThemeVariant,
    /// Active palette for all UI rendering.
    pub palette: ColorPalette,

    // Data
    /// Pagination state machine owning the loaded posts.
    pub pager: FeedPager,

    // UI State
    pub view: View,
    /// Index into the pager's post list.
    pub selected: usize,
    /// Detail view state, present only while `view == View::Detail`.
    pub detail: Option<DetailState>,

    // Media bindings
    /// Recycled media slots, indexed by `post_index % ROW_POOL`.
    pub row_slots: [RowSlots; ROW_POOL],
    /// Media ids with a resolve task spawned and not yet settled.
    ///
    /// Keeps one spawned task per id no matter how many slots bind it; the
    /// cache deduplicates the underlying fetch as well, so this set only
    /// avoids redundant task spawns on every binding pass.
    pub pending_media: HashSet<Arc<str>>,

    // In-flight operations
    /// True while a logout request is in flight.
    pub logout_pending: bool,
    /// Handle to the current page fetch task, aborted on App drop.
    pub page_handle: Option<tokio::task::JoinHandle<()>>,
    /// Handle to the logout task, aborted on App drop.
    pub logout_handle: Option<tokio::task::JoinHandle<()>>,

    // Status message with expiry — Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders.
    pub needs_redraw: bool,

    /// Current frame of the loading spinner animation (0-9).
    ///
    /// Incremented by the tick handler while a fetch or resolve is running.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(client: ApiClient, theme: ThemeVariant, page_size: u32) -> Self {
        let media = MediaCache::new(client.clone());
        Self {
            client,
            media,
            theme_variant: theme,
            palette: theme.palette(),
            pager: FeedPager::new(page_size),
            view: View::Feed,
            selected: 0,
            detail: None,
            row_slots: Default::default(),
            pending_media: HashSet::new(),
            logout_pending: false,
            page_handle: None,
            logout_handle: None,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.palette = variant.palette();
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant (Dark → Light → Dark).
    ///
    /// Returns the name of the new theme for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Clamp the selection to the post list.
    ///
    /// Call this after any operation that may shrink the list, such as a
    /// refresh completing with fewer posts than before.
    pub fn clamp_selection(&mut self) {
        self.selected = if self.pager.is_empty() {
            0
        } else {
            self.selected.min(self.pager.len().saturating_sub(1))
        };

        debug_assert!(
            self.pager.is_empty() || self.selected < self.pager.len(),
            "selected {} out of bounds for {} posts",
            self.selected,
            self.pager.len()
        );
    }

    /// Move the selection up by `rows`, saturating at the top.
    pub fn nav_up(&mut self, rows: usize) {
        self.selected = self.selected.saturating_sub(rows);
    }

    /// Move the selection down by `rows`, saturating at the last post.
    pub fn nav_down(&mut self, rows: usize) {
        if self.pager.is_empty() {
            return;
        }
        let max_index = self.pager.len().saturating_sub(1);
        self.selected = self.selected.saturating_add(rows).min(max_index);
    }

    pub fn nav_home(&mut self) {
        self.selected = 0;
    }

    pub fn nav_end(&mut self) {
        self.selected = self.pager.len().saturating_sub(1);
    }

    /// Get currently selected post (bounds-checked)
    pub fn selected_post(&self) -> Option<&Post> {
        self.pager.post(self.selected)
    }

    /// Rows between the selection and the last loaded post.
    ///
    /// This is the scroll offset fed to `FeedPager::on_scroll`: it reaches
    /// zero when the selection sits on the bottom row.
    pub fn rows_below_selection(&self) -> i64 {
        self.pager.len() as i64 - 1 - self.selected as i64
    }

    // ------------------------------------------------------------------
    // Media bindings
    // ------------------------------------------------------------------

    /// Rebind the media slots around the current selection.
    ///
    /// Walks the bind window (a few rows behind the selection, more ahead)
    /// and binds each post's photo and avatar into its recycled slot.
    /// Returns the media ids that now need a resolve spawned; the caller
    /// owns the spawning so this stays pure state.
    pub fn sync_row_bindings(&mut self) -> Vec<Arc<str>> {
        let mut wanted = Vec::new();
        let posts = self.pager.posts();

        if posts.is_empty() {
            self.reset_row_slots();
            return wanted;
        }

        let first = self.selected.saturating_sub(BIND_BEHIND);
        let last = self
            .selected
            .saturating_add(BIND_AHEAD)
            .min(posts.len() - 1);

        for index in first..=last {
            let post = &posts[index];
            let slot = &mut self.row_slots[index % ROW_POOL];
            match &post.author.avatar {
                Some(avatar) => {
                    bind_into(&mut slot.avatar, avatar, &mut self.pending_media, &mut wanted)
                }
                None => slot.avatar.reset(),
            }
            bind_into(&mut slot.photo, &post.image, &mut self.pending_media, &mut wanted);
        }

        wanted
    }

    /// Drop every row binding.
    ///
    /// Used when the post list is replaced: the next `sync_row_bindings`
    /// call rebinds the window against the new list, which is also what
    /// retries any slot that had failed.
    pub fn reset_row_slots(&mut self) {
        for slot in &mut self.row_slots {
            slot.avatar.reset();
            slot.photo.reset();
        }
    }

    /// Deliver a settled media resolution to every slot bound to it.
    ///
    /// Returns true when at least one slot accepted the delivery, i.e. the
    /// screen actually changed.
    pub fn apply_media(
        &mut self,
        resource_id: &str,
        outcome: &Result<Arc<[u8]>, MediaError>,
    ) -> bool {
        self.pending_media.remove(resource_id);

        let mut accepted = false;
        for slot in &mut self.row_slots {
            accepted |= slot.avatar.apply(resource_id, outcome);
            accepted |= slot.photo.apply(resource_id, outcome);
        }
        if let Some(detail) = &mut self.detail {
            accepted |= detail.avatar.apply(resource_id, outcome);
            accepted |= detail.photo.apply(resource_id, outcome);
        }
        accepted
    }

    /// True when any slot is still waiting on media.
    pub fn any_media_pending(&self) -> bool {
        let rows = self
            .row_slots
            .iter()
            .any(|slot| slot.avatar.is_requested() || slot.photo.is_requested());
        let detail = self
            .detail
            .as_ref()
            .is_some_and(|d| d.avatar.is_requested() || d.photo.is_requested());
        rows || detail
    }

    // ------------------------------------------------------------------
    // Detail view
    // ------------------------------------------------------------------

    /// Open the detail view for the selected post.
    ///
    /// The post is cloned out of the feed snapshot; the clone is what keeps
    /// the view stable while background refreshes replace the list. Returns
    /// the media ids that need a resolve spawned (usually none, since the
    /// feed view already requested them).
    pub fn enter_detail(&mut self) -> Vec<Arc<str>> {
        let post = match self.selected_post() {
            Some(post) => post.clone(),
            None => return Vec::new(),
        };

        let mut wanted = Vec::new();
        let mut detail = DetailState {
            post,
            avatar: ImageSlot::default(),
            photo: ImageSlot::default(),
        };
        if let Some(avatar) = &detail.post.author.avatar {
            bind_into(&mut detail.avatar, avatar, &mut self.pending_media, &mut wanted);
        }
        bind_into(
            &mut detail.photo,
            &detail.post.image,
            &mut self.pending_media,
            &mut wanted,
        );

        self.detail = Some(detail);
        self.view = View::Detail;
        self.needs_redraw = true;
        wanted
    }

    /// Leave the detail view back to the feed.
    ///
    /// The detail slots are dropped with their state; a resolve still in
    /// flight for them lands in the cache and benefits the feed rows.
    pub fn exit_detail(&mut self) {
        self.detail = None;
        self.view = View::Feed;
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Bind `id` into a slot and record whether a resolve must be spawned.
///
/// A resolve is needed when the binding just changed, or when the slot is
/// still waiting on an id no task is fetching (the fetch task died). The
/// `pending` set keeps the spawns deduplicated across slots.
fn bind_into(
    slot: &mut ImageSlot,
    id: &Arc<str>,
    pending: &mut HashSet<Arc<str>>,
    wanted: &mut Vec<Arc<str>>,
) {
    let newly_bound = slot.bind(id);
    let orphaned = slot
        .requested_id()
        .is_some_and(|waiting| !pending.contains(waiting.as_ref()));
    if (newly_bound || orphaned) && pending.insert(Arc::clone(id)) {
        wanted.push(Arc::clone(id));
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort in-flight async tasks on App drop.
///
/// Ensures proper cleanup when the application exits, preventing orphaned
/// tokio tasks from continuing to run after the main event loop terminates.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.page_handle.take() {
            handle.abort();
            tracing::debug!("Aborted page fetch task on App drop");
        }
        if let Some(handle) = self.logout_handle.take() {
            handle.abort();
            tracing::debug!("Aborted logout task on App drop");
        }
    }
}
