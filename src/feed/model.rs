use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Author summary embedded in every post.
///
/// Denormalized at fetch time: the feed endpoint includes the author record
/// inline, so a post never needs a second lookup to render its byline.
/// `avatar` is the resource id of the profile image, absent for accounts
/// that never set one.
#[derive(Debug, Clone)]
pub struct Author {
    pub id: Arc<str>,
    pub username: Arc<str>,
    pub avatar: Option<Arc<str>>,
}

/// A single feed post.
///
/// Immutable once decoded. String fields use `Arc<str>` for cheap cloning
/// into event handlers and the detail view; the full list is shared as an
/// `Arc<Vec<Post>>` snapshot between the pager and the renderer.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Arc<str>,
    pub caption: Arc<str>,
    pub author: Author,
    /// Resource id of the post photo.
    pub image: Arc<str>,
    pub likes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
}

/// One decoded page of the feed, newest-first.
///
/// `skipped` counts records dropped during validation; the page itself is
/// still usable when some records fail to decode.
#[derive(Debug)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub skipped: usize,
}
