//! Pure mapping from a [`Post`] plus resolved media to renderable row data.
//!
//! No I/O and no state: the renderer calls [`present`] with whatever bytes
//! the media layer has resolved so far, and gets back display strings plus
//! the optional image payloads. Remote text is sanitized here so nothing
//! above this point has to remember to do it.

use std::sync::Arc;

use crate::feed::model::Post;
use crate::util::strip_control_chars;

/// Everything a row (or the detail view) needs to render one post.
#[derive(Debug, Clone)]
pub struct RowViewModel {
    pub username: String,
    pub caption: String,
    /// Short date, `M/D/YY`.
    pub posted_at: String,
    pub likes_label: String,
    pub comments_label: String,
    pub avatar: Option<Arc<[u8]>>,
    pub photo: Option<Arc<[u8]>>,
}

/// Build the view model for one post.
///
/// `avatar` and `photo` are whatever the media cache has resolved for this
/// post at render time; `None` renders as a placeholder.
pub fn present(
    post: &Post,
    avatar: Option<Arc<[u8]>>,
    photo: Option<Arc<[u8]>>,
) -> RowViewModel {
    RowViewModel {
        username: strip_control_chars(&post.author.username).into_owned(),
        caption: strip_control_chars(&post.caption).into_owned(),
        posted_at: post.created_at.format("%-m/%-d/%y").to_string(),
        likes_label: format!("{} likes", post.likes),
        comments_label: format!("{} comments", post.comments),
        avatar,
        photo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::model::Author;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn post_at(year: i32, month: u32, day: u32) -> Post {
        Post {
            id: Arc::from("p1"),
            caption: Arc::from("golden hour at the pier"),
            author: Author {
                id: Arc::from("u7"),
                username: Arc::from("kermit"),
                avatar: Some(Arc::from("m112")),
            },
            image: Arc::from("m907"),
            likes: 12,
            comments: 3,
            created_at: Utc.with_ymd_and_hms(year, month, day, 18, 2, 11).unwrap(),
        }
    }

    #[test]
    fn test_present_formats_row_fields() {
        let model = present(&post_at(2017, 6, 30), None, None);

        assert_eq!(model.username, "kermit");
        assert_eq!(model.caption, "golden hour at the pier");
        assert_eq!(model.posted_at, "6/30/17");
        assert_eq!(model.likes_label, "12 likes");
        assert_eq!(model.comments_label, "3 comments");
        assert!(model.avatar.is_none());
        assert!(model.photo.is_none());
    }

    #[test]
    fn test_date_is_unpadded() {
        let model = present(&post_at(2025, 12, 5), None, None);
        assert_eq!(model.posted_at, "12/5/25");
    }

    #[test]
    fn test_zero_counts_still_plural() {
        let mut post = post_at(2017, 6, 30);
        post.likes = 0;
        post.comments = 0;

        let model = present(&post, None, None);
        assert_eq!(model.likes_label, "0 likes");
        assert_eq!(model.comments_label, "0 comments");
    }

    #[test]
    fn test_resolved_bytes_pass_through() {
        let avatar: Arc<[u8]> = Arc::from(vec![1u8, 2, 3].into_boxed_slice());
        let photo: Arc<[u8]> = Arc::from(vec![9u8; 128].into_boxed_slice());

        let model = present(&post_at(2017, 6, 30), Some(avatar), Some(photo.clone()));
        assert_eq!(model.avatar.map(|b| b.len()), Some(3));
        assert_eq!(model.photo.map(|b| b.len()), Some(128));
        assert_eq!(photo.len(), 128);
    }

    #[test]
    fn test_remote_text_is_sanitized() {
        let mut post = post_at(2017, 6, 30);
        post.caption = Arc::from("look \x1b[31mred\x1b[0m sky");
        post.author.username = Arc::from("ker\x07mit");

        let model = present(&post, None, None);
        assert_eq!(model.caption, "look red sky");
        assert_eq!(model.username, "kermit");
    }
}
