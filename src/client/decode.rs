//! Wire-format decoding for the feed endpoint.
//!
//! Records are validated individually: the raw shape deserializes with every
//! field optional, then promotion to [`Post`] checks each required field. A
//! record that fails promotion is dropped and counted, not propagated, so one
//! bad record never takes down the page. Only a malformed envelope fails the
//! whole response.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::feed::model::{Author, FeedPage, Post};

/// Response envelope: `{"results": [...]}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    results: Vec<serde_json::Value>,
}

/// Raw post record before validation. Every field is optional here;
/// `promote` decides what is required.
#[derive(Debug, Deserialize)]
struct RawPost {
    id: Option<String>,
    caption: Option<String>,
    image: Option<String>,
    likes: Option<i64>,
    comments: Option<i64>,
    created_at: Option<String>,
    author: Option<RawAuthor>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    id: Option<String>,
    username: Option<String>,
    avatar: Option<String>,
}

/// Decode a feed response body into validated posts.
///
/// Returns `Err` only when the envelope itself is not the expected JSON
/// shape. Individual malformed records are dropped and reported via
/// `FeedPage::skipped`.
pub(super) fn decode_page(bytes: &[u8]) -> Result<FeedPage, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;

    let mut posts = Vec::with_capacity(envelope.results.len());
    let mut skipped = 0usize;

    for value in envelope.results {
        match promote(value) {
            Ok(post) => posts.push(post),
            Err(reason) => {
                skipped += 1;
                tracing::debug!(reason = %reason, "Dropping malformed feed record");
            }
        }
    }

    Ok(FeedPage { posts, skipped })
}

/// Validate one raw record into a `Post`.
///
/// A wrong-typed field fails `from_value` for the whole record; a missing or
/// empty required field fails here with the field name as the reason.
fn promote(value: serde_json::Value) -> Result<Post, String> {
    let raw: RawPost =
        serde_json::from_value(value).map_err(|e| format!("record shape: {e}"))?;

    let id = required(raw.id, "id")?;
    let caption = raw.caption.ok_or("missing caption")?;
    let image = required(raw.image, "image")?;
    let likes = raw.likes.ok_or("missing likes")?;
    let comments = raw.comments.ok_or("missing comments")?;
    let created_at = raw.created_at.ok_or("missing created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad created_at: {e}"))?;

    let raw_author = raw.author.ok_or("missing author")?;
    let author = Author {
        id: Arc::from(required(raw_author.id, "author.id")?),
        username: Arc::from(required(raw_author.username, "author.username")?),
        avatar: raw_author.avatar.filter(|s| !s.is_empty()).map(Arc::from),
    };

    Ok(Post {
        id: Arc::from(id),
        caption: Arc::from(caption),
        author,
        image: Arc::from(image),
        likes,
        comments,
        created_at,
    })
}

/// Identifier fields must be present and non-empty; an empty id cannot key a
/// cache entry or build a fetch path.
fn required(field: Option<String>, name: &'static str) -> Result<String, String> {
    match field {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(format!("empty {name}")),
        None => Err(format!("missing {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "caption": "golden hour",
            "image": "m907",
            "likes": 12,
            "comments": 3,
            "created_at": "2017-06-30T18:02:11Z",
            "author": { "id": "u7", "username": "kermit", "avatar": "m112" }
        })
    }

    fn body(records: Vec<serde_json::Value>) -> Vec<u8> {
        serde_json::to_vec(&json!({ "results": records })).unwrap()
    }

    #[test]
    fn test_decode_valid_page() {
        let page = decode_page(&body(vec![record("p1"), record("p2")])).unwrap();

        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.skipped, 0);

        let post = &page.posts[0];
        assert_eq!(post.id.as_ref(), "p1");
        assert_eq!(post.caption.as_ref(), "golden hour");
        assert_eq!(post.image.as_ref(), "m907");
        assert_eq!(post.likes, 12);
        assert_eq!(post.comments, 3);
        assert_eq!(post.author.username.as_ref(), "kermit");
        assert_eq!(post.author.avatar.as_deref(), Some("m112"));
        assert_eq!(post.created_at.to_rfc3339(), "2017-06-30T18:02:11+00:00");
    }

    #[test]
    fn test_decode_empty_results() {
        let page = decode_page(&body(vec![])).unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.skipped, 0);
    }

    #[test]
    fn test_missing_caption_drops_record() {
        let mut bad = record("p1");
        bad.as_object_mut().unwrap().remove("caption");

        let page = decode_page(&body(vec![bad, record("p2")])).unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].id.as_ref(), "p2");
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_wrong_typed_likes_drops_record() {
        let mut bad = record("p1");
        bad["likes"] = json!("twelve");

        let page = decode_page(&body(vec![bad])).unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_unparseable_timestamp_drops_record() {
        let mut bad = record("p1");
        bad["created_at"] = json!("yesterday-ish");

        let page = decode_page(&body(vec![bad])).unwrap();
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_missing_author_username_drops_record() {
        let mut bad = record("p1");
        bad["author"] = json!({ "id": "u7" });

        let page = decode_page(&body(vec![bad])).unwrap();
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_avatar_is_optional() {
        let mut rec = record("p1");
        rec["author"] = json!({ "id": "u7", "username": "kermit" });

        let page = decode_page(&body(vec![rec])).unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].author.avatar, None);
        assert_eq!(page.skipped, 0);
    }

    #[test]
    fn test_empty_id_drops_record() {
        let mut bad = record("p1");
        bad["id"] = json!("  ");

        let page = decode_page(&body(vec![bad])).unwrap();
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_empty_caption_is_allowed() {
        let mut rec = record("p1");
        rec["caption"] = json!("");

        let page = decode_page(&body(vec![rec])).unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].caption.as_ref(), "");
    }

    #[test]
    fn test_malformed_envelope_fails_page() {
        assert!(decode_page(b"[1, 2, 3]").is_err());
        assert!(decode_page(b"not json at all").is_err());
    }
}
