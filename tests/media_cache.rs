//! Integration tests for the media cache against a mock backend.
//!
//! These verify the cache's external contract end-to-end: one network fetch
//! per distinct resource id no matter how many resolvers ask, permanent
//! retention of resolved bytes, retry of failed entries, and the
//! discard-on-mismatch rule when a row slot is rebound mid-fetch.

use gram::client::{ApiClient, MediaError};
use gram::media::{ImageSlot, MediaCache};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cache_for(server: &MockServer) -> MediaCache {
    MediaCache::new(ApiClient::new(&server.uri(), None).unwrap())
}

fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

// ============================================================================
// Deduplication
// ============================================================================

#[tokio::test]
async fn test_concurrent_resolves_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/m1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![7u8; 32])
                // Delay keeps the first fetch in flight while the others
                // arrive and attach to it.
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let m1 = id("m1");

    let (a, b, c) = tokio::join!(cache.resolve(&m1), cache.resolve(&m1), cache.resolve(&m1));

    assert_eq!(a.unwrap().len(), 32);
    assert_eq!(b.unwrap().len(), 32);
    assert_eq!(c.unwrap().len(), 32);

    server.verify().await;
}

#[tokio::test]
async fn test_distinct_ids_fetch_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 8]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/media/m2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![2u8; 8]))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let (m1, m2) = (id("m1"), id("m2"));
    let (a, b) = tokio::join!(cache.resolve(&m1), cache.resolve(&m2));
    assert_eq!(a.unwrap()[0], 1);
    assert_eq!(b.unwrap()[0], 2);
}

// ============================================================================
// Retention and retry
// ============================================================================

#[tokio::test]
async fn test_resolved_bytes_are_never_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 16]))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let m1 = id("m1");

    let first = cache.resolve(&m1).await.unwrap();
    let second = cache.resolve(&m1).await.unwrap();

    // Same allocation handed out both times.
    assert!(Arc::ptr_eq(&first, &second));
    server.verify().await;
}

#[tokio::test]
async fn test_failed_entry_retries_on_next_resolve() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/m1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/media/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![4u8; 8]))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let m1 = id("m1");

    match cache.resolve(&m1).await.unwrap_err() {
        MediaError::HttpStatus(500) => {}
        e => panic!("Expected HttpStatus(500), got {:?}", e),
    }

    // The failure was not cached permanently: the next resolve fetches
    // again and succeeds.
    assert_eq!(cache.resolve(&m1).await.unwrap()[0], 4);
}

#[tokio::test]
async fn test_oversized_media_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 8 * 1024 * 1024 + 1]))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    match cache.resolve(&id("huge")).await.unwrap_err() {
        MediaError::TooLarge => {}
        e => panic!("Expected TooLarge, got {:?}", e),
    }
}

// ============================================================================
// Rebinding race
// ============================================================================

#[tokio::test]
async fn test_rebound_slot_discards_late_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/img-a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0xAAu8; 8])
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/media/img-b"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xBBu8; 8]))
        .mount(&server)
        .await;

    let cache = cache_for(&server);
    let (a, b) = (id("img-a"), id("img-b"));

    // The row requests a's image, then is recycled onto another post
    // before it arrives.
    let mut slot = ImageSlot::default();
    slot.bind(&a);
    let fetch_a = tokio::spawn({
        let cache = cache.clone();
        let a = Arc::clone(&a);
        async move { cache.resolve(&a).await }
    });

    slot.bind(&b);
    let outcome_b = cache.resolve(&b).await;
    assert!(slot.apply("img-b", &outcome_b));

    // a's bytes arrive late and must not be applied over b's.
    let outcome_a = fetch_a.await.unwrap();
    assert!(!slot.apply("img-a", &outcome_a));

    assert_eq!(slot.bytes().unwrap()[0], 0xBB);
    // The late result still landed in the cache for whoever binds it next.
    assert!(Arc::ptr_eq(
        &outcome_a.unwrap(),
        &cache.resolve(&a).await.unwrap()
    ));
}
