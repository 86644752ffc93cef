//! Deduplicating, never-evicting media byte cache.
//!
//! One cache entry exists per resource id. The first resolve for an id
//! installs a pending entry and spawns the fetch; every concurrent resolve
//! for the same id attaches to that fetch instead of starting another.
//! Resolved entries live for the life of the process. Failed entries are
//! replaced with a fresh fetch on the next resolve, so a transient error
//! never sticks.
//!
//! Ordering invariant: the fetch task stores the terminal entry in the map
//! strictly before waking waiters. A resolver that observes a pending entry
//! subscribes under the same lock acquisition, so it can never miss the
//! wake; a resolver arriving later finds the terminal entry directly.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::{broadcast, Semaphore};

use crate::client::{ApiClient, MediaError};

/// Concurrent media fetches allowed across the whole cache.
const MEDIA_CONCURRENCY: usize = 4;
/// Broadcast capacity per entry; exactly one terminal message is sent.
const WAKE_CAPACITY: usize = 1;

enum MediaEntry {
    /// Fetch in flight; waiters subscribe to the channel.
    Pending(broadcast::Sender<Result<Arc<[u8]>, MediaError>>),
    Resolved(Arc<[u8]>),
    Failed(MediaError),
}

/// Shared cache of media blobs keyed by resource id. Cheap to clone.
#[derive(Clone)]
pub struct MediaCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<HashMap<Arc<str>, MediaEntry>>,
    limiter: Arc<Semaphore>,
    client: ApiClient,
}

impl CacheInner {
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<Arc<str>, MediaEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaCache {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                limiter: Arc::new(Semaphore::new(MEDIA_CONCURRENCY)),
                client,
            }),
        }
    }

    /// Resolve a resource id to its bytes.
    ///
    /// Resolved entries return immediately. A resolve while a fetch for the
    /// same id is in flight attaches to it; an absent or failed entry
    /// starts a fresh fetch. Underlying fetches run through a small
    /// semaphore, attachment is unbounded.
    pub async fn resolve(&self, resource_id: &Arc<str>) -> Result<Arc<[u8]>, MediaError> {
        let mut rx = {
            let mut entries = self.inner.lock_entries();

            let attached = match entries.get(resource_id.as_ref()) {
                Some(MediaEntry::Resolved(bytes)) => {
                    tracing::trace!(resource_id = %resource_id, "Media cache hit");
                    return Ok(Arc::clone(bytes));
                }
                Some(MediaEntry::Pending(tx)) => {
                    tracing::trace!(resource_id = %resource_id, "Attaching to in-flight media fetch");
                    Some(tx.subscribe())
                }
                Some(MediaEntry::Failed(prior)) => {
                    tracing::debug!(
                        resource_id = %resource_id,
                        prior_error = %prior,
                        "Retrying previously failed media fetch"
                    );
                    None
                }
                None => None,
            };

            match attached {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = broadcast::channel(WAKE_CAPACITY);
                    entries.insert(Arc::clone(resource_id), MediaEntry::Pending(tx.clone()));
                    self.spawn_fetch(resource_id, tx);
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(result) => result,
            Err(_) => Err(MediaError::Interrupted),
        }
    }

    fn spawn_fetch(
        &self,
        resource_id: &Arc<str>,
        tx: broadcast::Sender<Result<Arc<[u8]>, MediaError>>,
    ) {
        let inner = Arc::clone(&self.inner);
        let id = Arc::clone(resource_id);

        tokio::spawn(async move {
            let fetch = {
                let client = inner.client.clone();
                let limiter = Arc::clone(&inner.limiter);
                let id = Arc::clone(&id);
                async move {
                    let _permit = limiter
                        .acquire_owned()
                        .await
                        .map_err(|_| MediaError::Interrupted)?;
                    client.fetch_media(&id).await
                }
            };

            // A panic must still produce a terminal entry, or waiters hang
            // and the id stays pending forever.
            let result = AssertUnwindSafe(fetch)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(MediaError::Interrupted));

            match &result {
                Ok(bytes) => {
                    tracing::debug!(resource_id = %id, bytes = bytes.len(), "Media resolved")
                }
                Err(e) => tracing::debug!(resource_id = %id, error = %e, "Media fetch failed"),
            }

            {
                let mut entries = inner.lock_entries();
                let entry = match &result {
                    Ok(bytes) => MediaEntry::Resolved(Arc::clone(bytes)),
                    Err(e) => MediaEntry::Failed(e.clone()),
                };
                entries.insert(Arc::clone(&id), entry);
            }

            // Store first, wake second; see the module-level invariant.
            let _ = tx.send(result);
        });
    }
}
