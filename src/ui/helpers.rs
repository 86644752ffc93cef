//! Task-spawning helpers for the UI layer.
//!
//! Every network operation runs in a spawned tokio task that reports back
//! over the `AppEvent` channel; nothing here touches `App` state after the
//! spawn. Panics inside a task are caught and converted into events so the
//! event loop always learns the task is gone.

use crate::app::{App, AppEvent};
use crate::client::MediaError;
use crate::feed::PageRequest;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Without this, a panicking background task is swallowed by the tokio
/// runtime and the event loop never hears about it — for a page fetch that
/// would leave the pager in flight forever.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn the page fetch the pager just planned.
///
/// The caller must only pass a request obtained from `begin_refresh` or
/// `on_scroll`, which guarantee nothing else is in flight; the previous
/// handle (if any) has therefore already completed and is just replaced.
pub(super) fn spawn_page_fetch(app: &mut App, request: PageRequest, event_tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let tx = event_tx.clone();

    tracing::debug!(limit = request.limit, "Spawning page fetch");

    app.page_handle = Some(tokio::spawn(async move {
        match catch_task_panic(client.fetch_page(request.limit)).await {
            Ok(result) => {
                if let Err(e) = tx.send(AppEvent::PageLoaded { result }).await {
                    tracing::warn!(error = %e, "Failed to send page result (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task = "page_fetch", error = %panic_msg, "Background task panicked");
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task: "page_fetch",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    }));
}

/// Spawn a cache resolve for each media id the binding pass requested.
///
/// One task per id; the cache deduplicates the underlying fetches, and
/// `App::pending_media` keeps this from spawning the same id twice. A panic
/// is reported as a failed resolution so the pending entry clears and the
/// slot falls back to its placeholder.
pub(super) fn spawn_media_resolves(
    app: &App,
    wanted: Vec<Arc<str>>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    for resource_id in wanted {
        let media = app.media.clone();
        let tx = event_tx.clone();

        tokio::spawn(async move {
            let outcome = match catch_task_panic(media.resolve(&resource_id)).await {
                Ok(outcome) => outcome,
                Err(panic_msg) => {
                    tracing::error!(
                        task = "media_resolve",
                        resource_id = %resource_id,
                        error = %panic_msg,
                        "Background task panicked"
                    );
                    Err(MediaError::Interrupted)
                }
            };

            if let Err(e) = tx
                .send(AppEvent::MediaResolved {
                    resource_id,
                    outcome,
                })
                .await
            {
                tracing::warn!(error = %e, "Failed to send media result (receiver dropped)");
            }
        });
    }
}

/// Spawn the logout request. No-op if one is already running.
pub(super) fn spawn_logout(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.logout_pending {
        tracing::debug!("Logout already in flight, ignoring");
        return;
    }
    app.logout_pending = true;

    let client = app.client.clone();
    let tx = event_tx.clone();

    app.logout_handle = Some(tokio::spawn(async move {
        match catch_task_panic(client.log_out()).await {
            Ok(result) => {
                if let Err(e) = tx.send(AppEvent::LoggedOut { result }).await {
                    tracing::warn!(error = %e, "Failed to send logout result (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task = "logout", error = %panic_msg, "Background task panicked");
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task: "logout",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    }));
}
