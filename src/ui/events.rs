//! Application event handling.
//!
//! This module applies background task completions — page fetches, media
//! resolutions, logout — to the `App` state. All mutation happens here on
//! the event-loop task; the tasks themselves only send messages.

use crate::app::{App, AppEvent};
use crate::feed::PageOutcome;
use tokio::sync::mpsc;

use super::helpers;
use super::Action;

/// Handle an event from a background task.
///
/// Returns [`Action::Quit`] when the event ends the session (a successful
/// logout); everything else continues the loop.
pub(super) fn handle_app_event(
    app: &mut App,
    event: AppEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match event {
        AppEvent::PageLoaded { result } => {
            app.page_handle = None;
            let was_refresh = app.pager.is_refreshing();

            match app.pager.complete(result) {
                PageOutcome::Applied { total, skipped } => {
                    tracing::info!(total, skipped, was_refresh, "Feed page applied");
                    app.clamp_selection();

                    if was_refresh {
                        // The list was replaced from the top; stale bindings
                        // would pin old media into recycled rows.
                        app.reset_row_slots();
                        if skipped > 0 {
                            app.set_status(format!(
                                "Loaded {} posts ({} malformed records skipped)",
                                total, skipped
                            ));
                        } else {
                            app.set_status(format!("Loaded {} posts", total));
                        }
                    }

                    let wanted = app.sync_row_bindings();
                    helpers::spawn_media_resolves(app, wanted, event_tx);
                }
                PageOutcome::Failed { error } => {
                    // The pager already rolled back; the posts on screen are
                    // untouched and the refresh indicator just stops.
                    tracing::warn!(error = %error, "Feed page fetch failed");
                    app.set_status(format!("Fetch failed: {}", error));
                }
                PageOutcome::Ignored => {
                    tracing::warn!("Page completion with no fetch in flight");
                }
            }
        }

        AppEvent::MediaResolved {
            resource_id,
            outcome,
        } => {
            // A delivery no slot accepts belongs to superseded bindings and
            // is dropped here; the bytes are still cached for later rows.
            let accepted = app.apply_media(&resource_id, &outcome);
            tracing::trace!(resource_id = %resource_id, accepted, "Media resolution applied");
        }

        AppEvent::LoggedOut { result } => {
            app.logout_pending = false;
            app.logout_handle = None;
            match result {
                Ok(()) => {
                    tracing::info!("Logged out, exiting");
                    return Action::Quit;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Logout failed");
                    app.set_status(format!("Logout failed: {}", error));
                }
            }
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            match task {
                "page_fetch" => {
                    // The fetch died without a result; roll the pager back
                    // so the next refresh or scroll can start a new one.
                    app.pager.abandon();
                    app.page_handle = None;
                }
                "logout" => {
                    app.logout_pending = false;
                    app.logout_handle = None;
                }
                _ => {}
            }
            app.set_status(format!("Internal error in {}", task));
        }
    }

    Action::Continue
}
