//! Input handling for the TUI.
//!
//! Keys route by the current view. Navigation in the feed view is what
//! drives pagination: every user-driven move toward the bottom reports the
//! new scroll position to the pager, which decides whether the next
//! cumulative page should be fetched.

use crate::app::{App, AppEvent, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers;
use super::Action;

/// Rows moved by a half-page jump.
const PAGE_JUMP: usize = 10;

/// Handle a key press, dispatching by view.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Ctrl+C quits from anywhere.
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    match app.view {
        View::Feed => handle_feed_input(app, code, modifiers, event_tx),
        View::Detail => handle_detail_input(app, code),
    }
}

fn handle_feed_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),

        // -- Navigation --
        KeyCode::Char('j') | KeyCode::Down => {
            app.nav_down(1);
            after_user_move(app, true, event_tx);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.nav_up(1);
            after_user_move(app, false, event_tx);
        }
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.nav_down(PAGE_JUMP);
            after_user_move(app, true, event_tx);
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.nav_up(PAGE_JUMP);
            after_user_move(app, false, event_tx);
        }
        KeyCode::PageDown => {
            app.nav_down(PAGE_JUMP);
            after_user_move(app, true, event_tx);
        }
        KeyCode::PageUp => {
            app.nav_up(PAGE_JUMP);
            after_user_move(app, false, event_tx);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.nav_home();
            after_user_move(app, false, event_tx);
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.nav_end();
            after_user_move(app, true, event_tx);
        }

        // -- Actions --
        KeyCode::Enter => {
            let wanted = app.enter_detail();
            helpers::spawn_media_resolves(app, wanted, event_tx);
        }
        KeyCode::Char('r') => {
            // A refresh already in flight coalesces into a no-op; the
            // indicator is already showing.
            if let Some(request) = app.pager.begin_refresh() {
                helpers::spawn_page_fetch(app, request, event_tx);
            }
        }
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KeyCode::Char('L') => {
            app.set_status("Logging out...");
            helpers::spawn_logout(app, event_tx);
        }

        _ => {}
    }

    Ok(Action::Continue)
}

fn handle_detail_input(app: &mut App, code: KeyCode) -> Result<Action> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') | KeyCode::Enter => {
            app.exit_detail()
        }
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Follow-up work after the selection moved.
///
/// Rebinds the media window around the new selection, and for moves toward
/// the bottom reports the scroll position to the pager. Only key presses
/// come through here, so the pager's user-drag condition holds;
/// programmatic clamps after a refresh shrink never self-trigger a load.
fn after_user_move(app: &mut App, toward_bottom: bool, event_tx: &mpsc::Sender<AppEvent>) {
    let wanted = app.sync_row_bindings();
    helpers::spawn_media_resolves(app, wanted, event_tx);

    if toward_bottom {
        if let Some(request) = app.pager.on_scroll(app.rows_below_selection(), true) {
            helpers::spawn_page_fetch(app, request, event_tx);
        }
    }
}
