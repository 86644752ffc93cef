//! Feed list widget: one row block per post.
//!
//! Rows render from an immutable snapshot of the pager's post list plus
//! whatever media the cache has resolved so far. The photo line reflects
//! the row's slot state; a slot outside the bind window renders the plain
//! placeholder, since nothing is fetching for it.

use crate::app::{App, ROW_POOL};
use crate::feed::present;
use crate::media::ImageSlot;
use crate::util::{format_size, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::SPINNER;

/// Render the scrolling feed list.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let posts = app.pager.posts();
    let palette = &app.palette;

    let items: Vec<ListItem> = if posts.is_empty() {
        let text = if app.pager.in_flight() {
            "Loading feed..."
        } else {
            "No posts. Press r to refresh."
        };
        vec![ListItem::new(text)]
    } else {
        posts
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let slot = &app.row_slots[i % ROW_POOL];
                // A recycled slot only speaks for this post while it is
                // still bound to this post's media; otherwise its contents
                // belong to whichever row owned it last.
                let photo_slot = if slot.photo.bound_id() == Some(post.image.as_ref()) {
                    Some(&slot.photo)
                } else {
                    None
                };
                let avatar_bytes = match &post.author.avatar {
                    Some(avatar) if slot.avatar.bound_id() == Some(avatar.as_ref()) => {
                        slot.avatar.bytes()
                    }
                    _ => None,
                };

                let row = present(post, avatar_bytes, photo_slot.and_then(|s| s.bytes()));
                let avatar_marker = if row.avatar.is_some() { "●" } else { "○" };
                let (photo_text, photo_style) = match photo_slot {
                    Some(ImageSlot::Resolved { bytes, .. }) => (
                        format!("[ photo  {} ]", format_size(bytes.len())),
                        palette.media_ready,
                    ),
                    Some(ImageSlot::Requested { .. }) => (
                        format!(
                            "[ photo loading {} ]",
                            SPINNER[app.spinner_frame % SPINNER.len()]
                        ),
                        palette.media_pending,
                    ),
                    Some(ImageSlot::Failed { .. }) => {
                        ("[ photo unavailable ]".to_string(), palette.media_failed)
                    }
                    Some(ImageSlot::Unbound) | None => {
                        ("[ photo ]".to_string(), palette.media_pending)
                    }
                };

                let caption_width = (area.width as usize)
                    .saturating_sub(row.likes_label.len() + row.comments_label.len() + 12);

                let header = Line::from(vec![
                    Span::styled(avatar_marker, palette.feed_username),
                    Span::raw(" "),
                    Span::styled(row.username, palette.feed_username),
                    Span::raw("  "),
                    Span::styled(row.posted_at, palette.feed_date),
                ]);
                let photo = Line::from(vec![
                    Span::raw("  "),
                    Span::styled(photo_text, photo_style),
                ]);
                let body = Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        truncate_to_width(&row.caption, caption_width).into_owned(),
                        palette.feed_caption,
                    ),
                    Span::raw("  "),
                    Span::styled(row.likes_label, palette.feed_counts),
                    Span::raw("  "),
                    Span::styled(row.comments_label, palette.feed_counts),
                ]);

                ListItem::new(vec![header, photo, body])
            })
            .collect()
    };

    let title = if app.pager.in_flight() {
        format!(
            " gram {} {} posts ",
            SPINNER[app.spinner_frame % SPINNER.len()],
            posts.len()
        )
    } else {
        format!(" gram  {} posts ", posts.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.panel_border)
                .title(title),
        )
        .highlight_style(palette.feed_selected);

    let mut state = ListState::default();
    if !posts.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
