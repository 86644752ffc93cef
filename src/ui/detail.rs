//! Full-screen detail view for a single post.
//!
//! The detail state owns a clone of the post, so the view stays put while
//! refreshes replace the feed behind it. Terminals cannot draw the photo
//! bytes themselves; the photo block reports what the media layer has
//! (resolved size, still loading, failed) the way a placeholder image
//! would.

use crate::app::{App, DetailState};
use crate::feed::present;
use crate::media::ImageSlot;
use crate::util::format_size;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::SPINNER;

/// Render the detail view for the open post.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.detail else {
        // Should not happen: the view switches back to Feed when the detail
        // state is dropped.
        return;
    };
    let palette = &app.palette;

    let row = present(&detail.post, detail.avatar.bytes(), detail.photo.bytes());

    let lines = vec![
        Line::from(vec![
            Span::styled(avatar_marker(detail), palette.detail_metadata),
            Span::raw(" "),
            Span::styled(row.username, palette.detail_heading),
        ]),
        Line::from(Span::styled(row.posted_at, palette.detail_metadata)),
        Line::default(),
        Line::from(Span::styled(photo_line(app, detail), photo_style(app, detail))),
        Line::default(),
        Line::from(Span::styled(row.caption, palette.detail_body)),
        Line::default(),
        Line::from(vec![
            Span::styled(row.likes_label, palette.detail_metadata),
            Span::raw("  "),
            Span::styled(row.comments_label, palette.detail_metadata),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.panel_border)
                .title(" post "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

fn avatar_marker(detail: &DetailState) -> &'static str {
    match detail.avatar {
        ImageSlot::Resolved { .. } => "●",
        ImageSlot::Requested { .. } => "◌",
        _ => "○",
    }
}

fn photo_line(app: &App, detail: &DetailState) -> String {
    match &detail.photo {
        ImageSlot::Resolved { bytes, .. } => {
            format!("[ photo  {} ]", format_size(bytes.len()))
        }
        ImageSlot::Requested { .. } => {
            format!("[ photo loading {} ]", SPINNER[app.spinner_frame % SPINNER.len()])
        }
        ImageSlot::Failed { .. } => "[ photo unavailable ]".to_string(),
        ImageSlot::Unbound => "[ no photo ]".to_string(),
    }
}

fn photo_style(app: &App, detail: &DetailState) -> ratatui::style::Style {
    match &detail.photo {
        ImageSlot::Resolved { .. } => app.palette.media_ready,
        ImageSlot::Failed { .. } => app.palette.media_failed,
        _ => app.palette.media_pending,
    }
}
