use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

use super::SPINNER;

/// Render the status bar.
///
/// Priority: in-flight fetch indicator, then the transient status message,
/// then the static key hints for the current view.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-size areas before touching the layout.
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if app.pager.is_refreshing() {
        Cow::Owned(format!(
            "{} Refreshing feed...",
            SPINNER[app.spinner_frame % SPINNER.len()]
        ))
    } else if app.pager.is_loading() {
        Cow::Owned(format!(
            "{} Loading page {}...",
            SPINNER[app.spinner_frame % SPINNER.len()],
            app.pager.page_count()
        ))
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.view {
            View::Feed => {
                Cow::Borrowed("[j/k]move [Enter]open [r]efresh [t]heme [L]ogout [q]uit")
            }
            View::Detail => Cow::Borrowed("[Esc/q]back [t]heme"),
        }
    };

    let paragraph = Paragraph::new(text).style(app.palette.status_bar);
    f.render_widget(paragraph, area);
}
