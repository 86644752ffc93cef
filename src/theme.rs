//! Theme system for the TUI.
//!
//! Semantic color roles mapped to ratatui `Style` values. `ThemeVariant`
//! selects between the Dark and Light palettes; the variant can come from
//! the config file and is cycled at runtime with the theme key.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette — semantic roles to Style
// ============================================================================

/// A complete palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Feed rows --
    pub feed_username: Style,
    pub feed_date: Style,
    pub feed_caption: Style,
    pub feed_counts: Style,
    pub feed_selected: Style,

    // -- Media placeholders --
    pub media_ready: Style,
    pub media_pending: Style,
    pub media_failed: Style,

    // -- Detail view --
    pub detail_heading: Style,
    pub detail_body: Style,
    pub detail_metadata: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            feed_username: Style::default().add_modifier(Modifier::BOLD),
            feed_date: Style::default().fg(Color::DarkGray),
            feed_caption: Style::default(),
            feed_counts: Style::default().fg(Color::Yellow),
            feed_selected: Style::default().bg(Color::DarkGray).fg(Color::White),

            media_ready: Style::default().fg(Color::Blue),
            media_pending: Style::default().fg(Color::DarkGray),
            media_failed: Style::default().fg(Color::Red),

            detail_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_metadata: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
        }
    }

    /// Light palette — adapted for light terminal backgrounds.
    fn light() -> Self {
        Self {
            feed_username: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            feed_date: Style::default().fg(Color::DarkGray),
            feed_caption: Style::default().fg(Color::Black),
            feed_counts: Style::default().fg(Color::Magenta),
            feed_selected: Style::default().bg(Color::Blue).fg(Color::White),

            media_ready: Style::default().fg(Color::Blue),
            media_pending: Style::default().fg(Color::DarkGray),
            media_failed: Style::default().fg(Color::Red),

            detail_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_metadata: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_from_str_name() {
        assert_eq!(
            ThemeVariant::from_str_name("dark"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(
            ThemeVariant::from_str_name("Light"),
            Some(ThemeVariant::Light)
        );
        assert_eq!(
            ThemeVariant::from_str_name("DARK"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn variant_cycles_through_both() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next(), ThemeVariant::Dark);
    }

    #[test]
    fn dark_selection_style() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.feed_selected,
            Style::default().bg(Color::DarkGray).fg(Color::White)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.feed_selected, light.feed_selected);
        assert_ne!(dark.status_bar, light.status_bar);
    }
}
