use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Ellipsis appended when text is cut
const ELLIPSIS: &str = "...";
/// Display width of the ellipsis
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width, appending
/// "..." when anything was cut.
///
/// Width is measured per character with `unicode-width`, so CJK glyphs and
/// emoji count as two columns and combining marks as zero. Runs in a single
/// pass and returns the input borrowed when it already fits, which is the
/// common case on render-heavy paths.
///
/// Widths of 3 or less cannot hold content plus an ellipsis; those return
/// as many whole characters as fit, with no ellipsis.
///
/// # Examples
///
/// ```
/// use gram::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("golden hour", 20), "golden hour");
/// assert_eq!(truncate_to_width("golden hour at the pier", 10), "golden ...");
/// assert_eq!(truncate_to_width("wide", 2), "wi");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut width = 0;
        for (idx, c) in s.char_indices() {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if width + w > max_width {
                return Cow::Owned(s[..idx].to_string());
            }
            width += w;
        }
        return Cow::Borrowed(s);
    }

    let target = max_width - ELLIPSIS_WIDTH;
    let mut width = 0;
    let mut cut: Option<usize> = None;

    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);

        // First char that would stick out past the ellipsis budget marks
        // where a cut would happen.
        if cut.is_none() && width + w > target {
            cut = Some(idx);
        }

        if width + w > max_width {
            let at = cut.unwrap_or(idx);
            return Cow::Owned(format!("{}{}", &s[..at], ELLIPSIS));
        }

        width += w;
    }

    Cow::Borrowed(s)
}

/// Strips terminal control characters and ANSI escape sequences from
/// remote text before it reaches the terminal.
///
/// Removed: C0 controls other than tab/newline/CR, DEL, CSI sequences
/// (`ESC [` through their final byte), OSC sequences (`ESC ]` through BEL
/// or `ESC \`), and bare ESC bytes. Clean input comes back borrowed after
/// a single byte scan.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let needs_strip = s
        .bytes()
        .any(|b| b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r'));

    if !needs_strip {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI: parameter and intermediate bytes end at the
                    // first byte in 0x40..=0x7e.
                    for ch in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&ch) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    // OSC: runs until BEL or the two-byte ST terminator.
                    while let Some(ch) = chars.next() {
                        if ch == '\x07' {
                            break;
                        }
                        if ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {} // bare ESC dropped, following char stands on its own
            },
            '\x7f' => {}
            c if c < '\x20' && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

/// Formats a byte count for display: `B` below 1 KB, otherwise `KB`/`MB`
/// with one decimal.
///
/// # Examples
///
/// ```
/// use gram::util::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(35_021), "34.2 KB");
/// ```
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // truncate_to_width
    // ========================================================================

    #[test]
    fn test_fitting_text_is_borrowed() {
        let result = truncate_to_width("short caption", 40);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "short caption");
    }

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("12345", 5), "12345");
    }

    #[test]
    fn test_wide_glyph_truncation() {
        // CJK glyphs occupy two columns each.
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
        assert_eq!(truncate_to_width("你好", 10), "你好");
        assert_eq!(truncate_to_width("你好世界", 5), "你...");
    }

    #[test]
    fn test_narrow_widths_cut_without_ellipsis() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 2), "Te");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
        // A two-column glyph does not fit in one column.
        assert_eq!(truncate_to_width("你好", 1), "");
        assert_eq!(truncate_to_width("你好", 2), "你");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let mixed = "pier 日本語 sunset";
        let result = truncate_to_width(mixed, 9);
        assert!(result.len() <= mixed.len());
        assert!(std::str::from_utf8(result.as_bytes()).is_ok());
    }

    // ========================================================================
    // strip_control_chars
    // ========================================================================

    #[test]
    fn test_clean_text_is_borrowed() {
        let input = "an ordinary caption, nothing hiding";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_tabs_and_newlines_survive() {
        let input = "line one\nline two\ttabbed\r\n";
        assert_eq!(strip_control_chars(input), input);
    }

    #[test]
    fn test_c0_controls_and_del_are_dropped() {
        assert_eq!(strip_control_chars("he\x00ll\x07o\x08!"), "hello!");
        assert_eq!(strip_control_chars("gone\x7fbyte"), "gonebyte");
    }

    #[test]
    fn test_csi_sequences_are_dropped_whole() {
        assert_eq!(strip_control_chars("\x1b[31mred\x1b[0m sky"), "red sky");
        assert_eq!(strip_control_chars("up\x1b[2Adown"), "updown");
    }

    #[test]
    fn test_osc_sequences_are_dropped_whole() {
        assert_eq!(
            strip_control_chars("\x1b]0;new title\x07caption"),
            "caption"
        );
        assert_eq!(
            strip_control_chars("\x1b]0;new title\x1b\\caption"),
            "caption"
        );
    }

    #[test]
    fn test_bare_esc_is_dropped_alone() {
        assert_eq!(strip_control_chars("a\x1bb"), "ab");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_eq!(
            strip_control_chars("空 \x1b[35m紫\x1b[0m 雲"),
            "空 紫 雲"
        );
    }

    #[test]
    fn test_empty_input() {
        let result = strip_control_chars("");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    // ========================================================================
    // format_size
    // ========================================================================

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }
}
