// Terminal text helpers. All widths are display columns, not bytes.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to fit within `width` columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return take_front(s, width);
    }
    format!("{}..", take_front(s, width - 2))
}

/// Keep the end of `s` that fits in `width` columns. Used for the edit
/// buffer so the caret stays visible.
pub(crate) fn tail_display(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = s.len();
    for (i, ch) in s.char_indices().rev() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > width {
            break;
        }
        used += cw;
        start = i;
    }
    s[start..].to_string()
}

/// Pad or truncate to exactly `width` columns, left-aligned.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let t = truncate_display(s, width);
    let w = display_width(&t);
    format!("{}{}", t, " ".repeat(width.saturating_sub(w)))
}

/// Pad or truncate to exactly `width` columns, right-aligned.
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let t = truncate_display(s, width);
    let w = display_width(&t);
    format!("{}{}", " ".repeat(width.saturating_sub(w)), t)
}

/// Numbers align right in a cell, everything else left.
pub(crate) fn align_cell(s: &str, width: usize) -> String {
    if s.trim().parse::<f64>().is_ok() {
        pad_left(s, width)
    } else {
        pad_right(s, width)
    }
}

fn take_front(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > width {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out
}
