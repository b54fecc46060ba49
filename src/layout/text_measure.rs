//! Text Measurement
//!
//! Sizes text in cells: one cell per character, one row per line, with
//! lines longer than the available width wrapping onto extra rows.

/// Width of the widest line, in cells.
pub fn text_width(text: &str) -> u16 {
    text.lines()
        .map(line_width)
        .max()
        .unwrap_or(0)
}

/// Rows needed to show `text` wrapped at `available_width`.
///
/// Empty text takes no rows; an empty line inside text still takes one.
pub fn text_height(text: &str, available_width: u16) -> u16 {
    if text.is_empty() {
        return 0;
    }
    let available_width = available_width.max(1);
    text.lines()
        .map(|line| line_width(line).div_ceil(available_width).max(1))
        .fold(0u16, u16::saturating_add)
}

fn line_width(line: &str) -> u16 {
    line.chars()
        .filter(|c| !c.is_control())
        .count()
        .min(u16::MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("Hello"), 5);
        assert_eq!(text_width("ab\nabcd\nc"), 4);
        assert_eq!(text_width("héllo"), 5);
    }

    #[test]
    fn test_text_height_wraps() {
        assert_eq!(text_height("", 10), 0);
        assert_eq!(text_height("Hello", 10), 1);
        assert_eq!(text_height("Hello", 2), 3);
        assert_eq!(text_height("a\n\nb", 10), 3);
        assert_eq!(text_height("abc", 0), 3);
    }
}
