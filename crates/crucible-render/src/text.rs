//! Text measurement, wrapping and truncation in terminal cells.

use crate::ansi::visible_width;
use crate::style::TextWrap;
use textwrap::{wrap, Options, WordSplitter};
use unicode_width::UnicodeWidthChar;

pub const ELLIPSIS: char = '…';

/// Lays `content` out into lines no wider than `width` according to `mode`.
///
/// `None` means unconstrained: content is split on newlines only. A width of
/// zero has room for nothing and produces no lines, as does empty content.
pub fn layout_text(content: &str, width: Option<usize>, mode: TextWrap) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let source = content.split('\n');
    let Some(width) = width else {
        return source.map(String::from).collect();
    };
    if width == 0 {
        return Vec::new();
    }

    match mode {
        TextWrap::Wrap => source.flat_map(|line| wrap_line(line, width)).collect(),
        other => source.map(|line| truncate(line, width, other)).collect(),
    }
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if visible_width(line) <= width {
        return vec![line.to_string()];
    }
    let options = Options::new(width).word_splitter(WordSplitter::NoHyphenation);
    wrap(line, options)
        .into_iter()
        .map(|cow| {
            // A wide character can still overflow a very narrow column.
            if visible_width(&cow) > width {
                take_prefix(&cow, width)
            } else {
                cow.into_owned()
            }
        })
        .collect()
}

/// Shortens `line` to `width` cells, marking the cut with an ellipsis.
pub fn truncate(line: &str, width: usize, mode: TextWrap) -> String {
    if visible_width(line) <= width {
        return line.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }

    let budget = width - 1;
    match mode {
        TextWrap::TruncateStart => {
            format!("{ELLIPSIS}{}", take_suffix(line, budget))
        }
        TextWrap::TruncateMiddle => {
            let head = width / 2;
            let tail = width - head - 1;
            format!("{}{ELLIPSIS}{}", take_prefix(line, head), take_suffix(line, tail))
        }
        TextWrap::Wrap | TextWrap::Truncate | TextWrap::TruncateEnd => {
            format!("{}{ELLIPSIS}", take_prefix(line, budget))
        }
    }
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

fn take_prefix(s: &str, max: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = char_width(c);
        if used + w > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

fn take_suffix(s: &str, max: usize) -> String {
    let mut used = 0;
    let mut rev = Vec::new();
    for c in s.chars().rev() {
        let w = char_width(c);
        if used + w > max {
            break;
        }
        used += w;
        rev.push(c);
    }
    rev.into_iter().rev().collect()
}

/// Width and height `content` occupies when laid out within `available`
/// cells (`None` for unconstrained).
pub fn measure(content: &str, mode: TextWrap, available: Option<usize>) -> (usize, usize) {
    let lines = layout_text(content, available, mode);
    let width = lines.iter().map(|l| visible_width(l)).max().unwrap_or(0);
    (width, lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn short_lines_are_untouched() {
        assert_eq!(layout_text("hello", Some(10), TextWrap::Wrap), vec!["hello"]);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            layout_text("the quick brown fox", Some(10), TextWrap::Wrap),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn long_words_are_broken() {
        let lines = layout_text("abcdefghij", Some(4), TextWrap::Wrap);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn unconstrained_keeps_source_lines() {
        assert_eq!(layout_text("a b\nc", None, TextWrap::Wrap), vec!["a b", "c"]);
    }

    #[test_case(TextWrap::Wrap)]
    #[test_case(TextWrap::TruncateEnd)]
    #[test_case(TextWrap::TruncateMiddle)]
    fn zero_width_has_no_lines(mode: TextWrap) {
        assert!(layout_text("hello world", Some(0), mode).is_empty());
        assert_eq!(measure("hello world", mode, Some(0)), (0, 0));
    }

    #[test]
    fn wide_characters_never_overflow_a_narrow_column() {
        for line in layout_text("日本語 テキスト", Some(1), TextWrap::Wrap) {
            assert!(visible_width(&line) <= 1, "{line:?}");
        }
        assert_eq!(layout_text("日本", Some(3), TextWrap::Wrap), vec!["日", "本"]);
    }

    #[test]
    fn empty_content_has_no_lines() {
        assert!(layout_text("", Some(10), TextWrap::Wrap).is_empty());
        assert_eq!(measure("", TextWrap::Wrap, Some(5)), (0, 0));
    }

    #[test_case(TextWrap::Truncate, "hello w…")]
    #[test_case(TextWrap::TruncateEnd, "hello w…")]
    #[test_case(TextWrap::TruncateStart, "…o world")]
    #[test_case(TextWrap::TruncateMiddle, "hell…rld")]
    fn truncation_modes(mode: TextWrap, expected: &str) {
        let out = truncate("hello world", 8, mode);
        assert_eq!(out, expected);
        assert_eq!(visible_width(&out), 8);
    }

    #[test]
    fn truncate_to_single_cell_is_ellipsis() {
        assert_eq!(truncate("abc", 1, TextWrap::TruncateEnd), "…");
    }

    #[test]
    fn measure_reports_widest_wrapped_line() {
        assert_eq!(measure("aa bbbb", TextWrap::Wrap, Some(5)), (4, 2));
        assert_eq!(measure("aa bbbb", TextWrap::Wrap, None), (7, 1));
        assert_eq!(measure("aa bbbb", TextWrap::TruncateEnd, Some(5)), (5, 1));
    }
}
