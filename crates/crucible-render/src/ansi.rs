//! Escape sequence helpers: visible width, stripping, hyperlinks and the
//! cursor/erase commands the output layer emits.

use crossterm::{cursor, terminal, Command};
use unicode_width::UnicodeWidthChar;

/// Removes CSI and OSC sequences, leaving only printable text.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(sc) = chars.next() {
                    if sc == '\x07' {
                        break;
                    }
                    if sc == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// Display width in cells, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s)
        .chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum()
}

/// Wraps `text` in an OSC 8 hyperlink.
pub fn hyperlink(text: &str, url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{text}\x1b]8;;\x1b\\")
}

/// Renders a crossterm command to its escape sequence.
pub(crate) fn ansi<C: Command>(command: C) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}

pub fn clear_until_newline() -> String {
    ansi(terminal::Clear(terminal::ClearType::UntilNewLine))
}

/// Clears the visible screen and scrollback, homing the cursor.
pub fn clear_terminal() -> String {
    let mut out = ansi(terminal::Clear(terminal::ClearType::All));
    out.push_str(&ansi(terminal::Clear(terminal::ClearType::Purge)));
    out.push_str(&ansi(cursor::MoveTo(0, 0)));
    out
}
