//! Incremental frame output.
//!
//! The dynamic region is redrawn in place: the cursor returns to its first
//! line and only changed lines are rewritten. Static lines are inserted above
//! the region, after which the region is drawn again below them. The cursor
//! rests at the end of the last dynamic line between frames.

use crate::ansi::{ansi, clear_terminal};
use crossterm::{cursor, terminal};

fn move_up(out: &mut String, rows: usize) {
    if rows > 0 {
        out.push_str(&ansi(cursor::MoveUp(rows.min(u16::MAX as usize) as u16)));
    }
}

#[derive(Debug, Default)]
pub struct OutputBuffer {
    previous_lines: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height of the dynamic region currently on screen.
    pub fn height(&self) -> usize {
        self.previous_lines.len()
    }

    pub fn previous_lines(&self) -> &[String] {
        &self.previous_lines
    }

    /// Bytes that insert `static_lines` above the region and replace the
    /// region with `next`. `None` when there is nothing to write.
    pub fn frame(&mut self, static_lines: &[String], next: &[String]) -> Option<String> {
        if static_lines.is_empty() && next == self.previous_lines.as_slice() {
            return None;
        }

        let mut out = String::new();
        if static_lines.is_empty() {
            self.diff_into(&mut out, next);
        } else {
            self.rewind(&mut out);
            out.push_str(&ansi(terminal::Clear(terminal::ClearType::FromCursorDown)));
            for line in static_lines {
                out.push_str(line);
                out.push_str("\r\n");
            }
            out.push_str(&next.join("\r\n"));
        }

        self.previous_lines = next.to_vec();
        Some(out)
    }

    /// Clears the screen and scrollback, then writes `history` followed by
    /// the region. Used when the region no longer fits the viewport and in
    /// place updates would corrupt scrollback.
    pub fn repaint(&mut self, history: &[String], next: &[String]) -> String {
        let mut out = clear_terminal();
        for line in history {
            out.push_str(line);
            out.push_str("\r\n");
        }
        out.push_str(&next.join("\r\n"));
        self.previous_lines = next.to_vec();
        out
    }

    /// Moves to column 0 of the region's first line.
    fn rewind(&self, out: &mut String) {
        if self.previous_lines.is_empty() {
            return;
        }
        move_up(out, self.previous_lines.len() - 1);
        out.push_str(&ansi(cursor::MoveToColumn(0)));
    }

    fn diff_into(&self, out: &mut String, next: &[String]) {
        let previous_height = self.previous_lines.len();

        if previous_height == 0 {
            out.push_str(&next.join("\r\n"));
            return;
        }

        self.rewind(out);

        if next.is_empty() {
            out.push_str(&ansi(terminal::Clear(terminal::ClearType::FromCursorDown)));
            return;
        }

        let clear_line = ansi(terminal::Clear(terminal::ClearType::UntilNewLine));
        for (i, line) in next.iter().enumerate() {
            let last = i + 1 == next.len();
            let changed = self.previous_lines.get(i) != Some(line);
            if changed || i >= previous_height || last {
                out.push_str(&ansi(cursor::MoveToColumn(0)));
                out.push_str(line);
                out.push_str(&clear_line);
            }
            if !last {
                out.push_str("\r\n");
            }
        }

        if next.len() < previous_height {
            out.push_str(&ansi(terminal::Clear(terminal::ClearType::FromCursorDown)));
        }
    }

    /// Erases the region plus `above` lines written before it, and forgets
    /// the region.
    pub fn erase(&mut self, above: usize) -> String {
        let height = self.previous_lines.len();
        if height == 0 && above == 0 {
            return String::new();
        }
        let mut out = String::new();
        let up = if height > 0 { height - 1 + above } else { above };
        move_up(&mut out, up);
        out.push_str(&ansi(cursor::MoveToColumn(0)));
        out.push_str(&ansi(terminal::Clear(terminal::ClearType::FromCursorDown)));
        self.previous_lines.clear();
        out
    }

    /// Leaves the region on screen and moves below it.
    pub fn done(&mut self) -> String {
        if self.previous_lines.is_empty() {
            return String::new();
        }
        self.previous_lines.clear();
        "\r\n".to_string()
    }

    /// Forgets the region without writing anything.
    pub fn reset(&mut self) {
        self.previous_lines.clear();
    }
}
