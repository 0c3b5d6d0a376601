//! Fixed-size grid of styled cells used by the absolute-position strategy.

use crate::style::reset;
use unicode_width::UnicodeWidthChar;

/// Marks the trailing half of a wide character.
const CONTINUATION: char = '\0';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// Accumulated SGR sequences active when the cell was written.
    pub sgr: String,
}

impl Cell {
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            sgr: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: vec![vec![Cell::blank(); width]; height],
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    /// Writes one line of (possibly styled) text starting at `(x, y)`.
    /// Content past the right edge is dropped; OSC sequences are skipped.
    pub fn write_line(&mut self, x: usize, y: usize, line: &str) {
        let width = self.width;
        let Some(row) = self.rows.get_mut(y) else {
            return;
        };

        let mut col = x;
        let reset = reset();
        let mut sgr = String::new();
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\x1b' {
                match chars.peek() {
                    Some('[') => {
                        chars.next();
                        let mut seq = String::from("\x1b[");
                        for next in chars.by_ref() {
                            seq.push(next);
                            if next.is_ascii_alphabetic() {
                                break;
                            }
                        }
                        if seq.ends_with('m') {
                            if seq == reset || seq == "\x1b[m" {
                                sgr.clear();
                            } else {
                                sgr.push_str(&seq);
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
                continue;
            }

            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if col + w > width {
                break;
            }
            row[col] = Cell {
                ch: c,
                sgr: sgr.clone(),
            };
            for extra in 1..w {
                row[col + extra] = Cell {
                    ch: CONTINUATION,
                    sgr: String::new(),
                };
            }
            col += w;
        }
    }

    pub fn write_lines<S: AsRef<str>>(&mut self, x: usize, y: usize, lines: &[S]) {
        for (offset, line) in lines.iter().enumerate() {
            self.write_line(x, y + offset, line.as_ref());
        }
    }

    /// Serializes each row, dropping trailing unstyled blanks.
    pub fn to_lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row_to_string(row)).collect()
    }
}

fn row_to_string(row: &[Cell]) -> String {
    let end = row
        .iter()
        .rposition(|cell| !(cell.ch == ' ' && cell.sgr.is_empty()))
        .map_or(0, |i| i + 1);

    let reset = reset();
    let mut out = String::new();
    let mut active = "";
    for cell in &row[..end] {
        if cell.ch == CONTINUATION {
            continue;
        }
        if cell.sgr != active {
            if !active.is_empty() {
                out.push_str(&reset);
            }
            out.push_str(&cell.sgr);
            active = &cell.sgr;
        }
        out.push(cell.ch);
    }
    if !active.is_empty() {
        out.push_str(&reset);
    }
    out
}
