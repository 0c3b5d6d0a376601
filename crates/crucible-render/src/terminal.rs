//! Terminal sinks.

use crossterm::terminal;
use std::io::{self, IsTerminal, Stdout, Write};

const FALLBACK_COLUMNS: u16 = 80;
const FALLBACK_ROWS: u16 = 24;

/// Where rendered frames go. The runtime performs at most one `write` per
/// render.
pub trait TerminalSink {
    fn write(&mut self, data: &str) -> io::Result<()>;

    fn columns(&self) -> u16;

    fn rows(&self) -> u16;

    fn is_tty(&self) -> bool;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: TerminalSink + ?Sized> TerminalSink for Box<S> {
    fn write(&mut self, data: &str) -> io::Result<()> {
        (**self).write(data)
    }

    fn columns(&self) -> u16 {
        (**self).columns()
    }

    fn rows(&self) -> u16 {
        (**self).rows()
    }

    fn is_tty(&self) -> bool {
        (**self).is_tty()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Process stdout, sized through crossterm. Falls back to 80x24 when the
/// size cannot be queried (for example when piped).
pub struct StdoutSink {
    stdout: Stdout,
    tty: bool,
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutSink {
    pub fn new() -> Self {
        let stdout = io::stdout();
        let tty = stdout.is_terminal();
        Self { stdout, tty }
    }

    fn size(&self) -> (u16, u16) {
        match terminal::size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => (cols, rows),
            _ => (FALLBACK_COLUMNS, FALLBACK_ROWS),
        }
    }
}

impl TerminalSink for StdoutSink {
    fn write(&mut self, data: &str) -> io::Result<()> {
        self.stdout.write_all(data.as_bytes())
    }

    fn columns(&self) -> u16 {
        self.size().0
    }

    fn rows(&self) -> u16 {
        self.size().1
    }

    fn is_tty(&self) -> bool {
        self.tty
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}
