//! Deterministic stand-ins for the terminal and the clock.
//!
//! Both types are cheap handles over shared state: keep a clone to inspect
//! or drive them after handing another clone to a [`Runtime`](crate::Runtime).

use crate::ansi::strip_ansi;
use crate::runtime::Clock;
use crate::terminal::TerminalSink;
use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct SinkState {
    writes: Vec<String>,
    columns: u16,
    rows: u16,
    tty: bool,
    flushes: usize,
}

/// Records every write in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Rc<RefCell<SinkState>>,
}

impl MemorySink {
    /// A non-TTY sink of the given size.
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(SinkState {
                columns,
                rows,
                ..Default::default()
            })),
        }
    }

    pub fn tty(self, tty: bool) -> Self {
        self.state.borrow_mut().tty = tty;
        self
    }

    pub fn resize(&self, columns: u16, rows: u16) {
        let mut state = self.state.borrow_mut();
        state.columns = columns;
        state.rows = rows;
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.borrow().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.borrow().writes.len()
    }

    pub fn last_write(&self) -> Option<String> {
        self.state.borrow().writes.last().cloned()
    }

    /// Everything written, concatenated.
    pub fn output(&self) -> String {
        self.state.borrow().writes.concat()
    }

    /// Everything written with escape sequences removed.
    pub fn plain_output(&self) -> String {
        strip_ansi(&self.output())
    }

    pub fn flush_count(&self) -> usize {
        self.state.borrow().flushes
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }
}

impl TerminalSink for MemorySink {
    fn write(&mut self, data: &str) -> io::Result<()> {
        self.state.borrow_mut().writes.push(data.to_string());
        Ok(())
    }

    fn columns(&self) -> u16 {
        self.state.borrow().columns
    }

    fn rows(&self) -> u16 {
        self.state.borrow().rows
    }

    fn is_tty(&self) -> bool {
        self.state.borrow().tty
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.borrow_mut().flushes += 1;
        Ok(())
    }
}

/// A clock that only moves when told to. Sleeping advances it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
