//! Render orchestration for one tree.
//!
//! The runtime owns a [`Host`], a terminal sink and all scheduling state.
//! Commits are throttled on the trailing edge: a commit inside the throttle
//! window arms one timer, and when it fires the latest tree is rendered.
//! Intermediate states are never drawn.
//!
//! Static output is written once per child of the first `Static` element
//! and is never redrawn, except after a width change where the whole history
//! is re-emitted at the new width.

use crate::ansi::clear_terminal;
use crate::config::{ExitMode, RenderConfig};
use crate::error::RenderResult;
use crate::host::{Host, HostConfig};
use crate::node::{NodeId, Props};
use crate::output::OutputBuffer;
use crate::render::{extract_static, render_sequential};
use crate::terminal::TerminalSink;
use crate::work_queue::WorkQueue;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Upper bound on callbacks and updates run by one flush.
const MAX_FLUSH_STEPS: usize = 10_000;

/// Time source for throttling.
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Scheduled,
    Rendering,
    Disposed,
}

pub struct Runtime<S: TerminalSink, C: Clock = SystemClock> {
    host: Host,
    sink: S,
    clock: C,
    config: RenderConfig,
    output: OutputBuffer,
    queue: WorkQueue,
    phase: Phase,
    last_render: Option<Instant>,
    pending: bool,
    timer: Option<Instant>,
    last_width: Option<u16>,
    /// Retained static lines, oldest first, for full repaints.
    static_history: VecDeque<String>,
    /// Static lines written above the dynamic region since the last reset.
    static_lines_written: usize,
}

impl<S: TerminalSink> Runtime<S, SystemClock> {
    pub fn new(sink: S, config: RenderConfig) -> Self {
        Self::with_clock(sink, SystemClock, config)
    }
}

impl<S: TerminalSink, C: Clock> Runtime<S, C> {
    pub fn with_clock(sink: S, clock: C, config: RenderConfig) -> Self {
        Self {
            host: Host::new(),
            sink,
            clock,
            config,
            output: OutputBuffer::new(),
            queue: WorkQueue::new(),
            phase: Phase::Idle,
            last_render: None,
            pending: false,
            timer: None,
            last_width: None,
            static_history: VecDeque::new(),
            static_lines_written: 0,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Handle for queuing deferred callbacks and updates.
    pub fn work_queue(&self) -> WorkQueue {
        self.queue.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == Phase::Disposed
    }

    /// True while a commit is waiting for the throttle timer.
    pub fn has_pending_render(&self) -> bool {
        self.pending
    }

    /// Deadline of the armed throttle timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer
    }

    pub fn static_history(&self) -> impl Iterator<Item = &str> {
        self.static_history.iter().map(String::as_str)
    }

    fn schedule_render(&mut self) -> RenderResult<()> {
        if self.phase == Phase::Disposed {
            trace!("commit after unmount ignored");
            return Ok(());
        }

        let now = self.clock.now();
        let throttle = self.config.throttle();
        let last = match self.last_render {
            Some(last) if now.duration_since(last) < throttle => last,
            _ => {
                trace!("throttle window open, rendering now");
                return self.render_frame();
            }
        };

        self.pending = true;
        self.phase = Phase::Scheduled;
        if self.timer.is_none() {
            let deadline = last + throttle;
            trace!(
                remaining_ms = deadline.duration_since(now).as_millis() as u64,
                "armed throttle timer"
            );
            self.timer = Some(deadline);
        }
        Ok(())
    }

    /// Fires the throttle timer if it has expired. Returns whether a render
    /// happened.
    pub fn poll_timer(&mut self) -> RenderResult<bool> {
        if self.phase == Phase::Disposed {
            self.timer = None;
            return Ok(false);
        }
        let Some(deadline) = self.timer else {
            return Ok(false);
        };
        if self.clock.now() < deadline {
            return Ok(false);
        }

        self.timer = None;
        if !self.pending {
            return Ok(false);
        }
        self.render_frame()?;
        Ok(true)
    }

    /// Sleeps until the armed timer expires, then fires it.
    pub fn wait_for_timer(&mut self) -> RenderResult<bool> {
        let Some(deadline) = self.timer else {
            return Ok(false);
        };
        let now = self.clock.now();
        if deadline > now {
            self.clock.sleep(deadline - now);
        }
        self.poll_timer()
    }

    /// The terminal was resized; redraw at the new dimensions right away.
    pub fn handle_resize(&mut self) -> RenderResult<()> {
        if self.phase == Phase::Disposed {
            return Ok(());
        }
        debug!(
            columns = self.sink.columns(),
            rows = self.sink.rows(),
            "terminal resized"
        );
        self.render_frame()
    }

    /// Drains queued work and applies updates, then schedules a render if
    /// any update ran.
    pub fn run_queued(&mut self) -> RenderResult<()> {
        if self.phase == Phase::Disposed {
            return Ok(());
        }
        self.queue.drain_deferred(MAX_FLUSH_STEPS);
        let updates = self.queue.drain_updates(&mut self.host, MAX_FLUSH_STEPS)?;
        if updates > 0 {
            self.on_commit()?;
        }
        Ok(())
    }

    /// Settles all queued work, renders once more and flushes the sink.
    ///
    /// Deferred callbacks may queue further work, so draining repeats until
    /// both queues are empty before the final render.
    pub fn flush(&mut self) -> RenderResult<()> {
        if self.phase == Phase::Disposed {
            return Ok(());
        }

        let mut steps = 0;
        loop {
            let budget = MAX_FLUSH_STEPS - steps;
            let deferred = self.queue.drain_deferred(budget);
            steps += deferred;
            let updates = self
                .queue
                .drain_updates(&mut self.host, MAX_FLUSH_STEPS - steps)?;
            steps += updates;

            if self.queue.is_empty() {
                break;
            }
            if steps >= MAX_FLUSH_STEPS {
                warn!(
                    steps,
                    deferred = self.queue.pending_deferred(),
                    updates = self.queue.pending_updates(),
                    "flush gave up with work still queued"
                );
                break;
            }
        }

        self.render_frame()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Flushes, disposes the runtime and cleans up per the configured exit
    /// mode.
    pub fn unmount(&mut self) -> RenderResult<()> {
        let mode = self.config.exit_mode;
        self.unmount_with(mode)
    }

    pub fn unmount_with(&mut self, mode: ExitMode) -> RenderResult<()> {
        if self.phase == Phase::Disposed {
            return Ok(());
        }
        self.flush()?;
        self.phase = Phase::Disposed;
        self.pending = false;
        self.timer = None;

        let out = match mode {
            ExitMode::Persist => self.output.done(),
            ExitMode::Clear => {
                let above = std::mem::take(&mut self.static_lines_written);
                self.output.erase(above)
            }
            ExitMode::ClearDynamic => self.output.erase(0),
        };
        if !out.is_empty() {
            self.sink.write(&out)?;
        }
        self.sink.flush()?;
        debug!(?mode, "unmounted");
        Ok(())
    }

    fn render_frame(&mut self) -> RenderResult<()> {
        if self.phase == Phase::Disposed {
            return Ok(());
        }
        self.phase = Phase::Rendering;
        self.pending = false;
        self.timer = None;
        self.last_render = Some(self.clock.now());

        let result = self.paint();
        self.phase = Phase::Idle;
        result
    }

    fn paint(&mut self) -> RenderResult<()> {
        let columns = self.sink.columns();
        let rows = self.sink.rows() as usize;
        let root = self.host.root();

        let mut out = String::new();
        if let Some(previous) = self.last_width.filter(|&w| w != columns) {
            debug!(from = previous, to = columns, "width changed, re-emitting static output");
            out.push_str(&self.reset_for_width(root)?);
        }
        self.last_width = Some(columns);

        let (new_static, dynamic) = match root {
            Some(root) => self.render_root(root, columns)?,
            None => (Vec::new(), Vec::new()),
        };

        let overflowing = self.sink.is_tty() && rows > 0 && dynamic.len() >= rows;
        let frame = if overflowing {
            if new_static.is_empty() && dynamic.as_slice() == self.output.previous_lines() {
                None
            } else {
                let history: Vec<String> = self.static_history.iter().cloned().collect();
                self.static_lines_written = history.len();
                Some(self.output.repaint(&history, &dynamic))
            }
        } else {
            self.output.frame(&new_static, &dynamic)
        };
        if let Some(frame) = frame {
            out.push_str(&frame);
        }

        if out.is_empty() {
            trace!("frame unchanged, skipping write");
            return Ok(());
        }
        self.sink.write(&out)?;
        debug!(
            static_lines = new_static.len(),
            dynamic_lines = dynamic.len(),
            bytes = out.len(),
            "rendered frame"
        );
        Ok(())
    }

    /// Lays out the tree, commits new static children and renders the
    /// dynamic region.
    fn render_root(
        &mut self,
        root: NodeId,
        columns: u16,
    ) -> RenderResult<(Vec<String>, Vec<String>)> {
        let doc = self.host.document_mut();
        doc.compute_layout(root, columns)?;

        let extraction = extract_static(doc, root, columns)?;
        if let Some(element) = extraction.element {
            doc.set_committed_count(element, extraction.total)?;
        }
        let dynamic = render_sequential(doc, root, columns)?;

        let new_static = self.retain_static(extraction.lines);
        if !new_static.is_empty() {
            debug!(lines = new_static.len(), "emitting static output");
        }
        Ok((new_static, self.cap_dynamic(dynamic)))
    }

    fn reset_for_width(&mut self, root: Option<NodeId>) -> RenderResult<String> {
        if let Some(root) = root {
            self.host.document_mut().reset_committed(root)?;
        }
        self.static_history.clear();
        self.static_lines_written = 0;

        if self.sink.is_tty() {
            self.output.reset();
            Ok(clear_terminal())
        } else {
            Ok(self.output.erase(0))
        }
    }

    /// Applies `max_static_lines`: the oldest lines are dropped, both from an
    /// oversized batch and from retained history.
    fn retain_static(&mut self, mut lines: Vec<String>) -> Vec<String> {
        if let Some(max) = self.config.max_static_lines {
            if lines.len() > max {
                let dropped = lines.len() - max;
                lines.drain(..dropped);
                debug!(dropped, "static batch exceeds retention, dropping oldest");
            }
            self.static_history.extend(lines.iter().cloned());
            while self.static_history.len() > max {
                self.static_history.pop_front();
            }
        } else {
            self.static_history.extend(lines.iter().cloned());
        }
        self.static_lines_written += lines.len();
        lines
    }

    fn cap_dynamic(&self, mut lines: Vec<String>) -> Vec<String> {
        let max = self.config.max_dynamic_lines;
        if max == 0 || lines.len() <= max {
            return lines;
        }
        let keep = max - 1;
        let hidden = lines.len() - keep;
        lines.truncate(keep);
        lines.push(format!("... {hidden} more lines"));
        lines
    }
}

impl<S: TerminalSink, C: Clock> HostConfig for Runtime<S, C> {
    fn create_instance(&mut self, kind: &str, props: Props) -> RenderResult<NodeId> {
        self.host.create_instance(kind, props)
    }

    fn create_text_instance(&mut self, text: &str) -> NodeId {
        self.host.create_text_instance(text)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        self.host.append_child(parent, child)
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> RenderResult<()> {
        self.host.insert_before(parent, child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> RenderResult<()> {
        self.host.remove_child(parent, child)
    }

    fn append_child_to_container(&mut self, child: NodeId) -> RenderResult<()> {
        self.host.append_child_to_container(child)
    }

    fn remove_child_from_container(&mut self, child: NodeId) -> RenderResult<()> {
        self.host.remove_child_from_container(child)
    }

    fn commit_update(&mut self, instance: NodeId, props: Props) -> RenderResult<()> {
        self.host.commit_update(instance, props)
    }

    fn commit_text_update(&mut self, node: NodeId, text: &str) -> RenderResult<()> {
        self.host.commit_text_update(node, text)
    }

    fn on_commit(&mut self) -> RenderResult<()> {
        self.host.on_commit()?;
        self.schedule_render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MemorySink};

    type TestRuntime = Runtime<MemorySink, ManualClock>;

    fn runtime(config: RenderConfig) -> (TestRuntime, MemorySink, ManualClock) {
        let sink = MemorySink::new(40, 10);
        let clock = ManualClock::new();
        let rt = Runtime::with_clock(sink.clone(), clock.clone(), config);
        (rt, sink, clock)
    }

    fn mount_text(rt: &mut Runtime<MemorySink, ManualClock>, content: &str) -> NodeId {
        let root = rt.create_instance("box", Props::column()).unwrap();
        let text = rt.create_instance("text", Props::new()).unwrap();
        let raw = rt.create_text_instance(content);
        rt.append_child(text, raw).unwrap();
        rt.append_child(root, text).unwrap();
        rt.append_child_to_container(root).unwrap();
        raw
    }

    #[test]
    fn first_commit_renders_immediately() {
        let (mut rt, sink, _clock) = runtime(RenderConfig::default());
        mount_text(&mut rt, "hello");

        rt.on_commit().unwrap();

        assert_eq!(sink.writes(), vec!["hello".to_string()]);
        assert!(!rt.has_pending_render());
    }

    #[test]
    fn commit_inside_window_arms_one_timer() {
        let (mut rt, sink, clock) = runtime(RenderConfig::default());
        let raw = mount_text(&mut rt, "a");
        rt.on_commit().unwrap();
        let first_deadline = clock.now() + Duration::from_millis(16);

        clock.advance(Duration::from_millis(2));
        rt.commit_text_update(raw, "b").unwrap();
        rt.on_commit().unwrap();
        clock.advance(Duration::from_millis(2));
        rt.commit_text_update(raw, "c").unwrap();
        rt.on_commit().unwrap();

        assert_eq!(sink.write_count(), 1);
        assert!(rt.has_pending_render());
        assert_eq!(rt.next_deadline(), Some(first_deadline));

        assert!(!rt.poll_timer().unwrap());
        assert!(rt.wait_for_timer().unwrap());
        assert_eq!(sink.write_count(), 2);
        assert!(sink.last_write().unwrap().contains('c'));
    }

    #[test]
    fn timer_after_unmount_is_a_no_op() {
        let (mut rt, sink, clock) = runtime(RenderConfig::default());
        let raw = mount_text(&mut rt, "a");
        rt.on_commit().unwrap();
        rt.commit_text_update(raw, "b").unwrap();
        rt.on_commit().unwrap();

        rt.unmount().unwrap();
        let writes = sink.write_count();
        clock.advance(Duration::from_millis(100));

        assert!(!rt.poll_timer().unwrap());
        rt.on_commit().unwrap();
        assert_eq!(sink.write_count(), writes);
        assert!(rt.is_disposed());
    }

    #[test]
    fn unchanged_frame_is_not_rewritten() {
        let (mut rt, sink, clock) = runtime(RenderConfig::default());
        mount_text(&mut rt, "same");
        rt.on_commit().unwrap();

        clock.advance(Duration::from_millis(50));
        rt.on_commit().unwrap();

        assert_eq!(sink.write_count(), 1);
    }

    #[test]
    fn dynamic_region_is_capped_with_marker() {
        let (mut rt, sink, _clock) = runtime(RenderConfig::default().with_max_dynamic_lines(5));
        mount_text(&mut rt, "1\n2\n3\n4\n5\n6\n7\n8");

        rt.on_commit().unwrap();

        let out = sink.last_write().unwrap();
        let lines: Vec<&str> = out.split("\r\n").collect();
        assert_eq!(lines, vec!["1", "2", "3", "4", "... 4 more lines"]);
    }

    #[test]
    fn flush_drains_requeued_work_before_rendering() {
        let (mut rt, sink, _clock) = runtime(RenderConfig::default());
        let raw = mount_text(&mut rt, "loading");
        rt.on_commit().unwrap();

        let queue = rt.work_queue();
        let inner = queue.clone();
        queue.defer(move || {
            inner.queue_update(move |host| host.commit_text_update(raw, "ready"));
        });

        rt.flush().unwrap();

        assert!(sink.last_write().unwrap().contains("ready"));
        assert!(queue.is_empty());
        assert_eq!(sink.flush_count(), 1);
    }

    #[test]
    fn exit_modes_write_expected_cleanup() {
        let (mut rt, sink, _clock) = runtime(RenderConfig::default());
        mount_text(&mut rt, "bye");
        rt.on_commit().unwrap();

        rt.unmount_with(ExitMode::ClearDynamic).unwrap();

        assert_eq!(sink.last_write().unwrap(), "\x1b[1G\x1b[J");
    }

    #[test]
    fn persist_moves_below_output() {
        let (mut rt, sink, _clock) = runtime(RenderConfig::default());
        mount_text(&mut rt, "stay");
        rt.on_commit().unwrap();

        rt.unmount().unwrap();

        assert_eq!(sink.last_write().unwrap(), "\r\n");
        assert_eq!(sink.output(), "stay\r\n");
    }
}
