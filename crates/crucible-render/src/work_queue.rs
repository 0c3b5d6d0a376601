//! Deferred callbacks and queued tree updates.
//!
//! A driver holds a cloned [`WorkQueue`] and pushes effect-style callbacks
//! and state updates into it. The runtime drains both during a flush, in
//! FIFO order, including work that is queued while draining.

use crate::error::RenderResult;
use crate::host::Host;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Deferred = Box<dyn FnOnce()>;
type Update = Box<dyn FnOnce(&mut Host) -> RenderResult<()>>;

#[derive(Clone, Default)]
pub struct WorkQueue {
    deferred: Rc<RefCell<VecDeque<Deferred>>>,
    updates: Rc<RefCell<VecDeque<Update>>>,
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("deferred", &self.pending_deferred())
            .field("updates", &self.pending_updates())
            .finish()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a callback to run on the next drain.
    pub fn defer(&self, callback: impl FnOnce() + 'static) {
        self.deferred.borrow_mut().push_back(Box::new(callback));
    }

    /// Queues a tree mutation to apply on the next drain.
    pub fn queue_update(&self, update: impl FnOnce(&mut Host) -> RenderResult<()> + 'static) {
        self.updates.borrow_mut().push_back(Box::new(update));
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.borrow().len()
    }

    pub fn pending_updates(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_deferred() == 0 && self.pending_updates() == 0
    }

    /// Runs up to `budget` deferred callbacks. Returns how many ran.
    pub fn drain_deferred(&self, budget: usize) -> usize {
        let mut ran = 0;
        while ran < budget {
            // The borrow ends before the callback runs so it may queue more.
            let Some(callback) = self.deferred.borrow_mut().pop_front() else {
                break;
            };
            callback();
            ran += 1;
        }
        ran
    }

    /// Applies up to `budget` queued updates to `host`. Returns how many ran.
    pub fn drain_updates(&self, host: &mut Host, budget: usize) -> RenderResult<usize> {
        let mut ran = 0;
        while ran < budget {
            let Some(update) = self.updates.borrow_mut().pop_front() else {
                break;
            };
            update(host)?;
            ran += 1;
        }
        Ok(ran)
    }
}
