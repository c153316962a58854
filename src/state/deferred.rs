//! Deferred work - tasks that run after the current layout commits.
//!
//! Components post work that depends on committed geometry (sibling
//! positions are only final after layout). The host drains the queue once
//! the frame's layout pass is done.

use std::cell::RefCell;
use std::collections::VecDeque;

/// Post-layout task scheduling service.
pub trait Scheduler {
    fn post(&self, task: Box<dyn FnOnce()>);
}

/// FIFO queue of deferred tasks, drained by the host.
#[derive(Default)]
pub struct DeferredQueue {
    tasks: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run the tasks that were pending when called.
    ///
    /// Tasks posted while draining wait for the next call, so a task that
    /// re-posts itself cannot spin forever. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let pending = self.len();
        for _ in 0..pending {
            let task = self.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
        pending
    }
}

impl Scheduler for DeferredQueue {
    fn post(&self, task: Box<dyn FnOnce()>) {
        self.tasks.borrow_mut().push_back(task);
    }
}
