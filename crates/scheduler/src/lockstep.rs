//! Lockstep scheduling: all live threads advance over the input together,
//! one position per step.
//!
//! A step runs every thread sitting at an ε-instruction until the whole
//! population has reached an input-consuming instruction, then fires the
//! consumers simultaneously. Three queues carry that discipline: `curr`
//! is the set being drained right now, `next` accumulates ε-children for
//! the following ε-round, and `sync` collects the consumers waiting for
//! the synchronized input advance.

use std::collections::VecDeque;
use std::mem;

use tracing::trace;

use crate::scheduler::{ScheduleError, ScheduleResult, Scheduler};
use crate::thread::{SharedThreadManager, ThreadManager};

pub struct LockstepScheduler<M: ThreadManager> {
    manager: SharedThreadManager<M>,
    in_lockstep: bool, // whether the queue being drained is the sync queue

    curr: VecDeque<M::Thread>, // current queue of threads to execute
    next: VecDeque<M::Thread>, // next queue of threads to be executed
    sync: VecDeque<M::Thread>, // synchronisation queue for lockstep
}

impl<M: ThreadManager> LockstepScheduler<M> {
    /// Builds a lockstep scheduler around the given manager.
    ///
    /// The manager is needed because the scheduler inspects the program
    /// counter of every scheduled thread to decide whether it has to wait
    /// for the rest of the population.
    pub fn new(manager: SharedThreadManager<M>) -> Self {
        Self {
            manager,
            in_lockstep: false,
            curr: VecDeque::new(),
            next: VecDeque::new(),
            sync: VecDeque::new(),
        }
    }

    /// Removes and returns the not-yet-executed tail of the current
    /// queue, used when a higher-priority thread has matched and the
    /// remaining alternatives should be abandoned.
    ///
    /// The returned order is not the prioritised order.
    pub fn remove_low_priority_threads(&mut self) -> Vec<M::Thread> {
        let mut threads: Vec<M::Thread> = Vec::with_capacity(self.curr.len());
        while let Some(thread) = self.curr.pop_back() {
            threads.push(thread);
        }
        threads
    }

    /// True when a step has just been completed: every thread has been
    /// executed up to an input-consuming instruction and the synchronised
    /// drain has been exhausted.
    #[must_use]
    pub fn done_step(&self) -> bool {
        self.curr.is_empty() && self.in_lockstep
    }

    fn queue_contains(manager: &M, queue: &VecDeque<M::Thread>, thread: &M::Thread) -> bool {
        queue.iter().any(|queued| manager.thread_eq(queued, thread))
    }
}

impl<M: ThreadManager> Scheduler for LockstepScheduler<M> {
    type Thread = M::Thread;

    fn init(&mut self) {
        self.in_lockstep = false;
    }

    fn schedule(&mut self, thread: M::Thread) -> ScheduleResult<M::Thread> {
        let duplicate = {
            let manager = self.manager.borrow();
            Self::queue_contains(&manager, &self.next, &thread)
                || Self::queue_contains(&manager, &self.sync, &thread)
        };
        if duplicate {
            return Err(ScheduleError::Duplicate(thread));
        }

        // a consumer may only go straight to the sync queue while no
        // thread still needs ε-expansion, otherwise intra-step ordering
        // would be lost
        if self.manager.borrow().pc(&thread).consumes_input() && self.next.is_empty() {
            self.sync.push_back(thread);
        } else {
            self.next.push_back(thread);
        }
        Ok(())
    }

    fn schedule_in_order(&mut self, thread: M::Thread) -> ScheduleResult<M::Thread> {
        // the round queues already preserve submission order
        self.schedule(thread)
    }

    fn has_next(&self) -> bool {
        !(self.curr.is_empty() && self.next.is_empty() && self.sync.is_empty())
    }

    fn next(&mut self) -> Option<M::Thread> {
        loop {
            if self.curr.is_empty() {
                if self.next.is_empty() {
                    self.in_lockstep = true;
                    mem::swap(&mut self.curr, &mut self.sync);
                    trace!(threads = self.curr.len(), "firing synchronised consumers");
                } else {
                    self.in_lockstep = false;
                    mem::swap(&mut self.curr, &mut self.next);
                }
                if self.curr.is_empty() {
                    return None;
                }
            }

            let thread = self.curr.pop_front()?;
            let consuming = self.manager.borrow().pc(&thread).consumes_input();
            if consuming && !self.in_lockstep {
                // the thread is ready to consume but the step is still
                // expanding; push it towards the sync queue and kill it
                // if it turns out to be a duplicate
                if let Err(error) = self.schedule(thread) {
                    self.manager.borrow_mut().kill_thread(error.into_thread());
                }
                continue;
            }

            return Some(thread);
        }
    }
}
