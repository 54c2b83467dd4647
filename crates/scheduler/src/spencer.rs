//! Spencer-style backtracking: classical depth-first, last-in-first-out
//! thread ordering.

use crate::scheduler::{ScheduleResult, Scheduler};

/// The DFS scheduling policy.
///
/// One thread slot is kept out of the stack: the first thread scheduled
/// into an empty scheduler becomes the active thread and is returned
/// ahead of anything stacked after it. Everything else is LIFO.
///
/// `schedule_in_order` maintains a contiguous run of in-order siblings:
/// the first in-order arrival lands on top of the stack and every
/// subsequent one is inserted beneath the previous, so the run pops in
/// submission order before older stack entries.
pub struct SpencerScheduler<T> {
    in_order_idx: usize, // index to insert threads in-order
    active: Option<T>,   // active thread for the scheduler
    stack: Vec<T>,       // thread stack for DFS scheduling
}

impl<T> SpencerScheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_order_idx: 0,
            active: None,
            stack: Vec::new(),
        }
    }
}

impl<T> Default for SpencerScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler for SpencerScheduler<T> {
    type Thread = T;

    fn init(&mut self) {
        self.in_order_idx = 0;
        self.active = None;
    }

    fn schedule(&mut self, thread: T) -> ScheduleResult<T> {
        self.in_order_idx = self.stack.len() + 1;
        if self.active.is_some() {
            self.stack.push(thread);
        } else {
            self.active = Some(thread);
        }
        Ok(())
    }

    fn schedule_in_order(&mut self, thread: T) -> ScheduleResult<T> {
        let len = self.stack.len();

        if self.in_order_idx > len {
            self.schedule(thread)?;
            self.in_order_idx = len;
        } else if self.in_order_idx == len {
            self.stack.push(thread);
        } else {
            self.stack.insert(self.in_order_idx, thread);
        }

        Ok(())
    }

    fn has_next(&self) -> bool {
        self.active.is_some() || !self.stack.is_empty()
    }

    fn next(&mut self) -> Option<T> {
        let thread = self.active.take();

        self.in_order_idx = self.stack.len() + 1;
        thread.or_else(|| self.stack.pop())
    }
}

#[cfg(test)]
mod spencer_tests {
    use super::*;

    fn drain(scheduler: &mut SpencerScheduler<u32>) -> Vec<u32> {
        let mut order = Vec::new();
        while let Some(thread) = scheduler.next() {
            order.push(thread);
        }
        order
    }

    #[test]
    fn active_thread_runs_first_then_lifo() {
        let mut scheduler = SpencerScheduler::new();

        scheduler.schedule(1).unwrap();
        scheduler.schedule(2).unwrap();
        scheduler.schedule(3).unwrap();

        assert_eq!(drain(&mut scheduler), vec![1, 3, 2]);
        assert!(!scheduler.has_next());
    }

    #[test]
    fn in_order_run_preserves_submission_order() {
        let mut scheduler = SpencerScheduler::new();

        scheduler.schedule(1).unwrap();
        scheduler.schedule(2).unwrap();
        scheduler.schedule_in_order(10).unwrap();
        scheduler.schedule_in_order(11).unwrap();

        // the in-order run pops before the older stack entry, after the
        // active slot
        assert_eq!(drain(&mut scheduler), vec![1, 10, 11, 2]);
    }

    #[test]
    fn in_order_into_empty_scheduler_is_fifo() {
        let mut scheduler = SpencerScheduler::new();

        scheduler.schedule_in_order(1).unwrap();
        scheduler.schedule_in_order(2).unwrap();
        scheduler.schedule_in_order(3).unwrap();

        assert_eq!(drain(&mut scheduler), vec![1, 2, 3]);
    }

    #[test]
    fn plain_schedule_resets_the_in_order_run() {
        let mut scheduler = SpencerScheduler::new();

        scheduler.schedule(1).unwrap();
        scheduler.schedule_in_order(10).unwrap();
        scheduler.schedule(2).unwrap();
        scheduler.schedule_in_order(20).unwrap();
        scheduler.schedule_in_order(21).unwrap();

        // 10 opened a run, 2 interrupted it, 20/21 form a fresh run
        assert_eq!(drain(&mut scheduler), vec![1, 20, 21, 2, 10]);
    }

    #[test]
    fn next_after_drain_returns_none() {
        let mut scheduler: SpencerScheduler<u32> = SpencerScheduler::new();

        assert_eq!(scheduler.next(), None);
        assert!(!scheduler.has_next());
    }

    #[test]
    fn every_scheduled_thread_comes_back_exactly_once() {
        let mut scheduler = SpencerScheduler::new();
        for id in 0..32 {
            scheduler.schedule(id).unwrap();
        }

        let mut order = drain(&mut scheduler);
        order.sort_unstable();

        assert_eq!(order, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn init_clears_the_active_slot_but_keeps_the_stack() {
        let mut scheduler = SpencerScheduler::new();

        scheduler.schedule(1).unwrap();
        scheduler.schedule(2).unwrap();
        scheduler.init();

        assert!(scheduler.has_next());
        assert_eq!(drain(&mut scheduler), vec![2]);
    }
}
