//! The scheduling contract shared by every thread-ordering policy.
//!
//! A scheduler decides which thread the interpreter runs next; it never
//! executes instructions itself and never owns thread state. Different
//! policies implement very different orderings over the same interface,
//! which is what lets thread managers swap them freely.

use thiserror::Error;

use crate::lockstep::LockstepScheduler;
use crate::lockstep_alt::LockstepAltScheduler;
use crate::spencer::SpencerScheduler;
use crate::thread::ThreadManager;

pub type ScheduleResult<T> = std::result::Result<(), ScheduleError<T>>;

#[derive(Error, Debug)]
pub enum ScheduleError<T> {
    /// The thread was rejected as a semantic duplicate of one already
    /// queued. The handle travels back so the caller can decide what to
    /// do with it, usually asking the thread manager to kill it.
    #[error("thread is already scheduled in an equivalent state")]
    Duplicate(T),
}

impl<T> ScheduleError<T> {
    /// Takes the rejected thread handle back out of the error.
    pub fn into_thread(self) -> T {
        match self {
            ScheduleError::Duplicate(thread) => thread,
        }
    }
}

pub trait Scheduler {
    type Thread;

    /// Resets the transient scheduling state for a fresh match run.
    ///
    /// Threads still queued are NOT disposed of; callers that care about
    /// them must drain the scheduler first.
    fn init(&mut self);

    /// Schedules a thread under the policy's native priority.
    ///
    /// The scheduling order is an implementation detail. Policies that
    /// suppress duplicates hand the rejected handle back as
    /// [`ScheduleError::Duplicate`].
    fn schedule(&mut self, thread: Self::Thread) -> ScheduleResult<Self::Thread>;

    /// Schedules a thread such that consecutive calls result in later
    /// threads being run after earlier threads (i.e. scheduling order is
    /// maintained).
    fn schedule_in_order(&mut self, thread: Self::Thread) -> ScheduleResult<Self::Thread>;

    /// Checks whether [`Scheduler::next`] would return a thread.
    fn has_next(&self) -> bool;

    /// Takes the next thread for execution, or `None` if the scheduler
    /// is drained.
    fn next(&mut self) -> Option<Self::Thread>;
}

/// The scheduling policies as one tagged union, for callers that pick a
/// policy at run time. Extension operations that only some policies have
/// (step tracking, low-priority removal) stay on the concrete types.
pub enum ThreadScheduler<M: ThreadManager> {
    Spencer(SpencerScheduler<M::Thread>),
    Lockstep(LockstepScheduler<M>),
    LockstepAlt(LockstepAltScheduler<M>),
}

impl<M: ThreadManager> Scheduler for ThreadScheduler<M> {
    type Thread = M::Thread;

    fn init(&mut self) {
        match self {
            ThreadScheduler::Spencer(scheduler) => scheduler.init(),
            ThreadScheduler::Lockstep(scheduler) => scheduler.init(),
            ThreadScheduler::LockstepAlt(scheduler) => scheduler.init(),
        }
    }

    fn schedule(&mut self, thread: Self::Thread) -> ScheduleResult<Self::Thread> {
        match self {
            ThreadScheduler::Spencer(scheduler) => scheduler.schedule(thread),
            ThreadScheduler::Lockstep(scheduler) => scheduler.schedule(thread),
            ThreadScheduler::LockstepAlt(scheduler) => scheduler.schedule(thread),
        }
    }

    fn schedule_in_order(&mut self, thread: Self::Thread) -> ScheduleResult<Self::Thread> {
        match self {
            ThreadScheduler::Spencer(scheduler) => scheduler.schedule_in_order(thread),
            ThreadScheduler::Lockstep(scheduler) => scheduler.schedule_in_order(thread),
            ThreadScheduler::LockstepAlt(scheduler) => scheduler.schedule_in_order(thread),
        }
    }

    fn has_next(&self) -> bool {
        match self {
            ThreadScheduler::Spencer(scheduler) => scheduler.has_next(),
            ThreadScheduler::Lockstep(scheduler) => scheduler.has_next(),
            ThreadScheduler::LockstepAlt(scheduler) => scheduler.has_next(),
        }
    }

    fn next(&mut self) -> Option<Self::Thread> {
        match self {
            ThreadScheduler::Spencer(scheduler) => scheduler.next(),
            ThreadScheduler::Lockstep(scheduler) => scheduler.next(),
            ThreadScheduler::LockstepAlt(scheduler) => scheduler.next(),
        }
    }
}
