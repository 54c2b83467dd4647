use std::cell::RefCell;
use std::rc::Rc;

use strum_macros::Display;

/// Shared handle through which schedulers reach the thread manager that
/// owns the threads they order.
pub type SharedThreadManager<M> = Rc<RefCell<M>>;

/// The instruction opcodes of the compiled program.
///
/// Schedulers never interpret instructions; the only classification they
/// perform is [`Opcode::consumes_input`], which separates the two
/// input-consuming opcodes from the ε-transitions.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Opcode {
    Match,
    Memo,
    Char,
    Pred,
    Save,
    Jmp,
    Split,
    GSplit,
    LSplit,
    TSwitch,
    EpsReset,
    EpsSet,
    EpsChk,
    Reset,
    Cmp,
    Inc,
    Zwa,
    State,
}

impl Opcode {
    /// True for the opcodes that advance the input position when they
    /// execute.
    #[inline]
    #[must_use]
    pub fn consumes_input(self) -> bool {
        matches!(self, Opcode::Char | Opcode::Pred)
    }
}

/// The contract a thread manager exposes to its schedulers.
///
/// Thread handles are opaque to the scheduling layer: they move through
/// scheduler queues by value, but the thread state they designate belongs
/// to the manager. Dropping a handle does not dispose of a thread;
/// [`ThreadManager::kill_thread`] does.
pub trait ThreadManager {
    type Thread;

    /// Reads the opcode at the thread's current program counter.
    fn pc(&self, thread: &Self::Thread) -> Opcode;

    /// Semantic equality of two threads, typically identical program
    /// counter plus identical capture state.
    fn thread_eq(&self, a: &Self::Thread, b: &Self::Thread) -> bool;

    /// Requests disposal of the thread behind the handle.
    fn kill_thread(&mut self, thread: Self::Thread);
}
