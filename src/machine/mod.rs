//! The pure feedback state machine.
//!
//! - [`TransitionTable`]: static description of nodes and transitions
//! - [`FeedbackMachine`]: one running instance, advanced by [`FeedbackMachine::send`]
//! - [`feedback_table`]: the widget's concrete definition
//!
//! The machine never performs effects. Every step returns the
//! [`Command`](crate::effects::Command)s the runtime must carry out, and
//! every asynchronous result comes back as an event stamped with the
//! [`Token`](crate::core::Token) of the state entry that requested it.

mod action;
mod feedback;
mod state_machine;
mod table;

pub use action::{Action, AssignFn};
pub use feedback::feedback_table;
pub use state_machine::{FeedbackMachine, Snapshot, Step, StepOutcome};
pub use table::{FeedbackGuard, IgnoreReason, Invocation, NodeDef, TransitionDef, TransitionTable};
