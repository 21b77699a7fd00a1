//! Core state machine types.
//!
//! This module contains the pure vocabulary of the feedback machine:
//! - The state hierarchy and the `State` trait
//! - The context carried alongside the state
//! - Events and their epoch tokens
//! - Guard predicates for transition control
//! - Immutable history tracking
//!
//! Nothing in this module performs I/O.

mod context;
mod event;
mod guard;
mod history;
mod state;

pub use context::{Feedback, FeedbackContext};
pub use event::{EventKind, FeedbackEvent, Token};
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::{FeedbackState, FormState, State, StateNode};
