//! Build errors for transition and table builders.

use crate::core::StateNode;
use thiserror::Error;

/// Errors that can occur when building transitions and transition tables.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(node) before .build()")]
    MissingInitialState,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition source node not specified. Call .from(node)")]
    MissingSource,

    #[error("Transition event not specified. Call .on(kind)")]
    MissingEvent,

    #[error("Final node '{node}' cannot have outgoing transitions")]
    TransitionFromFinal { node: StateNode },
}
