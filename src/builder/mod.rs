//! Builder API for transition tables.
//!
//! This module provides fluent builders for assembling a transition table
//! from individual transitions and per-node behaviour.

pub mod error;
pub mod table;
pub mod transition;

pub use error::BuildError;
pub use table::TableBuilder;
pub use transition::TransitionBuilder;

use crate::core::{EventKind, StateNode};

/// Create an unguarded transition with no actions.
///
/// # Example
///
/// ```
/// use feedback_flow::builder::simple_transition;
/// use feedback_flow::core::{EventKind, StateNode};
///
/// let transition = simple_transition(StateNode::Question, EventKind::Close, StateNode::Closed)
///     .build()
///     .unwrap();
/// assert!(transition.guard.is_none());
/// ```
pub fn simple_transition(source: StateNode, event: EventKind, target: StateNode) -> TransitionBuilder {
    TransitionBuilder::new().from(source).on(event).to(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_transition_sets_endpoints() {
        let transition = simple_transition(StateNode::Thanks, EventKind::Close, StateNode::Closed)
            .build()
            .unwrap();

        assert_eq!(transition.source, StateNode::Thanks);
        assert_eq!(transition.event, EventKind::Close);
        assert_eq!(transition.target, Some(StateNode::Closed));
        assert!(transition.actions.is_empty());
    }
}
