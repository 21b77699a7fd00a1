//! Builder for constructing transition tables.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{EventKind, StateNode};
use crate::machine::{Action, Invocation, NodeDef, TransitionDef, TransitionTable};
use std::collections::HashMap;
use std::time::Duration;

/// Builder for constructing transition tables with a fluent API.
#[derive(Default)]
pub struct TableBuilder {
    initial: Option<StateNode>,
    transitions: Vec<TransitionDef>,
    nodes: HashMap<StateNode, NodeDef>,
}

impl TableBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial node (required).
    pub fn initial(mut self, node: StateNode) -> Self {
        self.initial = Some(node);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    pub fn on_entry(mut self, node: StateNode, action: Action) -> Self {
        self.nodes.entry(node).or_default().on_entry.push(action);
        self
    }

    pub fn on_exit(mut self, node: StateNode, action: Action) -> Self {
        self.nodes.entry(node).or_default().on_exit.push(action);
        self
    }

    /// Start `invocation` every time `node` is entered.
    pub fn invoke(mut self, node: StateNode, invocation: Invocation) -> Self {
        self.nodes.entry(node).or_default().invoke = Some(invocation);
        self
    }

    /// Arm a timer every time `node` is entered.
    pub fn after(mut self, node: StateNode, delay: Duration) -> Self {
        self.nodes.entry(node).or_default().after = Some(delay);
        self
    }

    /// Build the table.
    /// Returns an error if required fields are missing or a final node has
    /// outgoing transitions.
    pub fn build(self) -> Result<TransitionTable, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut transitions: HashMap<(StateNode, EventKind), Vec<TransitionDef>> = HashMap::new();
        for transition in self.transitions {
            if transition.source.is_final() {
                return Err(BuildError::TransitionFromFinal {
                    node: transition.source,
                });
            }
            transitions
                .entry((transition.source, transition.event))
                .or_default()
                .push(transition);
        }

        Ok(TransitionTable::new(initial, transitions, self.nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FeedbackState;
    use crate::effects::{Notification, ServiceKind};

    fn close_from_thanks() -> TransitionBuilder {
        TransitionBuilder::new()
            .from(StateNode::Thanks)
            .on(EventKind::Close)
            .to(StateNode::Closed)
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = TableBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_transitions() {
        let result = TableBuilder::new().initial(StateNode::Question).build();
        assert!(matches!(result, Err(BuildError::NoTransitions)));
    }

    #[test]
    fn final_nodes_reject_transitions() {
        let result = TableBuilder::new()
            .initial(StateNode::Question)
            .transition(
                TransitionBuilder::new()
                    .from(StateNode::Closed)
                    .on(EventKind::Good)
                    .to(StateNode::Thanks),
            )
            .and_then(TableBuilder::build);

        assert_eq!(
            result.unwrap_err(),
            BuildError::TransitionFromFinal {
                node: StateNode::Closed
            }
        );
    }

    #[test]
    fn transition_errors_surface_from_builder() {
        let result = TableBuilder::new()
            .initial(StateNode::Question)
            .transition(TransitionBuilder::new().on(EventKind::Close));

        assert!(matches!(result, Err(BuildError::MissingSource)));
    }

    #[test]
    fn fluent_api_builds_table() {
        let table = TableBuilder::new()
            .initial(StateNode::Question)
            .invoke(
                StateNode::Question,
                Invocation::new(ServiceKind::AuxiliaryContent),
            )
            .on_entry(StateNode::Thanks, Action::Notify(Notification::ThanksEntered))
            .after(StateNode::FormLoading, Duration::from_secs(2))
            .transition(close_from_thanks())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(table.initial(), FeedbackState::Question);
        assert_eq!(table.candidates(StateNode::Thanks, EventKind::Close).len(), 1);
        assert!(table.candidates(StateNode::Thanks, EventKind::Good).is_empty());
        assert_eq!(
            table.node(StateNode::Question).and_then(|n| n.invoke),
            Some(Invocation::new(ServiceKind::AuxiliaryContent))
        );
        assert_eq!(
            table.node(StateNode::FormLoading).and_then(|n| n.after),
            Some(Duration::from_secs(2))
        );
        assert_eq!(table.node(StateNode::Thanks).map(|n| n.on_entry.len()), Some(1));
    }

    #[test]
    fn candidates_keep_insertion_order() {
        let first = TransitionBuilder::new()
            .from(StateNode::FormLoading)
            .on(EventKind::SubmitError)
            .to(StateNode::FormLoading)
            .when("canRetry", |ctx, _| ctx.retries < 5);
        let second = TransitionBuilder::new()
            .from(StateNode::FormLoading)
            .on(EventKind::SubmitError)
            .to(StateNode::FormPending);

        let table = TableBuilder::new()
            .initial(StateNode::Question)
            .transition(first)
            .and_then(|b| b.transition(second))
            .and_then(TableBuilder::build)
            .unwrap();

        let targets: Vec<_> = table
            .candidates(StateNode::FormLoading, EventKind::SubmitError)
            .iter()
            .map(|t| t.target)
            .collect();
        assert_eq!(
            targets,
            vec![Some(StateNode::FormLoading), Some(StateNode::FormPending)]
        );
    }
}
