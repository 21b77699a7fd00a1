//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{EventKind, FeedbackContext, FeedbackEvent, Guard, StateNode};
use crate::effects::Notification;
use crate::machine::{Action, FeedbackGuard, TransitionDef};

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```
/// use feedback_flow::builder::TransitionBuilder;
/// use feedback_flow::core::{EventKind, StateNode};
/// use feedback_flow::effects::Notification;
///
/// let transition = TransitionBuilder::new()
///     .from(StateNode::Question)
///     .on(EventKind::Good)
///     .to(StateNode::Thanks)
///     .notify(Notification::PositiveOutcome)
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.target, Some(StateNode::Thanks));
/// ```
#[derive(Default)]
pub struct TransitionBuilder {
    source: Option<StateNode>,
    event: Option<EventKind>,
    guard: Option<FeedbackGuard>,
    actions: Vec<Action>,
    target: Option<StateNode>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node that handles the event (required).
    pub fn from(mut self, node: StateNode) -> Self {
        self.source = Some(node);
        self
    }

    /// Set the event type (required).
    pub fn on(mut self, event: EventKind) -> Self {
        self.event = Some(event);
        self
    }

    /// Set the target node. Leave unset for a targetless transition.
    pub fn to(mut self, node: StateNode) -> Self {
        self.target = Some(node);
        self
    }

    /// Add a named guard using a closure (optional).
    pub fn when<F>(mut self, name: &'static str, predicate: F) -> Self
    where
        F: Fn(&FeedbackContext, &FeedbackEvent) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::named(name, predicate));
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Append a context assignment.
    pub fn assign<F>(self, name: &'static str, apply: F) -> Self
    where
        F: Fn(&mut FeedbackContext, Option<&FeedbackEvent>) + Send + Sync + 'static,
    {
        self.action(Action::assign(name, apply))
    }

    /// Append a notification.
    pub fn notify(self, notification: Notification) -> Self {
        self.action(Action::Notify(notification))
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionDef, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        let event = self.event.ok_or(BuildError::MissingEvent)?;

        Ok(TransitionDef {
            source,
            event,
            guard: self.guard,
            actions: self.actions,
            target: self.target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_required_fields() {
        let result = TransitionBuilder::new().on(EventKind::Good).build();
        assert!(matches!(result, Err(BuildError::MissingSource)));

        let result = TransitionBuilder::new().from(StateNode::Question).build();
        assert!(matches!(result, Err(BuildError::MissingEvent)));
    }

    #[test]
    fn transition_builder_with_guard() {
        let transition = TransitionBuilder::new()
            .from(StateNode::FormPending)
            .on(EventKind::Submit)
            .to(StateNode::FormLoading)
            .when("formValid", |_ctx, event| {
                matches!(event, FeedbackEvent::Submit { value } if !value.is_empty())
            })
            .build()
            .unwrap();

        let context = FeedbackContext::default();
        assert!(transition.accepts(&context, &FeedbackEvent::submit("slow")));
        assert!(!transition.accepts(&context, &FeedbackEvent::submit("")));
        assert_eq!(transition.guard.as_ref().map(|g| g.name()), Some("formValid"));
    }

    #[test]
    fn actions_keep_declaration_order() {
        let transition = TransitionBuilder::new()
            .from(StateNode::FormLoading)
            .on(EventKind::SubmitError)
            .to(StateNode::FormLoading)
            .assign("incrementRetries", |ctx, _| ctx.retries += 1)
            .notify(Notification::SubmissionRetrying)
            .build()
            .unwrap();

        let names: Vec<_> = transition.actions.iter().map(Action::name).collect();
        assert_eq!(names, vec!["incrementRetries", "logRetry"]);
    }

    #[test]
    fn target_is_optional() {
        let transition = TransitionBuilder::new()
            .from(StateNode::Question)
            .on(EventKind::AuxiliaryError)
            .build()
            .unwrap();

        assert!(transition.target.is_none());
        assert!(transition.actions.is_empty());
    }
}
