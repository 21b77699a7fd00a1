//! The static transition table.
//!
//! Built once per machine definition and shared between machine instances.
//! Lookup is keyed by `(StateNode, EventKind)`; each key holds an ordered
//! list of candidates whose guards are tried in turn.

use super::action::Action;
use crate::config::RetryPolicy;
use crate::core::{
    EventKind, FeedbackContext, FeedbackEvent, FeedbackState, Guard, StateNode,
};
use crate::effects::ServiceKind;
use std::collections::HashMap;
use std::time::Duration;

pub type FeedbackGuard = Guard<FeedbackContext, FeedbackEvent>;

/// One candidate transition.
#[derive(Clone, Debug)]
pub struct TransitionDef {
    pub source: StateNode,
    pub event: EventKind,
    pub guard: Option<FeedbackGuard>,
    pub actions: Vec<Action>,
    /// `None` makes the transition targetless: actions run, no state is
    /// exited or entered.
    pub target: Option<StateNode>,
}

impl TransitionDef {
    /// Check the guard, if any (pure)
    pub fn accepts(&self, context: &FeedbackContext, event: &FeedbackEvent) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(context, event))
    }
}

/// Service started on entry to a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Invocation {
    pub service: ServiceKind,
    pub retry_policy: RetryPolicy,
}

impl Invocation {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service,
            retry_policy: RetryPolicy::Immediate,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}

/// Behaviour attached to a node regardless of the event that reaches it.
#[derive(Clone, Debug, Default)]
pub struct NodeDef {
    pub on_entry: Vec<Action>,
    pub on_exit: Vec<Action>,
    pub invoke: Option<Invocation>,
    /// Deliver `TimedOut` for this node once it has been active this long
    pub after: Option<Duration>,
}

/// Why an event produced no transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The machine is in a final state
    Terminated,
    /// The event belongs to a state entry that is no longer active
    Stale,
    /// No active node handles the event
    Unhandled,
    /// Handlers exist but every guard rejected the event
    GuardRejected,
}

#[derive(Debug)]
pub struct TransitionTable {
    initial: StateNode,
    transitions: HashMap<(StateNode, EventKind), Vec<TransitionDef>>,
    nodes: HashMap<StateNode, NodeDef>,
}

impl TransitionTable {
    pub(crate) fn new(
        initial: StateNode,
        transitions: HashMap<(StateNode, EventKind), Vec<TransitionDef>>,
        nodes: HashMap<StateNode, NodeDef>,
    ) -> Self {
        Self {
            initial,
            transitions,
            nodes,
        }
    }

    /// Leaf the machine starts in.
    pub fn initial(&self) -> FeedbackState {
        self.initial.initial_leaf()
    }

    pub fn candidates(&self, node: StateNode, event: EventKind) -> &[TransitionDef] {
        self.transitions
            .get(&(node, event))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn node(&self, node: StateNode) -> Option<&NodeDef> {
        self.nodes.get(&node)
    }

    /// Pick the transition `event` would take from `state`.
    ///
    /// Active nodes are searched innermost first; within a node, candidates
    /// are tried in definition order. Returns the depth of the node that
    /// defines the chosen transition (0 = top level) alongside it.
    pub fn select(
        &self,
        state: &FeedbackState,
        context: &FeedbackContext,
        event: &FeedbackEvent,
    ) -> Result<(usize, &TransitionDef), IgnoreReason> {
        let kind = event.kind();
        let mut guard_rejected = false;

        for (depth, node) in state.nodes().into_iter().enumerate().rev() {
            for candidate in self.candidates(node, kind) {
                if candidate.accepts(context, event) {
                    return Ok((depth, candidate));
                }
                guard_rejected = true;
            }
        }

        Err(if guard_rejected {
            IgnoreReason::GuardRejected
        } else {
            IgnoreReason::Unhandled
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FormState;

    fn def(source: StateNode, event: EventKind, target: StateNode) -> TransitionDef {
        TransitionDef {
            source,
            event,
            guard: None,
            actions: Vec::new(),
            target: Some(target),
        }
    }

    fn table(defs: Vec<TransitionDef>) -> TransitionTable {
        let mut transitions: HashMap<_, Vec<_>> = HashMap::new();
        for d in defs {
            transitions.entry((d.source, d.event)).or_default().push(d);
        }
        TransitionTable::new(StateNode::Question, transitions, HashMap::new())
    }

    #[test]
    fn accepts_respects_guard() {
        let mut transition = def(StateNode::FormPending, EventKind::Submit, StateNode::FormLoading);
        let context = FeedbackContext::default();
        assert!(transition.accepts(&context, &FeedbackEvent::submit("")));

        transition.guard = Some(Guard::new(|_: &FeedbackContext, e: &FeedbackEvent| {
            matches!(e, FeedbackEvent::Submit { value } if !value.is_empty())
        }));
        assert!(!transition.accepts(&context, &FeedbackEvent::submit("")));
        assert!(transition.accepts(&context, &FeedbackEvent::submit("x")));
    }

    #[test]
    fn select_prefers_innermost_node() {
        let table = table(vec![
            def(StateNode::Form, EventKind::Close, StateNode::Closed),
            def(StateNode::FormLoading, EventKind::Close, StateNode::FormPending),
        ]);
        let state = FeedbackState::Form(FormState::Loading);

        let (depth, chosen) = table
            .select(&state, &FeedbackContext::default(), &FeedbackEvent::Close)
            .unwrap();

        assert_eq!(depth, 1);
        assert_eq!(chosen.target, Some(StateNode::FormPending));
    }

    #[test]
    fn select_falls_back_to_parent() {
        let table = table(vec![def(StateNode::Form, EventKind::Close, StateNode::Closed)]);
        let state = FeedbackState::Form(FormState::Pending);

        let (depth, chosen) = table
            .select(&state, &FeedbackContext::default(), &FeedbackEvent::Close)
            .unwrap();

        assert_eq!(depth, 0);
        assert_eq!(chosen.source, StateNode::Form);
    }

    #[test]
    fn select_distinguishes_guard_rejection() {
        let mut guarded = def(StateNode::Question, EventKind::Good, StateNode::Thanks);
        guarded.guard = Some(Guard::new(|_: &FeedbackContext, _: &FeedbackEvent| false));
        let table = table(vec![guarded]);
        let context = FeedbackContext::default();

        let rejected = table.select(&FeedbackState::Question, &context, &FeedbackEvent::Good);
        assert_eq!(rejected.unwrap_err(), IgnoreReason::GuardRejected);

        let unhandled = table.select(&FeedbackState::Question, &context, &FeedbackEvent::Bad);
        assert_eq!(unhandled.unwrap_err(), IgnoreReason::Unhandled);
    }

    #[test]
    fn initial_resolves_to_leaf() {
        let table = TransitionTable::new(StateNode::Form, HashMap::new(), HashMap::new());
        assert_eq!(table.initial(), FeedbackState::Form(FormState::Pending));
    }
}
