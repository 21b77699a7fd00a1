//! The feedback state machine.
//!
//! [`FeedbackMachine`] is pure: it never performs I/O, spawns tasks or reads
//! clocks other than to timestamp history. Each call to [`FeedbackMachine::send`]
//! applies at most one transition (plus the completion transition of a
//! composite whose final child was entered) and returns the commands the
//! runtime must carry out.

use super::action::run_actions;
use super::table::{IgnoreReason, TransitionDef, TransitionTable};
use crate::core::{
    FeedbackContext, FeedbackEvent, FeedbackState, State, StateHistory, StateNode,
    StateTransition, Token,
};
use crate::effects::Command;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// What a single `send` did.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Left `from` and entered `to`; the two are equal on re-entry
    Transitioned {
        from: FeedbackState,
        to: FeedbackState,
    },
    /// A targetless transition ran its actions
    Updated,
    /// Nothing changed
    Ignored(IgnoreReason),
}

/// Result of processing one event.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub outcome: StepOutcome,
    pub commands: Vec<Command>,
}

impl Step {
    fn ignored(reason: IgnoreReason) -> Self {
        Self {
            outcome: StepOutcome::Ignored(reason),
            commands: Vec::new(),
        }
    }

    /// True when state or context may have changed.
    pub fn changed(&self) -> bool {
        !matches!(self.outcome, StepOutcome::Ignored(_))
    }

    /// Fold a follow-up microstep into this step.
    fn chain(mut self, next: Step) -> Self {
        if let (
            StepOutcome::Transitioned { from, .. },
            StepOutcome::Transitioned { to, .. },
        ) = (&self.outcome, &next.outcome)
        {
            self.outcome = StepOutcome::Transitioned {
                from: *from,
                to: *to,
            };
        }
        self.commands.extend(next.commands);
        self
    }
}

/// Read-only view handed to the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: FeedbackState,
    pub context: FeedbackContext,
}

impl Snapshot {
    /// See [`FeedbackState::matches`].
    pub fn matches(&self, path: &str) -> bool {
        self.state.matches(path)
    }

    pub fn is_final(&self) -> bool {
        self.state.is_final()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A running instance of the feedback machine.
pub struct FeedbackMachine {
    table: Arc<TransitionTable>,
    state: FeedbackState,
    context: FeedbackContext,
    epochs: HashMap<StateNode, Token>,
    next_token: u64,
    history: StateHistory<FeedbackState>,
}

impl FeedbackMachine {
    /// Enter the table's initial state with a default context.
    ///
    /// Returns the machine together with the commands produced by entering
    /// the initial state (typically the auxiliary-content invocation).
    pub fn start(table: Arc<TransitionTable>) -> (Self, Vec<Command>) {
        let state = table.initial();
        let mut machine = Self {
            table: Arc::clone(&table),
            state,
            context: FeedbackContext::default(),
            epochs: HashMap::new(),
            next_token: 0,
            history: StateHistory::new(),
        };

        let mut context = machine.context.clone();
        let mut commands = Vec::new();
        machine.enter(&table, &state.nodes(), &mut context, None, &mut commands);
        machine.context = context;

        (machine, commands)
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    pub fn context(&self) -> &FeedbackContext {
        &self.context
    }

    pub fn history(&self) -> &StateHistory<FeedbackState> {
        &self.history
    }

    pub fn is_final(&self) -> bool {
        self.state.is_final()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            context: self.context.clone(),
        }
    }

    /// Token of the current entry into `node`, if it is active.
    pub fn active_token(&self, node: StateNode) -> Option<Token> {
        self.epochs.get(&node).copied()
    }

    /// Whether `event` would cause a transition right now (pure).
    pub fn can(&self, event: &FeedbackEvent) -> bool {
        self.admit(event).is_ok()
            && self
                .table
                .select(&self.state, &self.context, event)
                .is_ok()
    }

    /// Process one event.
    ///
    /// Unmatched, guard-rejected and stale events leave state and context
    /// untouched and produce no commands.
    pub fn send(&mut self, event: FeedbackEvent) -> Step {
        if let Err(reason) = self.admit(&event) {
            return Step::ignored(reason);
        }

        let table = Arc::clone(&self.table);
        let (depth, transition) = match table.select(&self.state, &self.context, &event) {
            Ok(selected) => selected,
            Err(reason) => return Step::ignored(reason),
        };

        let step = self.apply(&table, depth, transition, &event);

        match self.completion_event() {
            Some(done) => {
                let follow_up = self.send(done);
                step.chain(follow_up)
            }
            None => step,
        }
    }

    /// Reject events for a terminated machine or a state entry that has
    /// since been left.
    fn admit(&self, event: &FeedbackEvent) -> Result<(), IgnoreReason> {
        if self.state.is_final() {
            return Err(IgnoreReason::Terminated);
        }
        match event.origin() {
            Some((node, token)) if self.epochs.get(&node) != Some(&token) => {
                Err(IgnoreReason::Stale)
            }
            _ => Ok(()),
        }
    }

    fn apply(
        &mut self,
        table: &TransitionTable,
        depth: usize,
        transition: &TransitionDef,
        event: &FeedbackEvent,
    ) -> Step {
        let from = self.state;
        let mut context = self.context.clone();
        let mut commands = Vec::new();

        let Some(target_node) = transition.target else {
            run_actions(&transition.actions, &mut context, Some(event), &mut commands);
            self.context = context;
            return Step {
                outcome: StepOutcome::Updated,
                commands,
            };
        };

        let to = target_node.initial_leaf();
        let source_nodes = from.nodes();
        let target_nodes = to.nodes();

        // Nodes above the defining node are never left; the defining node
        // itself is exited and re-entered when it is also the target.
        let shared = source_nodes
            .iter()
            .zip(&target_nodes)
            .take_while(|(a, b)| a == b)
            .count()
            .min(depth);

        for node in source_nodes[shared..].iter().rev() {
            if let Some(def) = table.node(*node) {
                run_actions(&def.on_exit, &mut context, Some(event), &mut commands);
            }
            self.epochs.remove(node);
        }

        run_actions(&transition.actions, &mut context, Some(event), &mut commands);

        self.enter(
            table,
            &target_nodes[shared..],
            &mut context,
            Some(event),
            &mut commands,
        );

        self.state = to;
        self.context = context;
        self.history = self.history.record(StateTransition {
            from,
            to,
            event: event.kind().to_string(),
            timestamp: Utc::now(),
            attempt: self.context.retries as usize,
        });

        Step {
            outcome: StepOutcome::Transitioned { from, to },
            commands,
        }
    }

    /// Enter `nodes` outermost first: issue a fresh token, run entry
    /// actions, then queue invocations and timers.
    fn enter(
        &mut self,
        table: &TransitionTable,
        nodes: &[StateNode],
        context: &mut FeedbackContext,
        event: Option<&FeedbackEvent>,
        commands: &mut Vec<Command>,
    ) {
        for node in nodes {
            let token = self.issue_token(*node);
            let Some(def) = table.node(*node) else {
                continue;
            };

            run_actions(&def.on_entry, context, event, commands);

            if let Some(invocation) = def.invoke {
                commands.push(Command::Invoke {
                    service: invocation.service,
                    token,
                    delay: invocation.retry_policy.delay_for(context.retries),
                });
            }
            if let Some(delay) = def.after {
                commands.push(Command::StartTimer {
                    node: *node,
                    token,
                    delay,
                });
            }
        }
    }

    fn issue_token(&mut self, node: StateNode) -> Token {
        self.next_token += 1;
        let token = Token(self.next_token);
        self.epochs.insert(node, token);
        token
    }

    /// Done event for the parent of a final child that was just entered.
    fn completion_event(&self) -> Option<FeedbackEvent> {
        let leaf = self.state.leaf();
        if !leaf.is_final() {
            return None;
        }
        match leaf.parent()? {
            StateNode::Form => self
                .active_token(StateNode::Form)
                .map(|token| FeedbackEvent::FormDone { token }),
            _ => None,
        }
    }
}
