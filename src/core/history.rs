//! State transition history tracking.
//!
//! Every transition the machine takes, including re-entries of the same
//! state during a retry loop, is appended to an ordered history.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use feedback_flow::core::{FeedbackState, FormState, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: FeedbackState::Question,
///     to: FeedbackState::Form(FormState::Pending),
///     event: "BAD".to_string(),
///     timestamp: Utc::now(),
///     attempt: 0,
/// };
/// assert_eq!(transition.event, "BAD");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Type tag of the event that triggered the transition
    pub event: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Retry count at the time of the transition
    pub attempt: usize,
}

/// Ordered history of state transitions.
///
/// `record` returns a new history and leaves the receiver untouched.
///
/// # Example
///
/// ```rust
/// use feedback_flow::core::{FeedbackState, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new().record(StateTransition {
///     from: FeedbackState::Question,
///     to: FeedbackState::Thanks,
///     event: "GOOD".to_string(),
///     timestamp: Utc::now(),
///     attempt: 0,
/// });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&FeedbackState::Question, &FeedbackState::Thanks]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// The first element is the `from` of the first transition, followed by
    /// the `to` of every transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration from first to last transition, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Number of recorded transitions that entered `state`.
    pub fn entries_into(&self, state: &S) -> usize {
        self.transitions.iter().filter(|t| &t.to == state).count()
    }

    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{FeedbackState, FormState};

    fn transition(from: FeedbackState, to: FeedbackState, event: &str) -> StateTransition<FeedbackState> {
        StateTransition {
            from,
            to,
            event: event.to_string(),
            timestamp: Utc::now(),
            attempt: 0,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<FeedbackState> = StateHistory::new();
        assert_eq!(history.transitions().len(), 0);
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(transition(
            FeedbackState::Question,
            FeedbackState::Thanks,
            "GOOD",
        ));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let pending = FeedbackState::Form(FormState::Pending);
        let history = StateHistory::new()
            .record(transition(FeedbackState::Question, pending, "BAD"))
            .record(transition(pending, FeedbackState::Closed, "CLOSE"));

        let path = history.get_path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &FeedbackState::Question);
        assert_eq!(path[1], &pending);
        assert_eq!(path[2], &FeedbackState::Closed);
        assert_eq!(history.last().map(|t| t.event.as_str()), Some("CLOSE"));
    }

    #[test]
    fn entries_into_counts_reentries() {
        let loading = FeedbackState::Form(FormState::Loading);
        let pending = FeedbackState::Form(FormState::Pending);
        let history = StateHistory::new()
            .record(transition(pending, loading, "SUBMIT"))
            .record(transition(loading, loading, "SUBMIT_ERROR"))
            .record(transition(loading, loading, "SUBMIT_ERROR"));

        assert_eq!(history.entries_into(&loading), 3);
        assert_eq!(history.entries_into(&pending), 0);
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut first = transition(FeedbackState::Question, FeedbackState::Thanks, "GOOD");
        first.timestamp = start;
        let mut second = transition(FeedbackState::Thanks, FeedbackState::Closed, "CLOSE");
        second.timestamp = start + chrono::Duration::milliseconds(250);

        let history = StateHistory::new().record(first).record(second);

        assert_eq!(history.duration(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(transition(
            FeedbackState::Question,
            FeedbackState::Form(FormState::Pending),
            "BAD",
        ));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<FeedbackState> = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.transitions().len(), 1);
        assert_eq!(deserialized.transitions()[0].event, "BAD");
    }
}
