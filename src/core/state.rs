//! State trait and the feedback widget's state hierarchy.
//!
//! The widget's states form a two-level tree: four top-level states, one of
//! which (`form`) is composite and carries its own nested sub-state. The
//! current state is always a leaf of that tree, represented by
//! [`FeedbackState`]. Every node of the tree, composite or leaf, is
//! addressable as a [`StateNode`] so behaviour can be attached to either.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

/// Trait for state machine states.
///
/// All methods are pure - no side effects.
///
/// # Required Traits
///
/// - `Clone`: States must be cloneable for history tracking
/// - `PartialEq`: States must be comparable for transition logic
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States are handed to the UI layer as data
///
/// # Example
///
/// ```rust
/// use feedback_flow::core::{FeedbackState, FormState, State};
///
/// let state = FeedbackState::Form(FormState::Pending);
/// assert_eq!(state.name(), "form.pending");
/// assert!(!state.is_final());
/// assert!(FeedbackState::Closed.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}

/// Sub-states of the composite `form` state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    /// Waiting for the user to write and submit an explanation.
    Pending,
    /// Submission service in flight.
    Loading,
    /// Final child; reaching it completes the form.
    Submitted,
    /// Declared but unreachable with the current transition table.
    Error,
}

/// The active leaf of the widget's state tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackState {
    Question,
    Form(FormState),
    Thanks,
    Closed,
}

impl FeedbackState {
    /// The innermost node this state occupies.
    pub fn leaf(&self) -> StateNode {
        match self {
            Self::Question => StateNode::Question,
            Self::Form(FormState::Pending) => StateNode::FormPending,
            Self::Form(FormState::Loading) => StateNode::FormLoading,
            Self::Form(FormState::Submitted) => StateNode::FormSubmitted,
            Self::Form(FormState::Error) => StateNode::FormError,
            Self::Thanks => StateNode::Thanks,
            Self::Closed => StateNode::Closed,
        }
    }

    /// Active nodes from outermost to innermost.
    ///
    /// ```rust
    /// use feedback_flow::core::{FeedbackState, FormState, StateNode};
    ///
    /// let nodes = FeedbackState::Form(FormState::Loading).nodes();
    /// assert_eq!(nodes, vec![StateNode::Form, StateNode::FormLoading]);
    /// ```
    pub fn nodes(&self) -> Vec<StateNode> {
        let mut nodes = Vec::with_capacity(2);
        let mut current = Some(self.leaf());
        while let Some(node) = current {
            nodes.push(node);
            current = node.parent();
        }
        nodes.reverse();
        nodes
    }

    /// Dotted path of the active leaf, e.g. `form.loading`.
    pub fn path(&self) -> &'static str {
        self.leaf().path()
    }

    /// True when `path` names this state or one of its ancestors.
    ///
    /// ```rust
    /// use feedback_flow::core::{FeedbackState, FormState};
    ///
    /// let state = FeedbackState::Form(FormState::Pending);
    /// assert!(state.matches("form"));
    /// assert!(state.matches("form.pending"));
    /// assert!(!state.matches("form.loading"));
    /// ```
    pub fn matches(&self, path: &str) -> bool {
        self.nodes().iter().any(|node| node.path() == path)
    }
}

impl State for FeedbackState {
    fn name(&self) -> &str {
        self.path()
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::Closed)
    }

    fn is_error(&self) -> bool {
        matches!(self, Self::Form(FormState::Error))
    }
}

impl Display for FeedbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A node of the state tree, composite or leaf.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateNode {
    Question,
    Form,
    FormPending,
    FormLoading,
    FormSubmitted,
    FormError,
    Thanks,
    Closed,
}

impl StateNode {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Form => "form",
            Self::FormPending => "form.pending",
            Self::FormLoading => "form.loading",
            Self::FormSubmitted => "form.submitted",
            Self::FormError => "form.error",
            Self::Thanks => "thanks",
            Self::Closed => "closed",
        }
    }

    pub fn parent(&self) -> Option<StateNode> {
        match self {
            Self::FormPending | Self::FormLoading | Self::FormSubmitted | Self::FormError => {
                Some(Self::Form)
            }
            _ => None,
        }
    }

    /// Leaf entered when this node is targeted; composites resolve to their
    /// initial child.
    pub fn initial_leaf(&self) -> FeedbackState {
        match self {
            Self::Question => FeedbackState::Question,
            Self::Form | Self::FormPending => FeedbackState::Form(FormState::Pending),
            Self::FormLoading => FeedbackState::Form(FormState::Loading),
            Self::FormSubmitted => FeedbackState::Form(FormState::Submitted),
            Self::FormError => FeedbackState::Form(FormState::Error),
            Self::Thanks => FeedbackState::Thanks,
            Self::Closed => FeedbackState::Closed,
        }
    }

    /// Final nodes: a final child completes its parent, a final top-level
    /// node terminates the machine.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::FormSubmitted | Self::Closed)
    }
}

impl Display for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
