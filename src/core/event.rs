//! Events accepted by the feedback machine.
//!
//! User-originated events (`Good`, `Bad`, `Close`, `Submit`) come from the UI
//! layer. Internal events report the outcome of invoked services, timers and
//! completed composite states; each carries the [`Token`] of the state entry
//! that started it, so late deliveries can be recognised and dropped.

use super::context::Feedback;
use super::state::StateNode;
use crate::effects::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Epoch identifying one entry into a state node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Token(pub(crate) u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackEvent {
    Good,
    Bad,
    Close,
    Submit {
        value: String,
    },
    AuxiliaryLoaded {
        token: Token,
        content: String,
    },
    AuxiliaryFailed {
        token: Token,
        error: ServiceError,
    },
    SubmitSucceeded {
        token: Token,
        feedback: Feedback,
    },
    SubmitFailed {
        token: Token,
        error: ServiceError,
    },
    TimedOut {
        node: StateNode,
        token: Token,
    },
    FormDone {
        token: Token,
    },
}

impl FeedbackEvent {
    pub fn submit(value: impl Into<String>) -> Self {
        Self::Submit {
            value: value.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Good => EventKind::Good,
            Self::Bad => EventKind::Bad,
            Self::Close => EventKind::Close,
            Self::Submit { .. } => EventKind::Submit,
            Self::AuxiliaryLoaded { .. } => EventKind::AuxiliaryDone,
            Self::AuxiliaryFailed { .. } => EventKind::AuxiliaryError,
            Self::SubmitSucceeded { .. } => EventKind::SubmitDone,
            Self::SubmitFailed { .. } => EventKind::SubmitError,
            Self::TimedOut { .. } => EventKind::Timeout,
            Self::FormDone { .. } => EventKind::FormDone,
        }
    }

    /// The node and entry token an internal event belongs to.
    ///
    /// `None` for user-originated events.
    pub fn origin(&self) -> Option<(StateNode, Token)> {
        match self {
            Self::Good | Self::Bad | Self::Close | Self::Submit { .. } => None,
            Self::AuxiliaryLoaded { token, .. } | Self::AuxiliaryFailed { token, .. } => {
                Some((StateNode::Question, *token))
            }
            Self::SubmitSucceeded { token, .. } | Self::SubmitFailed { token, .. } => {
                Some((StateNode::FormLoading, *token))
            }
            Self::TimedOut { node, token } => Some((*node, *token)),
            Self::FormDone { token } => Some((StateNode::Form, *token)),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.origin().is_some()
    }
}

/// Type tag of an event; the key of the transition table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Good,
    Bad,
    Close,
    Submit,
    AuxiliaryDone,
    AuxiliaryError,
    SubmitDone,
    SubmitError,
    Timeout,
    FormDone,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Bad => "BAD",
            Self::Close => "CLOSE",
            Self::Submit => "SUBMIT",
            Self::AuxiliaryDone => "AUXILIARY_DONE",
            Self::AuxiliaryError => "AUXILIARY_ERROR",
            Self::SubmitDone => "SUBMIT_DONE",
            Self::SubmitError => "SUBMIT_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::FormDone => "FORM_DONE",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
