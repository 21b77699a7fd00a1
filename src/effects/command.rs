//! Effects requested by the pure machine.
//!
//! The machine never starts work itself. Each step returns the commands its
//! transition produced; the runtime carries them out and reports back through
//! internal events.

use crate::core::{StateNode, Token};
use serde::Serialize;
use std::time::Duration;

/// Services a state can invoke on entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    AuxiliaryContent,
    SubmitFeedback,
}

/// Side effects the core names but does not implement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// `GOOD` was chosen on the question screen
    PositiveOutcome,
    /// The question screen was left
    QuestionExited,
    /// The thanks screen was entered
    ThanksEntered,
    /// A failed submission is being retried
    SubmissionRetrying,
    /// The retry bound was hit; the user is back on the form
    RetriesExhausted,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    /// Start `service` on behalf of the entry identified by `token`, after
    /// `delay`.
    Invoke {
        service: ServiceKind,
        token: Token,
        delay: Duration,
    },
    /// Deliver a `TimedOut` event for `node` once `delay` has elapsed.
    StartTimer {
        node: StateNode,
        token: Token,
        delay: Duration,
    },
    Notify(Notification),
}

impl Command {
    pub fn is_invoke_of(&self, kind: ServiceKind) -> bool {
        matches!(self, Self::Invoke { service, .. } if *service == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_invoke_of_matches_service() {
        let command = Command::Invoke {
            service: ServiceKind::SubmitFeedback,
            token: Token(1),
            delay: Duration::ZERO,
        };
        assert!(command.is_invoke_of(ServiceKind::SubmitFeedback));
        assert!(!command.is_invoke_of(ServiceKind::AuxiliaryContent));
        assert!(!Command::Notify(Notification::ThanksEntered)
            .is_invoke_of(ServiceKind::SubmitFeedback));
    }
}
