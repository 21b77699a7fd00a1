//! Actions run while a transition is taken.

use crate::core::{FeedbackContext, FeedbackEvent};
use crate::effects::{Command, Notification};
use std::fmt;
use std::sync::Arc;

/// Context transformer. The event is `None` for the entry actions run when
/// the machine starts.
pub type AssignFn = Arc<dyn Fn(&mut FeedbackContext, Option<&FeedbackEvent>) + Send + Sync>;

#[derive(Clone)]
pub enum Action {
    /// Mutate the context
    Assign { name: &'static str, apply: AssignFn },

    /// Ask the runtime to forward a notification to the effect hooks
    Notify(Notification),
}

impl Action {
    pub fn assign<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&mut FeedbackContext, Option<&FeedbackEvent>) + Send + Sync + 'static,
    {
        Self::Assign {
            name,
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Assign { name, .. } => *name,
            Self::Notify(Notification::PositiveOutcome) => "logGood",
            Self::Notify(Notification::QuestionExited) => "logExit",
            Self::Notify(Notification::ThanksEntered) => "logEntered",
            Self::Notify(Notification::SubmissionRetrying) => "logRetry",
            Self::Notify(Notification::RetriesExhausted) => "logExhausted",
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign { name, .. } => f.debug_tuple("Assign").field(name).finish(),
            Self::Notify(notification) => f.debug_tuple("Notify").field(notification).finish(),
        }
    }
}

/// Run `actions` in order against a working copy of the context.
///
/// Notifications are queued as commands rather than delivered, so nothing
/// escapes the machine until the whole step has been applied.
pub(crate) fn run_actions(
    actions: &[Action],
    context: &mut FeedbackContext,
    event: Option<&FeedbackEvent>,
    commands: &mut Vec<Command>,
) {
    for action in actions {
        match action {
            Action::Assign { apply, .. } => apply(context, event),
            Action::Notify(notification) => commands.push(Command::Notify(*notification)),
        }
    }
}
