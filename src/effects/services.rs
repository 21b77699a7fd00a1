//! Capability traits injected into the widget.
//!
//! The core treats both services as opaque asynchronous operations. Tests
//! substitute fakes; production code plugs in whatever performs the network
//! calls.

use super::command::Notification;
use super::error::ServiceError;
use crate::core::{Feedback, FeedbackContext};
use async_trait::async_trait;

/// Fetches the content shown next to the first screen.
///
/// Failures are swallowed by the machine.
#[async_trait]
pub trait AuxiliaryContentSource: Send + Sync {
    async fn fetch_auxiliary_content(&self) -> Result<String, ServiceError>;
}

/// Submits the user's written feedback.
///
/// Receives a copy of the context as it was when the submission started.
#[async_trait]
pub trait FeedbackSubmitter: Send + Sync {
    async fn submit_feedback(&self, context: FeedbackContext) -> Result<Feedback, ServiceError>;
}

/// Receives the machine's named side effects.
pub trait EffectHooks: Send + Sync {
    fn notify(&self, notification: Notification, context: &FeedbackContext);
}

/// Default hooks: every notification becomes a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHooks;

impl EffectHooks for TracingHooks {
    fn notify(&self, notification: Notification, context: &FeedbackContext) {
        match notification {
            Notification::PositiveOutcome => tracing::info!("Positive feedback recorded"),
            Notification::QuestionExited => tracing::debug!("Left question screen"),
            Notification::ThanksEntered => tracing::info!(
                has_feedback = context.feedback.is_some(),
                "Entered thanks screen"
            ),
            Notification::SubmissionRetrying => tracing::warn!(
                retries = context.retries,
                "Server is flaky, retrying submission"
            ),
            Notification::RetriesExhausted => {
                tracing::warn!("Submission retries exhausted, returning to form")
            }
        }
    }
}
